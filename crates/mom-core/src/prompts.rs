//! Fixed texts: the interview script, the minutes template, and the canned
//! replies the orchestrator returns without consulting the model.

/// Asked in order at the start of every interview.
pub const ESSENTIAL_QUESTIONS: [&str; 6] = [
  "What is the name of the company?",
  "Who was present at the meeting?",
  "Where did the meeting take place?",
  "How long did the meeting last?",
  "How many employees does the company have?",
  "How many levels of management does the company have?",
];

/// Follow-ups the model may ask when the conversation makes them relevant.
pub const OPTIONAL_QUESTIONS: [&str; 9] = [
  "What are the company's main strategic goals for this period?",
  "What is the company's focus when it comes to development?",
  "Which target groups within the company are prioritized for development?",
  "What are the main challenges these target groups are currently facing?",
  "Are there any specific competencies or skills the company wants to \
   prioritize across teams?",
  "What learning and development programs are currently in place?",
  "How do you currently measure skill levels and identify training needs?",
  "Which learning formats do employees prefer (online programs, in-person \
   workshops, blended learning)?",
  "Is there any specific format desired for the development (trainings, \
   training days, team building, coaching, etc.)?",
];

/// Asked once the essential and relevant optional answers are in.
pub const CLOSING_QUESTIONS: [&str; 3] = [
  "What are the key action items from this discussion?",
  "Who is responsible for following up on these topics?",
  "When should we check in again on the progress of development initiatives?",
];

/// Lower-cased phrases in user input that (re)start the interview.
pub const TRIGGER_PHRASES: [&str; 2] = ["need to make mom", "minutes"];

/// Question label stored with every free-form user turn.
pub const USER_RESPONSE_LABEL: &str = "user_response";

/// Phrase in a model reply that marks it as the finished minutes.
pub const FINAL_MINUTES_MARKER: &str = "Final Meeting Minutes";

pub const LLM_ERROR_REPLY: &str =
  "I encountered an error processing your request. Please try again.";

pub const GENERAL_ERROR_REPLY: &str = "I encountered an error. Please try again.";

pub const EMPTY_INPUT_REPLY: &str =
  "I didn't catch an answer there. Could you type your response again?";

/// System role for the single-shot minutes generation call.
pub const MINUTES_SYSTEM_ROLE: &str =
  "You are a professional meeting minutes assistant.";

const MINUTES_TEMPLATE: &str = "\
You are a professional meeting assistant tasked with generating comprehensive \
Meeting Minutes (MoM) that a consultant can immediately use for follow-ups. \
Based on the structured interview data provided, generate a final MoM document \
with the following sections and in a clear, business-friendly format:

## Meeting Minutes (MoM)

### 1. Meeting Overview
- *Company Name:* [Extract from data]
- *Meeting Date & Time:* [If available]
- *Location:* [Extract from data]
- *Duration:* [Extract from data]
- *Participants:* [List all names and roles]

### 2. Meeting Objective
- Provide a concise summary of the meeting's purpose (e.g., discussing training \
needs, leadership development, or strategic planning).

### 3. Discussion Summary
- *Key Topics:*
  Summarize the main discussion points. Include any specific areas such as:
  - Strategic goals and development focus
  - Target groups for development and current challenges
  - Existing training programs and preferred learning formats
- *Additional Context:*
  Include any notable insights, pain points, or suggestions mentioned during \
the discussion.

### 4. Action Items & Follow-Up
- *Action Items:*
  List each agreed-upon action with a brief description.
- *Responsibilities:*
  Specify who is responsible for each action.
- *Follow-Up:*
  Note the agreed timeline or date for checking progress.

### 5. Additional Notes
- Add any extra information or clarifications provided that do not fit in the \
sections above.

Using the structured interview data below, generate the final Meeting Minutes \
(MoM) in the above format:

{interview_data}
";

/// The opening reply: a greeting followed by the first essential question.
pub fn greeting() -> String {
  format!(
    "Hi! I'll help you create Meeting Minutes. I'll ask you a series of \
     questions to gather all the necessary information. Let's begin with the \
     first question: {}",
    ESSENTIAL_QUESTIONS[0]
  )
}

/// True if `input` asks to start a minutes interview.
pub fn is_trigger(input: &str) -> bool {
  let lowered = input.to_lowercase();
  TRIGGER_PHRASES.iter().any(|p| lowered.contains(p))
}

/// System prompt that scripts the whole interview.
pub fn interview_system_prompt() -> String {
  let numbered = ESSENTIAL_QUESTIONS
    .iter()
    .enumerate()
    .map(|(i, q)| format!("{}. {q}", i + 1))
    .collect::<Vec<_>>()
    .join("\n");
  let bullets = |qs: &[&str]| {
    qs.iter().map(|q| format!("- {q}")).collect::<Vec<_>>().join("\n")
  };

  format!(
    "You are a highly intelligent meeting assistant designed to gather all \
     necessary information for creating accurate and detailed Meeting Minutes \
     (MoM). Your task is to conduct an interview with a consultant by asking \
     questions in a natural, conversational manner. Begin by asking the \
     essential questions below:\n\n\
     *Essential Questions:*\n{numbered}\n\n\
     After receiving responses to these, analyze the context of the \
     conversation to determine if additional details are needed. Based on the \
     context, ask any relevant optional questions from the following list to \
     enrich the meeting record:\n\n\
     *Optional Questions (ask if context indicates relevance):*\n{optional}\n\n\
     Once you have gathered all the necessary and contextually relevant \
     responses, also ask:\n{closing}\n\n\
     Before concluding, confirm with the user if there is any additional \
     information they would like to add. Your goal is to ensure that every \
     piece of relevant data is captured in a structured way to form a complete \
     MoM. Always maintain a conversational tone, adapt your questions based on \
     previous responses, and guide the conversation naturally toward a \
     comprehensive meeting record. When you present the finished minutes, \
     start your reply with the heading \"{FINAL_MINUTES_MARKER}\" followed by \
     a blank line.",
    optional = bullets(&OPTIONAL_QUESTIONS),
    closing = bullets(&CLOSING_QUESTIONS),
  )
}

/// The minutes generation prompt with `interview_data` spliced in.
pub fn minutes_prompt(interview_data: &str) -> String {
  MINUTES_TEMPLATE.replace("{interview_data}", interview_data)
}
