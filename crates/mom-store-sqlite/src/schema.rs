//! SQL schema for the minutes SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS consultants (
    id    INTEGER PRIMARY KEY,
    name  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    id             INTEGER PRIMARY KEY,
    consultant_id  INTEGER NOT NULL REFERENCES consultants(id),
    start_time     TEXT NOT NULL,                   -- RFC 3339 UTC
    status         TEXT NOT NULL DEFAULT 'active'   -- 'active' | 'closed'
);

-- One row per user turn. Append-only.
CREATE TABLE IF NOT EXISTS mom_data (
    id          INTEGER PRIMARY KEY,
    session_id  INTEGER NOT NULL REFERENCES sessions(id),
    question    TEXT NOT NULL,
    answer      TEXT NOT NULL,
    timestamp   TEXT NOT NULL
);

-- Generated minutes. Append-only; several per session are allowed.
CREATE TABLE IF NOT EXISTS mom_documents (
    id          INTEGER PRIMARY KEY,
    session_id  INTEGER NOT NULL REFERENCES sessions(id),
    content     TEXT NOT NULL,
    timestamp   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS mom_data_session_idx      ON mom_data(session_id);
CREATE INDEX IF NOT EXISTS mom_documents_session_idx ON mom_documents(session_id);

PRAGMA user_version = 1;
";
