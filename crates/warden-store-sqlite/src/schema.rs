//! SQL schema for the Warden SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Every timestamp column holds a fixed-width RFC 3339 UTC string (see
/// `encode::encode_dt`), so text comparison orders by time.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,  -- trimmed, lowercased
    name          TEXT,
    password_hash TEXT NOT NULL,         -- argon2 PHC string
    role          TEXT NOT NULL DEFAULT 'user'
                  CHECK (role IN ('user', 'manager', 'admin')),
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    session_id  TEXT PRIMARY KEY,
    token_hash  TEXT NOT NULL UNIQUE,    -- SHA-256 hex of the bearer token
    user_id     TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    expires_at  TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

-- owner_id is written once on INSERT and never updated.
CREATE TABLE IF NOT EXISTS todos (
    todo_id     TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    description TEXT,
    status      TEXT NOT NULL DEFAULT 'draft'
                CHECK (status IN ('draft', 'in_progress', 'completed')),
    owner_id    TEXT NOT NULL REFERENCES users(user_id),
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS todos_owner_idx       ON todos(owner_id);
CREATE INDEX IF NOT EXISTS todos_created_idx     ON todos(created_at);
CREATE INDEX IF NOT EXISTS sessions_expires_idx  ON sessions(expires_at);

PRAGMA user_version = 1;
";
