//! SQL DDL for initializing the account store.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema with:
/// - `id` INTEGER PRIMARY KEY AUTOINCREMENT
/// - `username` UNIQUE NOT NULL across all providers
/// - `email` UNIQUE but nullable (local accounts may omit it)
/// - `password_hash` nullable (pure-SSO accounts carry none)
/// - `provider` one of local/google/github, defaulting to local
/// - `(provider, external_id)` index backing the SSO match path
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT UNIQUE NOT NULL,
    email TEXT UNIQUE,
    password_hash TEXT,
    provider TEXT NOT NULL DEFAULT 'local',
    external_id TEXT,
    avatar_url TEXT,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_users_provider_external_id ON users(provider, external_id);
"#;
