//! SQL DDL for initializing the account storage.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema with:
/// - `username` TEXT PRIMARY KEY (uniqueness of accounts)
/// - `password_hash` holding a bcrypt string, never plaintext
/// - `created_at` RFC3339
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    username TEXT PRIMARY KEY NOT NULL,
    fullname TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL -- RFC3339
);
"#;
