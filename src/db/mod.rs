//! Database module: the credential store for accounts.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and conversions
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: pool construction and account queries

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{AccountProfile, DbAccount, NewAccount};
pub use schema::SQLITE_INIT;
pub use sqlite::{AccountsStorage, SqlitePool, connect_lazy};
