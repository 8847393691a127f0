//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and response projections
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: the account store over a sqlx pool

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{Account, Provider, UserIdentity, UserSummary};
pub use schema::SQLITE_INIT;
pub use sqlite::{AccountStore, SqlitePool};
