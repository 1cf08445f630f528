//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: the storage service owning the pool and write lock

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{NewPlay, PlayRecord};
pub use schema::SQLITE_INIT;
pub use sqlite::{PAGE_SIZE, SqlitePool, TrackStorage};
