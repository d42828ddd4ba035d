//! Persistent memory of the last repository snapshot.
//!
//! A small SQLite database with one table, `snapshots`, keyed by name. Each
//! row holds a JSON-serialized [`Snapshot`](docwatch_repository::Snapshot).
//! Losing the database only means the next pass is treated as the first.

mod db;
pub mod error;
mod memory;

pub use crate::db::Database;
pub use crate::memory::{DEFAULT_KEY, Memory, Remembered};
