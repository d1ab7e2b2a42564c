//! SQLite backend for the Coalesce identity store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Each `identify` call
//! executes the whole resolution inside one immediate transaction, which
//! serialises concurrent writers and keeps the single-primary invariant
//! intact.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
