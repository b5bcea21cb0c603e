//! SQLite backend for the BookBrainz entity data layer.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod encode;
mod model;
mod schema;
mod sets;
mod store;

pub mod error;

pub use encode::raw_query;
pub use error::{Error, Result};
pub use model::SqliteEntityModel;
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
