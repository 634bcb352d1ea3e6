//! SQLite backend for the cellar wine warehouse.
//!
//! Wraps [`tokio_rusqlite`] so the single warehouse connection lives on its
//! own thread while the driver awaits each step in turn.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteWarehouse;
