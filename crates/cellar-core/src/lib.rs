//! Core types and the pipeline driver for the cellar wine warehouse.
//!
//! This crate knows nothing about a concrete database. It loads the source
//! CSV into a [`frame::Frame`], describes the star schema ([`schema`]), and
//! drives any [`store::WineWarehouse`] backend through the fixed ETL plan.

pub mod error;
pub mod frame;
pub mod loader;
pub mod pipeline;
pub mod schema;
pub mod store;
pub mod wine;

pub use error::{Error, Result};
