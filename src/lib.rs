//! File-backed product catalog
//!
//! A small CRUD service over a collection of product records persisted to a
//! single JSON file.
//!
//! - `record`: the open field mapping and its canonical persisted form.
//! - `store`: loading and rewriting the backing file, id assignment.
//! - `catalog`: the lock-guarded in-memory collection and its mutations.
//! - `handlers` / `app`: the HTTP surface, answering with `envelope::Envelope`.

pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod record;
pub mod state;
pub mod store;

pub use app::build_router;
pub use catalog::{Catalog, ProductRepository};
pub use envelope::Envelope;
pub use error::{AppError, CatalogError, StoreError};
pub use record::Record;
pub use store::{JsonFileStore, RecordStore, WriteMode};
