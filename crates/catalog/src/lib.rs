//! Catalog domain module.
//!
//! This crate contains the catalog entry model and the rules the console
//! applies to it (draft validation, stock clamping, list filtering),
//! implemented purely as deterministic logic (no IO, no HTTP, no storage).

pub mod draft;
pub mod entry;
pub mod query;

pub use draft::{DraftForm, ProductDraft};
pub use entry::{CatalogEntry, LOW_STOCK_THRESHOLD, RESTOCK_QUANTITY};
pub use query::{CatalogFilter, CatalogSummary, CategoryFilter};
