//! Year-indexed tax tables for each jurisdiction.
//!
//! The compiled-in 2024 tables are the baseline. Override documents replace
//! individual top-level fields for specific years; the merged result is built
//! once and read-only afterwards.

pub mod builtin;
mod store;

pub use store::{JurisdictionTables, TableOverrides, TaxTableStore};
