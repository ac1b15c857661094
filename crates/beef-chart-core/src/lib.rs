//! Core types and utilities for the beef cut chart.
//!
//! This crate provides the foundational types shared by the store, the HTTP
//! service and the client:
//!
//! - **Identifiers**: `CutId`
//! - **Money**: `Price` (integer cents, two fractional digits)
//! - **Records**: `CutRecord`, `NewCut`, `CutUpdate`, `ChartPoint`
//! - **Catalog**: the 29-entry default catalog used for seeding and reset
//! - **Edits**: input coercion, price bounds and the bulk-edit report
//!
//! # Price Unit
//!
//! Prices are euros per kilogram with two fractional digits. They are held as
//! `i64` cents so that equality checks (the write-skip in the data access
//! layer) never depend on floating point noise.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod catalog;
pub mod cut;
pub mod edit;
pub mod error;
pub mod ids;
pub mod price;

pub use catalog::{default_catalog, DEFAULT_CATALOG, EXPECTED_CUT_COUNT};
pub use cut::{ChartPoint, CutRecord, CutUpdate, NewCut};
pub use edit::{
    coerce_id, coerce_price, is_ticked, lenient_scalar, presence_flag, BulkEditEntry,
    BulkEditReport, BulkStatus, EditError, Scalar,
};
pub use error::{CatalogError, Result};
pub use ids::CutId;
pub use price::{validate_price, Price, MAX_PRICE, MIN_PRICE};
