//! Data layer for the SCI dashboard.
//!
//! Reads raw rows from a [`store::RecordStore`], decodes them into typed
//! per-source rows, folds each source onto the month window with its
//! domain rule and assembles the final [`snapshot::DashboardSnapshot`].

pub mod records;
pub mod reducers;
pub mod rest;
pub mod snapshot;
pub mod store;

pub use sci_core as core;
