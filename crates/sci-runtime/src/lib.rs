//! Runtime layer for the SCI dashboard.
//!
//! Runs the concurrent per-source fetch and drives the
//! window → fetch → reduce → assemble pipeline for one request.

pub mod orchestrator;
pub mod service;

pub use sci_core as core;
pub use sci_data as data;
