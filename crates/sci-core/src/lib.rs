//! Core building blocks for the SCI dashboard.
//!
//! Pure, I/O-free pieces shared by every other crate: the error type, the
//! clock/duration codec, the rolling month window, date resolution, pt-BR
//! number formatting, the typed record rows and the CLI settings.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_codec;
pub mod time_utils;
pub mod window;

pub use error::{DashboardError, Result};
