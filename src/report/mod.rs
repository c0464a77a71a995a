//! Reporting utilities: parameter model, per-slitlet and run summaries.

pub mod format;

pub use format::*;
