//! Per-exposure frontier fitting.
//!
//! Resolves the boundary model at a bar position, samples the distortion and
//! re-fits column → row polynomials for each slitlet.

pub mod frontiers;

pub use frontiers::*;
