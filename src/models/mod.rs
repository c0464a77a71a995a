//! Boundary model implementations.
//!
//! - `bound_params`: the persisted multislit parameter model
//! - `distortion`: the virtual → real pixel transform it parameterizes

pub mod bound_params;
pub mod distortion;

pub use bound_params::*;
pub use distortion::*;
