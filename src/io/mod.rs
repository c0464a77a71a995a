//! Input/output helpers.
//!
//! - frame read/validate/write (`frame`)
//! - boundary parameter files (`bound_params`)

pub mod bound_params;
pub mod frame;

pub use bound_params::*;
pub use frame::*;
