//! Instrument mechanical configuration read from frame headers.

pub mod csu;

pub use csu::*;
