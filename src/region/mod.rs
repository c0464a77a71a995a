//! Slitlet regions on the detector.
//!
//! - `scan`: frontier values at one column → integer row range
//! - `materialize`: all slitlets × all columns → mask or extracted image

pub mod materialize;
pub mod scan;

pub use materialize::*;
pub use scan::*;
