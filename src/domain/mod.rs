//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - detector constants and geometry (`DetectorGeometry`)
//! - the materializer mode (`RegionMode`) and per-column `ScanRange`
//! - run configuration (`SelectConfig`, `DebugLevel`)

pub mod types;

pub use types::*;
