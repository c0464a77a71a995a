//! `emir-slitlets` library crate.
//!
//! Locates the detector region of each selected slitlet of a raw EMIR
//! multislit frame (between its two distorted frontiers) and masks or extracts
//! it. The binary (`emir-slitlets`) is a thin wrapper around this library so
//! that core logic is testable without spawning processes.

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod instrument;
pub mod io;
pub mod math;
pub mod models;
pub mod recipe;
pub mod region;
pub mod report;
pub mod slitlets;
