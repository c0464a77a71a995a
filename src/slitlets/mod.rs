//! Slitlet selection from textual range specifications.

pub mod range;

pub use range::parse as parse_slitlets;
