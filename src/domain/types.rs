//! Shared domain types.
//!
//! Kept small and plain so the selector, the scanner and the materializer can
//! exchange them without pulling in I/O concerns.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Detector width (columns) of the EMIR science array.
pub const EMIR_NAXIS1: usize = 2048;
/// Detector height (rows) of the EMIR science array.
pub const EMIR_NAXIS2: usize = 2048;
/// Number of CSU bar pairs, one per slitlet.
pub const EMIR_NBARS: usize = 55;
/// Expected `INSTRUME` header value.
pub const EMIR_INSTRUMENT: &str = "EMIR";
/// The only boundary model kind understood by the frontier expander.
pub const PARMODEL_MULTISLIT: &str = "multislit";

/// Number of points sampled along each distorted frontier before re-fitting.
pub const DEFAULT_SAMPLE_COUNT: usize = 101;
/// Degree of the per-exposure frontier polynomial.
pub const DEFAULT_FIT_DEGREE: usize = 5;

/// Detector extent in pixels (`NAXIS1` columns × `NAXIS2` rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorGeometry {
    pub naxis1: usize,
    pub naxis2: usize,
}

impl Default for DetectorGeometry {
    fn default() -> Self {
        Self {
            naxis1: EMIR_NAXIS1,
            naxis2: EMIR_NAXIS2,
        }
    }
}

impl DetectorGeometry {
    /// EMIR geometry, optionally overridden by `EMIR_NAXIS1` / `EMIR_NAXIS2`
    /// (process environment or `.env`).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let mut geometry = Self::default();
        if let Some(v) = env_usize("EMIR_NAXIS1")? {
            geometry.naxis1 = v;
        }
        if let Some(v) = env_usize("EMIR_NAXIS2")? {
            geometry.naxis2 = v;
        }
        Ok(geometry)
    }
}

fn env_usize(key: &str) -> Result<Option<usize>, AppError> {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse::<usize>() {
            Ok(v) if v > 0 => Ok(Some(v)),
            _ => Err(AppError::usage(format!("{key}='{raw}' is not a positive integer."))),
        },
        Err(_) => Ok(None),
    }
}

/// What the materializer writes inside each scan range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionMode {
    /// Write `1.0`.
    Mask,
    /// Copy the source pixel value.
    Extract,
}

impl RegionMode {
    pub fn from_mask_only(mask_only: bool) -> Self {
        if mask_only { RegionMode::Mask } else { RegionMode::Extract }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            RegionMode::Mask => "mask",
            RegionMode::Extract => "extraction",
        }
    }
}

/// Inclusive 1-based row interval `[n1, n2]` at a single detector column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRange {
    pub n1: usize,
    pub n2: usize,
}

impl ScanRange {
    /// Number of rows covered (always at least one).
    pub fn row_count(&self) -> usize {
        self.n2 - self.n1 + 1
    }

    /// 0-based row indices covered by this range.
    pub fn rows(&self) -> std::ops::RangeInclusive<usize> {
        (self.n1 - 1)..=(self.n2 - 1)
    }
}

/// Verbosity codes accepted by `--debugplot`.
pub const DEBUGPLOT_CODES: [i32; 15] = [0, -1, 1, -2, 2, -10, 10, -11, 11, -12, 12, -21, 21, -22, 22];

/// Reporting verbosity derived from a `--debugplot` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebugLevel(i32);

impl DebugLevel {
    pub fn new(code: i32) -> Result<Self, AppError> {
        if DEBUGPLOT_CODES.contains(&code) {
            Ok(Self(code))
        } else {
            Err(AppError::usage(format!(
                "Invalid debugplot code {code}; expected one of {DEBUGPLOT_CODES:?}."
            )))
        }
    }

    pub fn code(self) -> i32 {
        self.0
    }

    /// Print the boundary parameter model.
    pub fn show_params(self) -> bool {
        matches!(self.0.abs(), 21 | 22)
    }

    /// Print the per-slitlet frontier summary.
    pub fn show_slitlets(self) -> bool {
        self.0.abs() % 10 != 0
    }
}

/// A full selection run's configuration as understood by the pipeline.
///
/// Derived from CLI flags (or recipe inputs) plus defaults.
#[derive(Debug, Clone)]
pub struct SelectConfig {
    pub frame_path: PathBuf,
    pub bound_param_path: PathBuf,
    pub slitlets: String,
    pub outfile: Option<PathBuf>,
    pub mode: RegionMode,
    pub debug: DebugLevel,
    pub geometry: DetectorGeometry,
    pub sample_count: usize,
    pub fit_degree: usize,
    /// Include partially covered border pixels (outward rounding).
    pub resize: bool,
}

impl SelectConfig {
    pub fn new(frame_path: PathBuf, bound_param_path: PathBuf, slitlets: impl Into<String>) -> Self {
        Self {
            frame_path,
            bound_param_path,
            slitlets: slitlets.into(),
            outfile: None,
            mode: RegionMode::Extract,
            debug: DebugLevel::default(),
            geometry: DetectorGeometry::default(),
            sample_count: DEFAULT_SAMPLE_COUNT,
            fit_degree: DEFAULT_FIT_DEGREE,
            resize: true,
        }
    }

    /// Output path: `--outfile`, else `<frame stem>_slitlets.json` beside the frame.
    pub fn output_path(&self) -> PathBuf {
        if let Some(path) = &self.outfile {
            return path.clone();
        }
        let stem = self
            .frame_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "frame".to_string());
        self.frame_path.with_file_name(format!("{stem}_slitlets.json"))
    }
}
