//! Slitlet regions → output image.
//!
//! Two phases:
//!
//! - scan: every slitlet's per-column `ScanRange`s are computed independently
//!   (parallel across slitlets)
//! - write: ranges are applied serially in selection order, so where two
//!   slitlets overlap at a column the later one wins and the output is
//!   identical from run to run

use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::domain::{RegionMode, ScanRange};
use crate::fit::FrontierCurve;
use crate::region::scan_range;

/// One selected slitlet with its per-exposure frontiers.
#[derive(Debug, Clone)]
pub struct SlitletRegion {
    pub islitlet: usize,
    pub csu_bar_slit_center: f64,
    pub frontiers: FrontierCurve,
}

/// What was written for one slitlet.
#[derive(Debug, Clone, PartialEq)]
pub struct SlitletStats {
    pub islitlet: usize,
    pub columns: usize,
    pub pixels: usize,
    pub n1_min: Option<usize>,
    pub n2_max: Option<usize>,
}

/// Output image plus bookkeeping.
#[derive(Debug, Clone)]
pub struct Materialized {
    /// `NAXIS2` rows × `NAXIS1` columns.
    pub image: DMatrix<f64>,
    pub stats: Vec<SlitletStats>,
    /// Pixels written by more than one slitlet (last writer kept).
    pub overlapping_pixels: usize,
}

/// Per-column scan ranges (index `j` is column `j + 1`).
pub fn scan_slitlet(frontiers: &FrontierCurve, naxis1: usize, naxis2: usize, resize: bool) -> Vec<Option<ScanRange>> {
    (1..=naxis1)
        .map(|column| {
            let (y_lower, y_upper) = frontiers.eval(column as f64);
            scan_range(y_lower, y_upper, resize, naxis2)
        })
        .collect()
}

/// Build the mask / extraction image for `regions` over `source`.
pub fn materialize(source: &DMatrix<f64>, regions: &[SlitletRegion], mode: RegionMode, resize: bool) -> Materialized {
    let naxis2 = source.nrows();
    let naxis1 = source.ncols();

    let scans: Vec<Vec<Option<ScanRange>>> = regions
        .par_iter()
        .map(|region| scan_slitlet(&region.frontiers, naxis1, naxis2, resize))
        .collect();

    let mut image = DMatrix::<f64>::zeros(naxis2, naxis1);
    let mut touched = vec![false; naxis1 * naxis2];
    let mut overlapping_pixels = 0usize;
    let mut stats = Vec::with_capacity(regions.len());

    for (region, ranges) in regions.iter().zip(&scans) {
        let mut slit = SlitletStats {
            islitlet: region.islitlet,
            columns: 0,
            pixels: 0,
            n1_min: None,
            n2_max: None,
        };

        for (j, range) in ranges.iter().enumerate() {
            let Some(range) = range else { continue };
            slit.columns += 1;
            slit.pixels += range.row_count();
            slit.n1_min = Some(slit.n1_min.map_or(range.n1, |v| v.min(range.n1)));
            slit.n2_max = Some(slit.n2_max.map_or(range.n2, |v| v.max(range.n2)));

            for row in range.rows() {
                // Column-major, matching nalgebra's storage.
                let cell = j * naxis2 + row;
                if touched[cell] {
                    overlapping_pixels += 1;
                }
                touched[cell] = true;
                image[(row, j)] = match mode {
                    RegionMode::Mask => 1.0,
                    RegionMode::Extract => source[(row, j)],
                };
            }
        }

        log::debug!(
            "slitlet {}: {} columns, {} pixels",
            slit.islitlet,
            slit.columns,
            slit.pixels
        );
        stats.push(slit);
    }

    if overlapping_pixels > 0 {
        log::warn!("{overlapping_pixels} pixels claimed by more than one slitlet; later slitlets overwrite earlier ones");
    }

    Materialized {
        image,
        stats,
        overlapping_pixels,
    }
}
