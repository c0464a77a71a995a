//! Per-exposure frontier curves.
//!
//! The parameter model gives each slitlet's frontiers as horizontal lines in an
//! idealized (undistorted) frame whose row depends on the bar position. For one
//! exposure we:
//!
//! 1. resolve the undistorted frontier rows and the distortion at the slitlet's
//!    bar-center position
//! 2. push `sample_count` evenly spaced points along `[1, NAXIS1]` through the
//!    distortion
//! 3. least-squares fit a degree-`degree` polynomial to the distorted samples
//!
//! The result is cheap to evaluate at every detector column.

use crate::domain::{DEFAULT_FIT_DEGREE, DEFAULT_SAMPLE_COUNT, EMIR_NAXIS1};
use crate::error::AppError;
use crate::math::{ScaledPolynomial, linspace, polyval};
use crate::models::BoundaryParameterModel;

/// Sampling and fit settings for frontier expansion.
#[derive(Debug, Clone, Copy)]
pub struct ExpanderOptions {
    /// Columns spanned by the samples (`1..=naxis1`).
    pub naxis1: usize,
    pub sample_count: usize,
    pub degree: usize,
}

impl Default for ExpanderOptions {
    fn default() -> Self {
        Self {
            naxis1: EMIR_NAXIS1,
            sample_count: DEFAULT_SAMPLE_COUNT,
            degree: DEFAULT_FIT_DEGREE,
        }
    }
}

/// Lower/upper frontier of one slitlet for one exposure (column → row, 1-based).
#[derive(Debug, Clone, PartialEq)]
pub struct FrontierCurve {
    pub lower: ScaledPolynomial,
    pub upper: ScaledPolynomial,
}

impl FrontierCurve {
    /// `(y_lower, y_upper)` at a 1-based column.
    pub fn eval(&self, column: f64) -> (f64, f64) {
        (self.lower.eval(column), self.upper.eval(column))
    }
}

/// Expected distorted frontiers of `islitlet` at `csu_bar_slit_center`.
pub fn expected_frontiers(
    islitlet: usize,
    csu_bar_slit_center: f64,
    model: &BoundaryParameterModel,
    opts: &ExpanderOptions,
) -> Result<FrontierCurve, AppError> {
    if opts.naxis1 < 2 {
        return Err(AppError::usage(format!("NAXIS1={} is too small to sample frontiers.", opts.naxis1)));
    }
    if opts.sample_count <= opts.degree {
        return Err(AppError::usage(format!(
            "Frontier sampling needs more points ({}) than the fit degree ({}).",
            opts.sample_count, opts.degree
        )));
    }
    if !csu_bar_slit_center.is_finite() {
        return Err(AppError::range(format!(
            "Bar-center position of slitlet {islitlet} is not finite."
        )));
    }

    let (lower_coeffs, upper_coeffs) = model.coefficients_for(islitlet)?;
    let distortion = model.distortion_at(islitlet, csu_bar_slit_center)?;
    let xp = linspace(1.0, opts.naxis1 as f64, opts.sample_count);

    let fit_frontier = |coeffs: &[f64]| -> Result<ScaledPolynomial, AppError> {
        let y_undistorted = polyval(coeffs, csu_bar_slit_center);
        let (xs, ys): (Vec<f64>, Vec<f64>) = xp.iter().map(|&x| distortion.apply(x, y_undistorted)).unzip();
        let poly = ScaledPolynomial::fit(&xs, &ys, opts.degree).map_err(|e| {
            AppError::schema(format!("Frontier fit failed for slitlet {islitlet}: {}", e.message()))
        })?;
        if poly.coeffs().iter().any(|c| !c.is_finite()) {
            return Err(AppError::schema(format!(
                "Frontier fit for slitlet {islitlet} produced non-finite coefficients."
            )));
        }
        Ok(poly)
    };

    let curve = FrontierCurve {
        lower: fit_frontier(&lower_coeffs)?,
        upper: fit_frontier(&upper_coeffs)?,
    };
    log::debug!(
        "slitlet {islitlet}: csu={csu_bar_slit_center:.3} lower(1)={:.3} upper(1)={:.3}",
        curve.lower.eval(1.0),
        curve.upper.eval(1.0)
    );
    Ok(curve)
}
