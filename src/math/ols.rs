//! Least squares solver for small polynomial fits.
//!
//! Frontier re-fits solve tall Vandermonde systems:
//!
//! ```text
//! minimize Σ (y_i - Σ_k c_k u_i^k)^2
//! ```
//!
//! with ~100 rows and at most a handful of columns.
//!
//! - We use SVD so the tall system is solved directly in the least-squares
//!   sense. (`QR::solve` in nalgebra expects square systems.)
//! - The abscissa is mapped to `[-1, 1]` by the caller, which keeps the
//!   Vandermonde columns well conditioned even for degree 5.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Tighter tolerances first; the scaled design matrix almost always passes the first.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}
