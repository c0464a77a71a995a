//! Polynomials in a scaled abscissa.
//!
//! Frontier curves are evaluated at detector columns up to ~2048. A degree-5
//! power series in the raw column would mix terms spanning ~16 orders of
//! magnitude, so fitted polynomials carry their fit domain `[a, b]` and are
//! expressed in `u = (2x - (a + b)) / (b - a)`, which maps the domain onto
//! `[-1, 1]`.

use nalgebra::{DMatrix, DVector};

use crate::error::AppError;
use crate::math::solve_least_squares;

/// Evaluate a power series `Σ c_k x^k` (Horner).
pub fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// `n` evenly spaced values from `start` to `stop`, both inclusive.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n as f64 - 1.0);
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// A fitted polynomial `y(x)` stored in the scaled abscissa of its fit domain.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledPolynomial {
    coeffs: Vec<f64>,
    domain: [f64; 2],
}

impl ScaledPolynomial {
    /// Least-squares fit of a degree-`deg` polynomial through `(x_i, y_i)`.
    ///
    /// The domain is `[min(x), max(x)]`.
    pub fn fit(x: &[f64], y: &[f64], deg: usize) -> Result<Self, AppError> {
        if x.len() != y.len() {
            return Err(AppError::schema(format!(
                "Polynomial fit needs matching samples (x: {}, y: {}).",
                x.len(),
                y.len()
            )));
        }
        if x.len() <= deg {
            return Err(AppError::schema(format!(
                "Polynomial fit of degree {deg} needs more than {deg} samples, got {}.",
                x.len()
            )));
        }
        if x.iter().chain(y).any(|v| !v.is_finite()) {
            return Err(AppError::schema("Polynomial fit received non-finite samples."));
        }

        let lo = x.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if hi - lo <= 0.0 {
            return Err(AppError::schema("Polynomial fit needs a non-degenerate abscissa range."));
        }

        let domain = [lo, hi];
        let n = x.len();
        let mut design = DMatrix::<f64>::zeros(n, deg + 1);
        for (i, &xi) in x.iter().enumerate() {
            let u = scale(domain, xi);
            let mut p = 1.0;
            for k in 0..=deg {
                design[(i, k)] = p;
                p *= u;
            }
        }
        let rhs = DVector::from_column_slice(y);

        let coeffs = solve_least_squares(&design, &rhs)
            .ok_or_else(|| AppError::schema(format!("Degree-{deg} polynomial fit is ill-conditioned.")))?;

        Ok(Self {
            coeffs: coeffs.iter().copied().collect(),
            domain,
        })
    }

    pub fn eval(&self, x: f64) -> f64 {
        polyval(&self.coeffs, scale(self.domain, x))
    }

    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }
}

fn scale(domain: [f64; 2], x: f64) -> f64 {
    let [a, b] = domain;
    (2.0 * x - (a + b)) / (b - a)
}
