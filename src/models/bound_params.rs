//! Fitted boundary parameter model ("multislit").
//!
//! The model describes every slitlet boundary through ten distortion/geometry
//! parameters. In the multislit variant each parameter is itself a polynomial
//! in the CSU bar-center position `csu`, stored as `a0s, a1s, …` (coefficient
//! of `csu^k` is `aks`).
//!
//! In the undistorted frame slitlet `i` spans rows
//!
//! ```text
//! ybottom = 100·y_baseline + (i - 1)·(10·slit_height + slit_gap)
//! ytop    = ybottom + 10·slit_height
//! ```
//!
//! and its frontiers sit half a gap outside: `ybottom - slit_gap/2` and
//! `ytop + slit_gap/2`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::PARMODEL_MULTISLIT;
use crate::error::AppError;
use crate::math::polyval;
use crate::models::Distortion;

/// Persisted boundary parameter file, as read from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundParamRecord {
    #[serde(rename = "meta-info")]
    pub meta_info: BoundParamMetaInfo,
    pub tags: BoundParamTags,
    pub contents: BTreeMap<String, BTreeMap<String, f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundParamMetaInfo {
    pub parmodel: String,
    /// Provenance fields (creation date, fitting tool, …) carried through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundParamTags {
    #[serde(default)]
    pub grism: Option<String>,
    #[serde(default)]
    pub filter: Option<String>,
    pub islitlet_min: i64,
    pub islitlet_max: i64,
}

/// Names of the ten model parameters, in file order.
pub const PARAMETER_NAMES: [&str; 10] = [
    "c2",
    "c4",
    "ff",
    "slit_gap",
    "slit_height",
    "theta0_origin",
    "theta0_slope",
    "x0",
    "y0",
    "y_baseline",
];

/// A model parameter as a polynomial in the bar-center position.
#[derive(Debug, Clone, PartialEq)]
pub struct BarPolynomial(Vec<f64>);

impl BarPolynomial {
    pub fn eval(&self, csu_bar_slit_center: f64) -> f64 {
        polyval(&self.0, csu_bar_slit_center)
    }

    pub fn coeffs(&self) -> &[f64] {
        &self.0
    }

    fn coeff(&self, k: usize) -> f64 {
        self.0.get(k).copied().unwrap_or(0.0)
    }

    fn from_entry(name: &str, entry: &BTreeMap<String, f64>) -> Result<Self, AppError> {
        if entry.is_empty() {
            return Err(AppError::schema(format!("Parameter '{name}' has no coefficients.")));
        }
        let mut coeffs = Vec::with_capacity(entry.len());
        for k in 0..entry.len() {
            let key = format!("a{k}s");
            let value = entry.get(&key).ok_or_else(|| {
                AppError::schema(format!(
                    "Parameter '{name}' must define contiguous coefficients a0s..a{}s; '{key}' is missing.",
                    entry.len() - 1
                ))
            })?;
            if !value.is_finite() {
                return Err(AppError::schema(format!("Parameter '{name}.{key}' is not finite.")));
            }
            coeffs.push(*value);
        }
        Ok(Self(coeffs))
    }
}

/// All ten multislit parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MultislitParams {
    pub c2: BarPolynomial,
    pub c4: BarPolynomial,
    pub ff: BarPolynomial,
    pub slit_gap: BarPolynomial,
    pub slit_height: BarPolynomial,
    pub theta0_origin: BarPolynomial,
    pub theta0_slope: BarPolynomial,
    pub x0: BarPolynomial,
    pub y0: BarPolynomial,
    pub y_baseline: BarPolynomial,
}

impl MultislitParams {
    /// `(name, polynomial)` pairs in file order.
    pub fn entries(&self) -> [(&'static str, &BarPolynomial); 10] {
        [
            ("c2", &self.c2),
            ("c4", &self.c4),
            ("ff", &self.ff),
            ("slit_gap", &self.slit_gap),
            ("slit_height", &self.slit_height),
            ("theta0_origin", &self.theta0_origin),
            ("theta0_slope", &self.theta0_slope),
            ("x0", &self.x0),
            ("y0", &self.y0),
            ("y_baseline", &self.y_baseline),
        ]
    }
}

/// Validated, immutable boundary parameter model.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryParameterModel {
    params: MultislitParams,
    degree: usize,
    islitlet_min: usize,
    islitlet_max: usize,
    grism: Option<String>,
    filter: Option<String>,
}

impl BoundaryParameterModel {
    /// Validate a parsed parameter file.
    pub fn from_record(record: &BoundParamRecord) -> Result<Self, AppError> {
        let parmodel = record.meta_info.parmodel.as_str();
        if parmodel != PARMODEL_MULTISLIT {
            return Err(AppError::schema(format!(
                "Unexpected parameter model '{parmodel}' (expected '{PARMODEL_MULTISLIT}')."
            )));
        }

        let (min, max) = (record.tags.islitlet_min, record.tags.islitlet_max);
        if min < 1 || max < min {
            return Err(AppError::schema(format!(
                "Invalid slitlet bounds islitlet_min={min}, islitlet_max={max}."
            )));
        }

        for name in record.contents.keys() {
            if !PARAMETER_NAMES.contains(&name.as_str()) {
                log::warn!("ignoring unknown boundary parameter '{name}'");
            }
        }
        let get = |name: &str| -> Result<BarPolynomial, AppError> {
            let entry = record
                .contents
                .get(name)
                .ok_or_else(|| AppError::schema(format!("Missing boundary parameter '{name}'.")))?;
            BarPolynomial::from_entry(name, entry)
        };

        let params = MultislitParams {
            c2: get("c2")?,
            c4: get("c4")?,
            ff: get("ff")?,
            slit_gap: get("slit_gap")?,
            slit_height: get("slit_height")?,
            theta0_origin: get("theta0_origin")?,
            theta0_slope: get("theta0_slope")?,
            x0: get("x0")?,
            y0: get("y0")?,
            y_baseline: get("y_baseline")?,
        };
        let degree = params
            .entries()
            .iter()
            .map(|(_, p)| p.coeffs().len() - 1)
            .max()
            .unwrap_or(0);

        Ok(Self {
            params,
            degree,
            islitlet_min: min as usize,
            islitlet_max: max as usize,
            grism: record.tags.grism.clone(),
            filter: record.tags.filter.clone(),
        })
    }

    pub fn parmodel(&self) -> &'static str {
        PARMODEL_MULTISLIT
    }

    /// Highest power of the bar-center position used by any parameter.
    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn islitlet_min(&self) -> usize {
        self.islitlet_min
    }

    pub fn islitlet_max(&self) -> usize {
        self.islitlet_max
    }

    pub fn grism(&self) -> Option<&str> {
        self.grism.as_deref()
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn params(&self) -> &MultislitParams {
        &self.params
    }

    fn check_slitlet(&self, islitlet: usize) -> Result<(), AppError> {
        if islitlet < self.islitlet_min || islitlet > self.islitlet_max {
            return Err(AppError::range(format!(
                "Slitlet {islitlet} outside model bounds [{}, {}].",
                self.islitlet_min, self.islitlet_max
            )));
        }
        Ok(())
    }

    /// Undistorted frontier rows of `islitlet` as polynomials in the bar center.
    ///
    /// Returns `(lower, upper)`, each with `degree() + 1` coefficients.
    pub fn coefficients_for(&self, islitlet: usize) -> Result<(Vec<f64>, Vec<f64>), AppError> {
        self.check_slitlet(islitlet)?;
        let p = &self.params;
        let offset = (islitlet - 1) as f64;

        let mut lower = Vec::with_capacity(self.degree + 1);
        let mut upper = Vec::with_capacity(self.degree + 1);
        for k in 0..=self.degree {
            let yb = p.y_baseline.coeff(k);
            let sh = p.slit_height.coeff(k);
            let sg = p.slit_gap.coeff(k);
            let bottom = 100.0 * yb + offset * (10.0 * sh + sg);
            lower.push(bottom - sg / 2.0);
            upper.push(bottom + 10.0 * sh + sg / 2.0);
        }
        Ok((lower, upper))
    }

    /// Distortion parameters of `islitlet` at the given bar-center position.
    pub fn distortion_at(&self, islitlet: usize, csu_bar_slit_center: f64) -> Result<Distortion, AppError> {
        self.check_slitlet(islitlet)?;
        let p = &self.params;
        let csu = csu_bar_slit_center;
        let theta0 = p.theta0_origin.eval(csu) / 1.0e3 + p.theta0_slope.eval(csu) / 1.0e4 * islitlet as f64;
        Ok(Distortion {
            c2: p.c2.eval(csu),
            c4: p.c4.eval(csu),
            ff: p.ff.eval(csu),
            theta0,
            x0: p.x0.eval(csu),
            y0: p.y0.eval(csu),
        })
    }
}
