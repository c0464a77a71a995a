//! Optical distortion of the EMIR spectroscopic field.
//!
//! Maps "virtual" (undistorted) pixel coordinates to real detector pixels with
//! a radial polynomial about the optical center, an anamorphic factor on the
//! spatial axis and a small rotation.

use std::f64::consts::PI;

/// Plate scale in radians per pixel (0.1944 arcsec/pixel).
const RAD_PER_PIXEL: f64 = 0.1944 * PI / (180.0 * 3600.0);

/// Distortion parameters resolved for one slitlet at one bar position.
///
/// Scaled as stored in the parameter file: the optical center is given in
/// units of 1000 pixels and the radial terms are pre-scaled by `1e4` / `1e9`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distortion {
    pub c2: f64,
    pub c4: f64,
    pub ff: f64,
    /// Rotation (radians).
    pub theta0: f64,
    pub x0: f64,
    pub y0: f64,
}

impl Distortion {
    /// No-op distortion centred on `(x0, y0)` (units of 1000 pixels).
    pub fn identity(x0: f64, y0: f64) -> Self {
        Self {
            c2: 0.0,
            c4: 0.0,
            ff: 1.0,
            theta0: 0.0,
            x0,
            y0,
        }
    }

    pub fn center_pixels(&self) -> (f64, f64) {
        (self.x0 * 1000.0, self.y0 * 1000.0)
    }

    /// Convert a virtual pixel to a real (distorted) pixel.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let (xc, yc) = self.center_pixels();
        let dx = x - xc;
        let dy = y - yc;

        let r_pix = dx.hypot(dy);
        let r_rad = RAD_PER_PIXEL * r_pix;
        let r2 = r_rad * r_rad;
        let rdist = 1.0 + self.c2 * 1.0e4 * r2 + self.c4 * 1.0e9 * r2 * r2;

        // Angle measured from the +y axis.
        let theta = dx.atan2(dy) + self.theta0;
        let xdist = rdist * r_pix * theta.sin() + xc;
        let ydist = self.ff * rdist * r_pix * theta.cos() + yc;
        (xdist, ydist)
    }
}
