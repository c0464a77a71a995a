//! Frontier values → integer scan range at one detector column.
//!
//! Rows ("scans") are 1-based, `1..=NAXIS2`. The rounding rule decides which
//! border pixels belong to a slitlet:
//!
//! - `resize = true`: round outward, `[floor(y_lower), ceil(y_upper)]`, so every
//!   pixel touched by the slitlet is included
//! - `resize = false`: round inward, `[ceil(y_lower), floor(y_upper)]`
//!
//! Frontiers that already sit on integers give the same range either way.

use crate::domain::ScanRange;

/// Inclusive scan range between two frontier values, clamped to `[1, naxis2]`.
///
/// Returns `None` when a value is not finite, when inward rounding leaves no
/// pixel, or when the range falls entirely off the detector. Partial clamping
/// at the detector edge is expected and silent.
pub fn scan_range(y_lower: f64, y_upper: f64, resize: bool, naxis2: usize) -> Option<ScanRange> {
    if !(y_lower.is_finite() && y_upper.is_finite()) || naxis2 == 0 {
        return None;
    }

    let (lo, hi) = if resize {
        (y_lower.floor(), y_upper.ceil())
    } else {
        (y_lower.ceil(), y_upper.floor())
    };

    let n1 = lo.max(1.0);
    let n2 = hi.min(naxis2 as f64);
    if n1 > n2 {
        return None;
    }

    Some(ScanRange {
        n1: n1 as usize,
        n2: n2 as usize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(n1: usize, n2: usize) -> Option<ScanRange> {
        Some(ScanRange { n1, n2 })
    }

    #[test]
    fn integer_frontiers_ignore_resize() {
        assert_eq!(scan_range(5.0, 10.0, false, 2048), range(5, 10));
        assert_eq!(scan_range(5.0, 10.0, true, 2048), range(5, 10));
    }

    #[test]
    fn resize_rounds_outward_otherwise_inward() {
        assert_eq!(scan_range(4.2, 9.7, true, 2048), range(4, 10));
        assert_eq!(scan_range(4.2, 9.7, false, 2048), range(5, 9));
    }

    #[test]
    fn clamps_to_detector_rows() {
        assert_eq!(scan_range(-3.4, 12.1, true, 2048), range(1, 13));
        assert_eq!(scan_range(2040.5, 2060.0, true, 2048), range(2040, 2048));
        assert_eq!(scan_range(0.2, 0.9, true, 2048), range(1, 1));
    }

    #[test]
    fn empty_or_off_detector_ranges_yield_nothing() {
        // Inward rounding inside a single pixel.
        assert_eq!(scan_range(4.2, 4.8, false, 2048), None);
        // Entirely below / above the detector.
        assert_eq!(scan_range(-20.0, -5.0, true, 2048), None);
        assert_eq!(scan_range(2100.0, 2140.0, true, 2048), None);
        // Inverted frontiers.
        assert_eq!(scan_range(12.0, 8.0, true, 2048), None);
        assert_eq!(scan_range(f64::NAN, 8.0, true, 2048), None);
    }
}
