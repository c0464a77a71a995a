//! Configurable Slit Unit (CSU) bar positions.
//!
//! The CSU has 55 bar pairs. Header keyword `CSUP{i}` holds the position of
//! the left bar of pair `i` and `CSUP{i+55}` the right bar, measured from the
//! opposite side of the unit (hence `341.5 - value`). Slitlet `i` is the
//! aperture between the two bars of pair `i`.

use crate::domain::EMIR_NBARS;
use crate::error::AppError;
use crate::io::FrameHeader;

/// Full width of the CSU in mm, used to flip right-bar readings.
const CSU_RIGHT_BAR_ORIGIN: f64 = 341.5;

/// Bar positions of one exposure.
#[derive(Debug, Clone, PartialEq)]
pub struct CsuConfiguration {
    bar_left: Vec<f64>,
    bar_right: Vec<f64>,
}

impl CsuConfiguration {
    /// Read all bar positions from a frame header.
    pub fn from_header(header: &FrameHeader) -> Result<Self, AppError> {
        let mut bar_left = Vec::with_capacity(EMIR_NBARS);
        let mut bar_right = Vec::with_capacity(EMIR_NBARS);
        for ibar in 1..=EMIR_NBARS {
            bar_left.push(header.require_f64(&format!("CSUP{ibar}"))?);
            bar_right.push(CSU_RIGHT_BAR_ORIGIN - header.require_f64(&format!("CSUP{}", ibar + EMIR_NBARS))?);
        }
        Ok(Self { bar_left, bar_right })
    }

    pub fn nbars(&self) -> usize {
        self.bar_left.len()
    }

    fn index(&self, islitlet: usize) -> Result<usize, AppError> {
        if islitlet == 0 || islitlet > self.nbars() {
            return Err(AppError::range(format!(
                "Slitlet {islitlet} has no CSU bar pair (valid: 1..={}).",
                self.nbars()
            )));
        }
        Ok(islitlet - 1)
    }

    pub fn bar_left(&self, islitlet: usize) -> Result<f64, AppError> {
        Ok(self.bar_left[self.index(islitlet)?])
    }

    pub fn bar_right(&self, islitlet: usize) -> Result<f64, AppError> {
        Ok(self.bar_right[self.index(islitlet)?])
    }

    /// Midpoint between the left and right bars (mm).
    pub fn csu_bar_slit_center(&self, islitlet: usize) -> Result<f64, AppError> {
        let i = self.index(islitlet)?;
        Ok((self.bar_left[i] + self.bar_right[i]) / 2.0)
    }

    /// Aperture width (mm).
    pub fn csu_bar_slit_width(&self, islitlet: usize) -> Result<f64, AppError> {
        let i = self.index(islitlet)?;
        Ok(self.bar_right[i] - self.bar_left[i])
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::io::HeaderValue;

    /// Every slit `i` centred at `100 + i` mm with a 2 mm aperture.
    pub(crate) fn insert_bars(header: &mut FrameHeader) {
        for ibar in 1..=EMIR_NBARS {
            let center = 100.0 + ibar as f64;
            header.insert(&format!("CSUP{ibar}"), HeaderValue::Float(center - 1.0));
            header.insert(
                &format!("CSUP{}", ibar + EMIR_NBARS),
                HeaderValue::Float(CSU_RIGHT_BAR_ORIGIN - (center + 1.0)),
            );
        }
    }

    #[test]
    fn bar_centers_and_widths() {
        let mut header = FrameHeader::default();
        insert_bars(&mut header);
        let csu = CsuConfiguration::from_header(&header).unwrap();

        assert_eq!(csu.nbars(), 55);
        assert!((csu.csu_bar_slit_center(7).unwrap() - 107.0).abs() < 1e-9);
        assert!((csu.csu_bar_slit_width(7).unwrap() - 2.0).abs() < 1e-9);
        assert!((csu.bar_left(1).unwrap() - 100.0).abs() < 1e-9);
        assert!((csu.bar_right(55).unwrap() - 156.0).abs() < 1e-9);
    }

    #[test]
    fn integer_readings_are_accepted() {
        let mut header = FrameHeader::default();
        insert_bars(&mut header);
        header.insert("CSUP3", HeaderValue::Int(90));
        let csu = CsuConfiguration::from_header(&header).unwrap();
        assert_eq!(csu.bar_left(3).unwrap(), 90.0);
    }

    #[test]
    fn missing_keyword_is_a_header_error() {
        let mut header = FrameHeader::default();
        insert_bars(&mut header);
        header.insert("CSUP60", HeaderValue::Str("n/a".to_string()));
        let err = CsuConfiguration::from_header(&header).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HeaderValidation);
        assert!(err.message().contains("CSUP60"));
    }

    #[test]
    fn slitlet_without_bar_is_a_range_error() {
        let mut header = FrameHeader::default();
        insert_bars(&mut header);
        let csu = CsuConfiguration::from_header(&header).unwrap();
        assert_eq!(csu.csu_bar_slit_center(56).unwrap_err().kind(), ErrorKind::Range);
        assert_eq!(csu.csu_bar_slit_center(0).unwrap_err().kind(), ErrorKind::Range);
    }
}
