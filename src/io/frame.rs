//! Detector frame files.
//!
//! A frame is stored as JSON with a flat FITS-like header and the pixel array
//! as a list of rows (row 1 first, each with `NAXIS1` values):
//!
//! ```json
//! { "header": { "NAXIS1": 2048, "NAXIS2": 2048, "INSTRUME": "EMIR", ... },
//!   "data": [[...], [...]] }
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::domain::{DetectorGeometry, EMIR_INSTRUMENT};
use crate::error::AppError;

/// A single header card value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl HeaderValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HeaderValue::Int(v) => Some(*v as f64),
            HeaderValue::Float(v) => Some(*v),
            HeaderValue::Bool(_) | HeaderValue::Str(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            HeaderValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::Str(v) => Some(v),
            _ => None,
        }
    }
}

/// Frame header keyed by upper-case keyword.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameHeader(BTreeMap<String, HeaderValue>);

impl FrameHeader {
    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.0.get(&key.to_ascii_uppercase())
    }

    pub fn insert(&mut self, key: &str, value: HeaderValue) {
        self.0.insert(key.to_ascii_uppercase(), value);
    }

    fn require(&self, key: &str) -> Result<&HeaderValue, AppError> {
        self.get(key)
            .ok_or_else(|| AppError::header(format!("Missing header keyword {}.", key.to_ascii_uppercase())))
    }

    pub fn require_f64(&self, key: &str) -> Result<f64, AppError> {
        self.require(key)?
            .as_f64()
            .ok_or_else(|| AppError::header(format!("Header keyword {key} is not numeric.")))
    }

    pub fn require_i64(&self, key: &str) -> Result<i64, AppError> {
        self.require(key)?
            .as_i64()
            .ok_or_else(|| AppError::header(format!("Header keyword {key} is not an integer.")))
    }

    pub fn require_str(&self, key: &str) -> Result<&str, AppError> {
        self.require(key)?
            .as_str()
            .ok_or_else(|| AppError::header(format!("Header keyword {key} is not a string.")))
    }
}

/// A detector frame: header plus `NAXIS2 × NAXIS1` pixel data.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub header: FrameHeader,
    pub data: DMatrix<f64>,
}

/// Header fields the selection consumes, after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameInfo {
    pub naxis1: usize,
    pub naxis2: usize,
    pub grism: String,
    pub filter: String,
    pub rotang: f64,
}

#[derive(Serialize, Deserialize)]
struct FrameRecord {
    header: FrameHeader,
    data: Vec<Vec<f64>>,
}

/// Read a frame file.
pub fn read_frame(path: &Path) -> Result<Frame, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open frame '{}': {e}", path.display())))?;
    let record: FrameRecord = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        if e.is_io() {
            AppError::io(format!("Failed to read frame '{}': {e}", path.display()))
        } else {
            AppError::header(format!("Invalid frame file '{}': {e}", path.display()))
        }
    })?;

    let nrows = record.data.len();
    let ncols = record.data.first().map_or(0, Vec::len);
    if nrows == 0 || ncols == 0 {
        return Err(AppError::header(format!("Frame '{}' has no pixel data.", path.display())));
    }
    if let Some((idx, row)) = record.data.iter().enumerate().find(|(_, r)| r.len() != ncols) {
        return Err(AppError::header(format!(
            "Frame '{}' row {} has {} values, expected {ncols}.",
            path.display(),
            idx + 1,
            row.len()
        )));
    }

    let data = DMatrix::from_fn(nrows, ncols, |r, c| record.data[r][c]);
    Ok(Frame {
        header: record.header,
        data,
    })
}

/// Check instrument and dimensions, and collect the consumed header fields.
pub fn validate_frame(frame: &Frame, geometry: &DetectorGeometry) -> Result<FrameInfo, AppError> {
    let naxis1 = frame.header.require_i64("NAXIS1")?;
    let naxis2 = frame.header.require_i64("NAXIS2")?;
    let (rows, cols) = frame.data.shape();
    if naxis1 != cols as i64 || naxis2 != rows as i64 {
        return Err(AppError::header(format!(
            "NAXIS1={naxis1}, NAXIS2={naxis2} do not match the data shape ({cols} columns × {rows} rows)."
        )));
    }
    if cols != geometry.naxis1 || rows != geometry.naxis2 {
        return Err(AppError::header(format!(
            "NAXIS1={cols}, NAXIS2={rows} unexpected for the EMIR detector ({} × {}).",
            geometry.naxis1, geometry.naxis2
        )));
    }

    let instrument = frame.header.require_str("INSTRUME")?;
    if instrument.trim() != EMIR_INSTRUMENT {
        return Err(AppError::header(format!(
            "INSTRUME keyword is '{instrument}', expected '{EMIR_INSTRUMENT}'."
        )));
    }

    Ok(FrameInfo {
        naxis1: cols,
        naxis2: rows,
        grism: frame.header.require_str("GRISM")?.trim().to_string(),
        filter: frame.header.require_str("FILTER")?.trim().to_string(),
        rotang: frame.header.require_f64("ROTANG")?,
    })
}

/// Fail if `path` already exists; outputs are never overwritten.
pub fn ensure_new_file(path: &Path) -> Result<(), AppError> {
    if path.exists() {
        return Err(AppError::io(format!("Output file '{}' already exists.", path.display())));
    }
    Ok(())
}

/// Write a frame file.
///
/// Data goes to a temporary sibling first and is renamed into place only once
/// it is complete.
pub fn write_frame(path: &Path, frame: &Frame) -> Result<(), AppError> {
    ensure_new_file(path)?;

    let (rows, cols) = frame.data.shape();
    let record = FrameRecord {
        header: frame.header.clone(),
        data: (0..rows)
            .map(|r| (0..cols).map(|c| frame.data[(r, c)]).collect())
            .collect(),
    };

    let tmp = partial_path(path);
    let result = (|| {
        let file = File::create(&tmp)
            .map_err(|e| AppError::io(format!("Failed to create '{}': {e}", tmp.display())))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &record)
            .map_err(|e| AppError::io(format!("Failed to write frame '{}': {e}", path.display())))?;
        writer
            .flush()
            .map_err(|e| AppError::io(format!("Failed to write frame '{}': {e}", path.display())))?;
        std::fs::rename(&tmp, path)
            .map_err(|e| AppError::io(format!("Failed to move frame into '{}': {e}", path.display())))
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    pub(crate) fn emir_header(naxis1: usize, naxis2: usize) -> FrameHeader {
        let mut header = FrameHeader::default();
        header.insert("NAXIS1", HeaderValue::Int(naxis1 as i64));
        header.insert("NAXIS2", HeaderValue::Int(naxis2 as i64));
        header.insert("INSTRUME", HeaderValue::Str("EMIR".to_string()));
        header.insert("GRISM", HeaderValue::Str("J".to_string()));
        header.insert("FILTER", HeaderValue::Str("J".to_string()));
        header.insert("ROTANG", HeaderValue::Float(90.0));
        header
    }

    pub(crate) fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("emir-slitlets-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(format!("{name}.json"))
    }

    fn small_frame() -> Frame {
        Frame {
            header: emir_header(3, 2),
            data: DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
        }
    }

    #[test]
    fn header_values_deserialize_by_shape() {
        let header: FrameHeader = serde_json::from_value(json!({
            "NAXIS1": 2048, "ROTANG": 89.5, "INSTRUME": "EMIR", "SIMPLE": true
        }))
        .unwrap();
        assert_eq!(header.get("naxis1"), Some(&HeaderValue::Int(2048)));
        assert_eq!(header.require_f64("NAXIS1").unwrap(), 2048.0);
        assert_eq!(header.require_f64("ROTANG").unwrap(), 89.5);
        assert_eq!(header.require_str("instrume").unwrap(), "EMIR");
        assert_eq!(header.require_f64("SIMPLE").unwrap_err().kind(), ErrorKind::HeaderValidation);
    }

    #[test]
    fn validate_accepts_matching_frame() {
        let geometry = DetectorGeometry { naxis1: 3, naxis2: 2 };
        let info = validate_frame(&small_frame(), &geometry).unwrap();
        assert_eq!((info.naxis1, info.naxis2), (3, 2));
        assert_eq!(info.grism, "J");
        assert_eq!(info.rotang, 90.0);
    }

    #[test]
    fn validate_rejects_wrong_instrument_and_shapes() {
        let geometry = DetectorGeometry { naxis1: 3, naxis2: 2 };

        let mut frame = small_frame();
        frame.header.insert("INSTRUME", HeaderValue::Str("OSIRIS".to_string()));
        assert_eq!(validate_frame(&frame, &geometry).unwrap_err().kind(), ErrorKind::HeaderValidation);

        let mut frame = small_frame();
        frame.header.insert("NAXIS1", HeaderValue::Int(4));
        assert_eq!(validate_frame(&frame, &geometry).unwrap_err().kind(), ErrorKind::HeaderValidation);

        let emir = DetectorGeometry::default();
        let err = validate_frame(&small_frame(), &emir).unwrap_err();
        assert!(err.message().contains("EMIR detector"));
    }

    #[test]
    fn write_then_read_preserves_layout_and_refuses_overwrite() {
        let path = temp_path("frame_io");
        let _ = std::fs::remove_file(&path);

        let frame = small_frame();
        write_frame(&path, &frame).unwrap();
        let back = read_frame(&path).unwrap();
        assert_eq!(back.data[(1, 0)], 4.0);
        assert_eq!(back, frame);
        assert!(!partial_path(&path).exists());

        let err = write_frame(&path, &frame).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let path = temp_path("ragged");
        std::fs::write(&path, r#"{"header": {}, "data": [[1.0, 2.0], [3.0]]}"#).unwrap();
        let err = read_frame(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HeaderValidation);
        assert!(err.message().contains("row 2"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_frame_is_an_io_error() {
        let err = read_frame(Path::new("/nonexistent/frame.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
