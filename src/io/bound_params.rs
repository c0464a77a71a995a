//! Read boundary parameter JSON files.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::AppError;
use crate::models::{BoundParamRecord, BoundaryParameterModel};

/// Read and validate a fitted boundary parameter file.
pub fn load_bound_params(path: &Path) -> Result<BoundaryParameterModel, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open boundary parameters '{}': {e}", path.display())))?;
    let record: BoundParamRecord = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        if e.is_io() {
            AppError::io(format!("Failed to read boundary parameters '{}': {e}", path.display()))
        } else {
            AppError::schema(format!("Invalid boundary parameter file '{}': {e}", path.display()))
        }
    })?;
    BoundaryParameterModel::from_record(&record)
}
