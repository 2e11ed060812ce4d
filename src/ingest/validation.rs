//! Checks run around an upload: on the file before it is sent and on the
//! records the ingestion service returns.

use crate::{data::model::{Dataset, LocationRecord}, MapError, Result};
use serde::Serialize;

const INVALID_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Verdict on a parsed upload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub error: Option<String>,
    /// Records with coordinates or a non-blank address
    pub valid_count: usize,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn rejected(error: String, valid_count: usize) -> Self {
        Self {
            is_valid: false,
            error: Some(error),
            valid_count,
            warnings: Vec::new(),
        }
    }

    /// Converts a rejection into an error; warnings pass through
    pub fn into_result(self) -> Result<Vec<String>> {
        match self.error {
            Some(error) if !self.is_valid => Err(MapError::Validation(error).into()),
            _ => Ok(self.warnings),
        }
    }
}

pub fn validate_upload_result(records: &[LocationRecord]) -> ValidationResult {
    if records.is_empty() {
        return ValidationResult::rejected("no data in upload".to_string(), 0);
    }

    let with_coordinates = records.iter().filter(|r| r.has_coordinates()).count();
    let with_address = records
        .iter()
        .filter(|r| !r.address.trim().is_empty())
        .count();
    let valid_count = records
        .iter()
        .filter(|r| r.has_coordinates() || !r.address.trim().is_empty())
        .count();

    if valid_count == 0 {
        return ValidationResult::rejected(
            "no usable location data (address or coordinates)".to_string(),
            0,
        );
    }

    let total = records.len();
    let valid_percentage = valid_count as f64 / total as f64 * 100.0;
    if valid_percentage < 50.0 {
        return ValidationResult::rejected(
            format!(
                "too few valid records ({}/{}, {:.1}%)",
                valid_count, total, valid_percentage
            ),
            valid_count,
        );
    }

    let mut warnings = Vec::new();
    if valid_percentage < 80.0 {
        warnings.push(format!("some records are invalid ({}/{})", valid_count, total));
    }
    if with_coordinates == 0 && with_address > 0 {
        warnings.push("no coordinates present, geocoding required".to_string());
    }
    if (with_coordinates as f64) < total as f64 * 0.5 {
        warnings.push("many records lack coordinates".to_string());
    }
    for warning in &warnings {
        log::warn!("upload validation: {}", warning);
    }

    ValidationResult {
        is_valid: true,
        error: None,
        valid_count,
        warnings,
    }
}

pub fn validate_file_size(size_bytes: u64, max_size_mb: u64) -> Result<()> {
    if size_bytes > max_size_mb * 1024 * 1024 {
        return Err(
            MapError::Validation(format!("file must be at most {}MB", max_size_mb)).into(),
        );
    }
    Ok(())
}

pub fn validate_file_format(file_name: &str) -> Result<()> {
    if !file_name.ends_with(".csv") {
        return Err(MapError::Validation("only CSV files can be uploaded".to_string()).into());
    }
    Ok(())
}

/// File name without the `.csv` extension; also the default dataset name
pub fn file_stem(file_name: &str) -> &str {
    file_name.strip_suffix(".csv").unwrap_or(file_name)
}

pub fn validate_file_name(file_name: &str) -> Result<()> {
    let stem = file_stem(file_name).trim();
    if stem.is_empty() {
        return Err(MapError::Validation("file name is empty".to_string()).into());
    }
    if stem.contains(INVALID_NAME_CHARS) {
        return Err(
            MapError::Validation("file name contains special characters".to_string()).into(),
        );
    }
    Ok(())
}

pub fn validate_duplicate_file(file_name: &str, datasets: &[Dataset]) -> Result<()> {
    let stem = file_stem(file_name);
    if datasets.iter().any(|d| d.name == stem) {
        return Err(MapError::Validation(format!(
            "a file named '{}' is already uploaded",
            stem
        ))
        .into());
    }
    Ok(())
}

pub fn validate_upload_limit(current: usize, max: usize) -> Result<()> {
    if current >= max {
        return Err(
            MapError::Validation(format!("at most {} files can be uploaded", max)).into(),
        );
    }
    Ok(())
}

/// Quick look at the raw CSV: it needs a header naming a location column
/// and at least one data line.
pub fn validate_csv_content(bytes: &[u8]) -> Result<()> {
    let text = String::from_utf8_lossy(bytes);
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let header = match lines.next() {
        Some(header) => header.to_lowercase(),
        None => return Err(MapError::Validation("file is empty".to_string()).into()),
    };
    if lines.next().is_none() {
        return Err(MapError::Validation("file has a header but no data".to_string()).into());
    }

    const LOCATION_COLUMNS: [&str; 7] = ["주소", "address", "lat", "lng", "lon", "위도", "경도"];
    if !LOCATION_COLUMNS.iter().any(|column| header.contains(column)) {
        return Err(MapError::Validation(
            "a location column (address, latitude, longitude) is required".to_string(),
        )
        .into());
    }
    Ok(())
}
