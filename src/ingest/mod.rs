//! Upload collaborators: the ingestion service contract, upload validation
//! and the geocoding wrapper.

pub mod client;
pub mod geocode;
pub mod validation;

pub use client::{HttpIngestionClient, IngestionService, UploadResponse};
pub use geocode::{geocode_missing, CachedGeocoder, GeocodeCache, Geocoder, RateLimiter};
pub use validation::{validate_upload_result, ValidationResult};

use crate::{core::config::DatasetConfig, dataset::manager::DatasetManager, Result};

/// Dataset created by a successful upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    pub dataset_id: String,
    pub record_count: usize,
    pub warnings: Vec<String>,
}

/// Validates `file_name`/`bytes`, uploads them and adds the returned
/// records as a new dataset named after the file stem.
///
/// The manager is only touched once the upload has resolved and its
/// records passed validation.
pub async fn upload_dataset<S>(
    service: &S,
    manager: &mut DatasetManager,
    file_name: &str,
    bytes: Vec<u8>,
    limits: &DatasetConfig,
) -> Result<UploadOutcome>
where
    S: IngestionService + ?Sized,
{
    validation::validate_upload_limit(manager.len(), limits.max_datasets)?;
    validation::validate_file_format(file_name)?;
    validation::validate_file_name(file_name)?;
    validation::validate_duplicate_file(file_name, manager.datasets())?;
    validation::validate_file_size(bytes.len() as u64, limits.max_file_size_mb)?;
    validation::validate_csv_content(&bytes)?;

    let records = service.upload(file_name, bytes).await?.into_records()?;
    let warnings = validate_upload_result(&records).into_result()?;

    let record_count = records.len();
    let dataset_id = manager.add_dataset(records, validation::file_stem(file_name));
    Ok(UploadOutcome {
        dataset_id,
        record_count,
        warnings,
    })
}
