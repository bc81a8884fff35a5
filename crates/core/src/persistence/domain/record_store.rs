use std::path::PathBuf;

use thiserror::Error;

use super::persisted_record::SchemaViolation;
use crate::dataset::domain::dataset::Dataset;

#[derive(Error, Debug)]
pub enum RecordStoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}:{line}: malformed record: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path}:{line}: {violation}")]
    Schema {
        path: PathBuf,
        line: usize,
        violation: SchemaViolation,
    },
    #[error("{path}:{line}: duplicate record {key}")]
    Duplicate {
        path: PathBuf,
        line: usize,
        key: String,
    },
}

/// Durable storage for evaluated datasets.
pub trait RecordStore {
    fn save(&self, dataset: &Dataset) -> Result<(), RecordStoreError>;
    fn load(&self) -> Result<Dataset, RecordStoreError>;
}
