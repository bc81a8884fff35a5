use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::dataset::domain::dataset::Dataset;
use crate::normalization::domain::text_normalizer::TextNormalizer;
use crate::persistence::domain::persisted_record::PersistedRecord;
use crate::persistence::domain::record_store::{RecordStore, RecordStoreError};

/// Stores one JSON object per line, one line per utterance.
#[derive(Debug, Clone)]
pub struct JsonLinesRecordStore {
    path: PathBuf,
    normalizer: TextNormalizer,
}

impl JsonLinesRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_normalizer(path, TextNormalizer::default())
    }

    pub fn with_normalizer(path: impl Into<PathBuf>, normalizer: TextNormalizer) -> Self {
        Self {
            path: path.into(),
            normalizer,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> RecordStoreError {
        RecordStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl RecordStore for JsonLinesRecordStore {
    fn save(&self, dataset: &Dataset) -> Result<(), RecordStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let file = File::create(&self.path).map_err(|e| self.io_error(e))?;
        let mut writer = BufWriter::new(file);
        for record in dataset {
            serde_json::to_writer(&mut writer, &PersistedRecord::from_record(record))
                .map_err(|e| self.io_error(e.into()))?;
            writer.write_all(b"\n").map_err(|e| self.io_error(e))?;
        }
        writer.flush().map_err(|e| self.io_error(e))?;

        log::info!("Wrote {} record(s) to {}", dataset.len(), self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<Dataset, RecordStoreError> {
        let file = File::open(&self.path).map_err(|e| self.io_error(e))?;
        let mut seen = HashSet::new();
        let mut records = Vec::new();

        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line_no = index + 1;
            let line = line.map_err(|e| self.io_error(e))?;
            if line.trim().is_empty() {
                continue;
            }

            let persisted: PersistedRecord =
                serde_json::from_str(&line).map_err(|source| RecordStoreError::Parse {
                    path: self.path.clone(),
                    line: line_no,
                    source,
                })?;
            let schema_error = |violation| {
                log::error!("{}:{line_no}: {violation}", self.path.display());
                RecordStoreError::Schema {
                    path: self.path.clone(),
                    line: line_no,
                    violation,
                }
            };
            let record = persisted.into_record(&self.normalizer).map_err(schema_error)?;

            let key = (
                record.model().map(str::to_string),
                record.category().clone(),
                record.file_id().to_string(),
            );
            if !seen.insert(key) {
                return Err(RecordStoreError::Duplicate {
                    path: self.path.clone(),
                    line: line_no,
                    key: format!(
                        "{}/{}/{}",
                        record.model().unwrap_or("-"),
                        record.category(),
                        record.file_id()
                    ),
                });
            }
            records.push(record);
        }

        log::info!("Loaded {} record(s) from {}", records.len(), self.path.display());
        Ok(Dataset::new(records))
    }
}
