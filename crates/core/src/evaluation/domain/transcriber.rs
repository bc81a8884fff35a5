use std::path::PathBuf;

use thiserror::Error;

use super::utterance_source::UtteranceSource;

#[derive(Error, Debug)]
pub enum TranscriptionError {
    #[error("no hypothesis available for '{0}'")]
    Missing(String),
    #[error("failed to read hypothesis {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("ASR engine failed on '{file_id}': {message}")]
    Engine { file_id: String, message: String },
}

/// Domain interface for the ASR engine under evaluation.
///
/// Implementations return the raw hypothesis text for one utterance. A
/// failure excludes that utterance from the run.
pub trait Transcriber: Send + Sync {
    fn transcribe(&self, source: &UtteranceSource) -> Result<String, TranscriptionError>;
}
