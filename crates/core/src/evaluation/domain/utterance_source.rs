use std::path::PathBuf;

use crate::dataset::domain::speaker_category::SpeakerCategory;

/// One corpus item awaiting transcription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtteranceSource {
    pub file_id: String,
    pub category: SpeakerCategory,
    /// Reference transcript as stored on disk, not yet normalized.
    pub reference: String,
    pub audio_path: Option<PathBuf>,
}

impl UtteranceSource {
    pub fn new(
        file_id: impl Into<String>,
        category: SpeakerCategory,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            file_id: file_id.into(),
            category,
            reference: reference.into(),
            audio_path: None,
        }
    }

    pub fn with_audio(mut self, path: PathBuf) -> Self {
        self.audio_path = Some(path);
        self
    }
}
