use std::fs;
use std::path::PathBuf;

use crate::evaluation::domain::transcriber::{TranscriptionError, Transcriber};
use crate::evaluation::domain::utterance_source::UtteranceSource;
use crate::shared::constants::REFERENCE_EXTENSION;

/// Reads hypotheses an ASR engine has already written to disk.
///
/// `<dir>/<category>/<file_id>.txt` is preferred over `<dir>/<file_id>.txt`
/// so one directory can hold several categories with overlapping ids.
#[derive(Debug, Clone)]
pub struct HypothesisDirectoryTranscriber {
    directory: PathBuf,
}

impl HypothesisDirectoryTranscriber {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn candidates(&self, source: &UtteranceSource) -> [PathBuf; 2] {
        let file_name = format!("{}.{REFERENCE_EXTENSION}", source.file_id);
        [
            self.directory.join(source.category.code()).join(&file_name),
            self.directory.join(&file_name),
        ]
    }
}

impl Transcriber for HypothesisDirectoryTranscriber {
    fn transcribe(&self, source: &UtteranceSource) -> Result<String, TranscriptionError> {
        let path = self
            .candidates(source)
            .into_iter()
            .find(|p| p.is_file())
            .ok_or_else(|| TranscriptionError::Missing(source.file_id.clone()))?;

        fs::read_to_string(&path).map_err(|source| TranscriptionError::Read { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::domain::speaker_category::SpeakerCategory;
    use tempfile::TempDir;

    #[test]
    fn test_reads_flat_layout() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "dobar dan").unwrap();

        let transcriber = HypothesisDirectoryTranscriber::new(dir.path());
        let source = UtteranceSource::new("a", SpeakerCategory::Male, "");
        assert_eq!(transcriber.transcribe(&source).unwrap(), "dobar dan");
    }

    #[test]
    fn test_category_subdirectory_takes_precedence() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("f")).unwrap();
        fs::write(dir.path().join("a.txt"), "flat").unwrap();
        fs::write(dir.path().join("f").join("a.txt"), "nested").unwrap();

        let transcriber = HypothesisDirectoryTranscriber::new(dir.path());
        let female = UtteranceSource::new("a", SpeakerCategory::Female, "");
        let male = UtteranceSource::new("a", SpeakerCategory::Male, "");
        assert_eq!(transcriber.transcribe(&female).unwrap(), "nested");
        assert_eq!(transcriber.transcribe(&male).unwrap(), "flat");
    }

    #[test]
    fn test_empty_hypothesis_is_valid() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();

        let transcriber = HypothesisDirectoryTranscriber::new(dir.path());
        let source = UtteranceSource::new("a", SpeakerCategory::Male, "");
        assert_eq!(transcriber.transcribe(&source).unwrap(), "");
    }

    #[test]
    fn test_missing_hypothesis_is_an_error() {
        let dir = TempDir::new().unwrap();
        let transcriber = HypothesisDirectoryTranscriber::new(dir.path());
        let source = UtteranceSource::new("zz", SpeakerCategory::Male, "");
        assert!(matches!(
            transcriber.transcribe(&source),
            Err(TranscriptionError::Missing(id)) if id == "zz"
        ));
    }
}
