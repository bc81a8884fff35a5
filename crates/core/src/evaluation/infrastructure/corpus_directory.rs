use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::dataset::domain::speaker_category::SpeakerCategory;
use crate::evaluation::domain::utterance_source::UtteranceSource;
use crate::shared::constants::{AUDIO_EXTENSION, REFERENCE_EXTENSION};

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("corpus directory not found: {0}")]
    MissingDirectory(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("file id '{file_id}' appears twice in category '{category}'")]
    DuplicateFileId {
        file_id: String,
        category: SpeakerCategory,
    },
}

/// A directory of `<file_id>.txt` reference transcripts for one speaker
/// category, with an optional directory of matching `<file_id>.wav` files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusDirectory {
    pub category: SpeakerCategory,
    pub transcripts: PathBuf,
    pub audio: Option<PathBuf>,
}

impl CorpusDirectory {
    pub fn new(category: SpeakerCategory, transcripts: impl Into<PathBuf>) -> Self {
        Self {
            category,
            transcripts: transcripts.into(),
            audio: None,
        }
    }

    pub fn with_audio(mut self, audio: impl Into<PathBuf>) -> Self {
        self.audio = Some(audio.into());
        self
    }

    /// Lists the references in this directory, sorted by file id.
    pub fn load(&self) -> Result<Vec<UtteranceSource>, CorpusError> {
        if !self.transcripts.is_dir() {
            return Err(CorpusError::MissingDirectory(self.transcripts.clone()));
        }

        let entries = fs::read_dir(&self.transcripts).map_err(|e| io_error(&self.transcripts, e))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| io_error(&self.transcripts, e))?.path();
            let is_reference = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(REFERENCE_EXTENSION));
            if path.is_file() && is_reference {
                paths.push(path);
            }
        }
        paths.sort();

        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(file_id) = path.file_stem().and_then(|s| s.to_str()) else {
                log::warn!("Skipping non UTF-8 file name {}", path.display());
                continue;
            };
            let reference = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
            let mut source = UtteranceSource::new(file_id, self.category.clone(), reference);

            if let Some(audio_dir) = &self.audio {
                let audio_path = audio_dir.join(format!("{file_id}.{AUDIO_EXTENSION}"));
                if audio_path.is_file() {
                    source = source.with_audio(audio_path);
                } else {
                    log::debug!("No audio for {file_id} in {}", audio_dir.display());
                }
            }
            sources.push(source);
        }

        log::info!(
            "Loaded {} reference(s) for category '{}' from {}",
            sources.len(),
            self.category,
            self.transcripts.display()
        );
        Ok(sources)
    }
}

/// Loads every directory in turn; a file id may occur once per category.
pub fn load_corpus(directories: &[CorpusDirectory]) -> Result<Vec<UtteranceSource>, CorpusError> {
    let mut seen = HashSet::new();
    let mut sources = Vec::new();
    for directory in directories {
        for source in directory.load()? {
            if !seen.insert((source.category.clone(), source.file_id.clone())) {
                return Err(CorpusError::DuplicateFileId {
                    file_id: source.file_id,
                    category: source.category,
                });
            }
            sources.push(source);
        }
    }
    Ok(sources)
}

fn io_error(path: &Path, source: std::io::Error) -> CorpusError {
    CorpusError::Io {
        path: path.to_path_buf(),
        source,
    }
}
