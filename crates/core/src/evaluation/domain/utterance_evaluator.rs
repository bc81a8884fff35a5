use std::fmt;

use super::transcriber::Transcriber;
use super::utterance_source::UtteranceSource;
use crate::dataset::domain::speaker_category::SpeakerCategory;
use crate::dataset::domain::utterance_record::UtteranceRecord;
use crate::normalization::domain::text_normalizer::TextNormalizer;

/// An utterance left out of the dataset because no hypothesis was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedUtterance {
    pub file_id: String,
    pub category: SpeakerCategory,
    pub reason: String,
}

impl fmt::Display for SkippedUtterance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}: {}", self.category, self.file_id, self.reason)
    }
}

pub type UtteranceOutcome = Result<UtteranceRecord, SkippedUtterance>;

/// Transcribes, normalizes and scores a single utterance for one model.
#[derive(Debug, Clone)]
pub struct UtteranceEvaluator {
    normalizer: TextNormalizer,
    model: Option<String>,
}

impl UtteranceEvaluator {
    pub fn new(normalizer: TextNormalizer, model: Option<String>) -> Self {
        Self { normalizer, model }
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn evaluate(
        &self,
        source: &UtteranceSource,
        transcriber: &dyn Transcriber,
    ) -> UtteranceOutcome {
        let hypothesis = transcriber
            .transcribe(source)
            .map_err(|e| SkippedUtterance {
                file_id: source.file_id.clone(),
                category: source.category.clone(),
                reason: e.to_string(),
            })?;

        Ok(UtteranceRecord::evaluate(
            source.file_id.clone(),
            source.category.clone(),
            self.model.clone(),
            self.normalizer.normalize(&source.reference),
            hypothesis,
            &self.normalizer,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::domain::transcriber::TranscriptionError;

    struct EchoTranscriber;

    impl Transcriber for EchoTranscriber {
        fn transcribe(&self, source: &UtteranceSource) -> Result<String, TranscriptionError> {
            if source.file_id == "broken" {
                return Err(TranscriptionError::Missing(source.file_id.clone()));
            }
            Ok(source.reference.to_uppercase())
        }
    }

    #[test]
    fn test_evaluate_scores_normalized_texts() {
        let evaluator = UtteranceEvaluator::new(TextNormalizer::default(), Some("m1".into()));
        let source = UtteranceSource::new("a", SpeakerCategory::Male, "Ku}a, ku}a!");
        let record = evaluator.evaluate(&source, &EchoTranscriber).unwrap();

        assert_eq!(record.reference().as_str(), "kuđa kuđa");
        assert_eq!(record.hypothesis(), "KU}A, KU}A!");
        assert_eq!(record.wer(), Some(0.0));
        assert_eq!(record.model(), Some("m1"));
    }

    #[test]
    fn test_failed_transcription_is_skipped() {
        let evaluator = UtteranceEvaluator::new(TextNormalizer::default(), None);
        let source = UtteranceSource::new("broken", SpeakerCategory::Female, "x");
        let skipped = evaluator.evaluate(&source, &EchoTranscriber).unwrap_err();

        assert_eq!(skipped.file_id, "broken");
        assert!(skipped.reason.contains("no hypothesis"));
        assert_eq!(
            skipped.to_string(),
            "f/broken: no hypothesis available for 'broken'"
        );
    }
}
