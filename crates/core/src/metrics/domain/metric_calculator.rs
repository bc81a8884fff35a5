use serde::Serialize;

use super::edit_counts::EditCounts;
use crate::alignment::domain::sequence_aligner::SequenceAligner;
use crate::normalization::domain::normalized_text::NormalizedText;

/// Word- and character-level edit counts for one utterance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UtteranceMetrics {
    pub word: EditCounts,
    pub character: EditCounts,
}

impl UtteranceMetrics {
    pub fn wer(&self) -> Option<f64> {
        self.word.error_rate()
    }

    pub fn cer(&self) -> Option<f64> {
        self.character.error_rate()
    }

    /// Deletion error rate: share of reference words dropped entirely.
    pub fn der(&self) -> Option<f64> {
        self.word.deletion_rate()
    }
}

/// Derives WER/CER/DER from word and character alignments of normalized text.
pub struct MetricCalculator;

impl MetricCalculator {
    pub fn evaluate(reference: &NormalizedText, hypothesis: &NormalizedText) -> UtteranceMetrics {
        let word = SequenceAligner::align(&reference.words(), &hypothesis.words());
        let character = SequenceAligner::align(&reference.chars(), &hypothesis.chars());

        UtteranceMetrics {
            word: EditCounts::from_chunks(word.chunks()),
            character: EditCounts::from_chunks(character.chunks()),
        }
    }
}
