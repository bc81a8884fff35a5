use serde::Serialize;

use super::edit_counts::EditCounts;
use super::metric_calculator::UtteranceMetrics;

/// Corpus-level error rates, micro-averaged.
///
/// S, D, I and N are summed over every utterance first and divided once, so
/// long utterances weigh more than short ones. This is deliberately not the
/// mean of per-utterance rates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MicroAverage {
    pub utterances: usize,
    pub word: EditCounts,
    pub character: EditCounts,
}

impl MicroAverage {
    pub fn from_metrics<'a, I>(metrics: I) -> Self
    where
        I: IntoIterator<Item = &'a UtteranceMetrics>,
    {
        metrics
            .into_iter()
            .fold(Self::default(), |acc, m| acc.combine(&Self::single(m)))
    }

    pub fn single(metrics: &UtteranceMetrics) -> Self {
        Self {
            utterances: 1,
            word: metrics.word,
            character: metrics.character,
        }
    }

    /// Merges two groups by summing their raw counts.
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            utterances: self.utterances + other.utterances,
            word: self.word + other.word,
            character: self.character + other.character,
        }
    }

    pub fn wer(&self) -> Option<f64> {
        self.word.error_rate()
    }

    pub fn cer(&self) -> Option<f64> {
        self.character.error_rate()
    }

    pub fn der(&self) -> Option<f64> {
        self.word.deletion_rate()
    }

    pub fn rates(&self) -> CorpusRates {
        CorpusRates {
            utterances: self.utterances,
            reference_words: self.word.reference_len(),
            word: self.word,
            wer: self.wer(),
            cer: self.cer(),
            der: self.der(),
        }
    }
}

/// Flattened view of a [`MicroAverage`] for reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorpusRates {
    pub utterances: usize,
    pub reference_words: usize,
    /// Summed word-level S, D, I and hits.
    pub word: EditCounts,
    pub wer: Option<f64>,
    pub cer: Option<f64>,
    pub der: Option<f64>,
}
