use super::speaker_category::SpeakerCategory;
use crate::metrics::domain::metric_calculator::{MetricCalculator, UtteranceMetrics};
use crate::normalization::domain::normalized_text::NormalizedText;
use crate::normalization::domain::text_normalizer::TextNormalizer;

/// One evaluated audio item.
///
/// Metrics are computed once at construction; the record is immutable
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct UtteranceRecord {
    file_id: String,
    category: SpeakerCategory,
    model: Option<String>,
    reference: NormalizedText,
    hypothesis: String,
    normalized_hypothesis: NormalizedText,
    metrics: UtteranceMetrics,
}

impl UtteranceRecord {
    pub fn evaluate(
        file_id: impl Into<String>,
        category: SpeakerCategory,
        model: Option<String>,
        reference: NormalizedText,
        hypothesis: impl Into<String>,
        normalizer: &TextNormalizer,
    ) -> Self {
        let hypothesis = hypothesis.into();
        let normalized_hypothesis = normalizer.normalize(&hypothesis);
        let metrics = MetricCalculator::evaluate(&reference, &normalized_hypothesis);

        Self {
            file_id: file_id.into(),
            category,
            model,
            reference,
            hypothesis,
            normalized_hypothesis,
            metrics,
        }
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub fn category(&self) -> &SpeakerCategory {
        &self.category
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn reference(&self) -> &NormalizedText {
        &self.reference
    }

    /// Hypothesis as returned by the ASR engine.
    pub fn hypothesis(&self) -> &str {
        &self.hypothesis
    }

    pub fn normalized_hypothesis(&self) -> &NormalizedText {
        &self.normalized_hypothesis
    }

    pub fn metrics(&self) -> &UtteranceMetrics {
        &self.metrics
    }

    pub fn wer(&self) -> Option<f64> {
        self.metrics.wer()
    }

    pub fn cer(&self) -> Option<f64> {
        self.metrics.cer()
    }

    pub fn der(&self) -> Option<f64> {
        self.metrics.der()
    }
}
