use std::fmt;

use serde::Serialize;

use super::metric_calculator::UtteranceMetrics;

/// Selects one of the per-utterance error rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Wer,
    Cer,
    Der,
}

impl MetricKind {
    pub const ALL: &[MetricKind] = &[MetricKind::Wer, MetricKind::Cer, MetricKind::Der];

    pub fn value(self, metrics: &UtteranceMetrics) -> Option<f64> {
        match self {
            MetricKind::Wer => metrics.wer(),
            MetricKind::Cer => metrics.cer(),
            MetricKind::Der => metrics.der(),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Wer => write!(f, "WER"),
            MetricKind::Cer => write!(f, "CER"),
            MetricKind::Der => write!(f, "DER"),
        }
    }
}
