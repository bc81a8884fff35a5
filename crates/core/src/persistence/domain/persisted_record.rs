use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::domain::speaker_category::SpeakerCategory;
use crate::dataset::domain::utterance_record::UtteranceRecord;
use crate::normalization::domain::text_normalizer::TextNormalizer;
use crate::shared::constants::METRIC_PRECISION;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaViolation {
    #[error("field '{0}' must not be empty")]
    EmptyField(&'static str),
    #[error("{metric} must be a non-negative number or null, got {value}")]
    InvalidMetric { metric: &'static str, value: f64 },
    #[error("'ref' is not normalized text")]
    ReferenceNotNormalized,
}

/// One persisted row: `category`, `file_id`, optional `model`,
/// `wer`/`cer`/`der` (null when undefined), `ref` and `hyp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersistedRecord {
    pub category: String,
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub wer: Option<f64>,
    pub cer: Option<f64>,
    pub der: Option<f64>,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "hyp")]
    pub hypothesis: String,
}

pub fn round_metric(value: f64) -> f64 {
    let scale = 10f64.powi(METRIC_PRECISION);
    (value * scale).round() / scale
}

impl PersistedRecord {
    pub fn from_record(record: &UtteranceRecord) -> Self {
        Self {
            category: record.category().code().to_string(),
            file_id: record.file_id().to_string(),
            model: record.model().map(str::to_string),
            wer: record.wer().map(round_metric),
            cer: record.cer().map(round_metric),
            der: record.der().map(round_metric),
            reference: record.reference().as_str().to_string(),
            hypothesis: record.hypothesis().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), SchemaViolation> {
        if self.category.trim().is_empty() {
            return Err(SchemaViolation::EmptyField("category"));
        }
        if self.file_id.trim().is_empty() {
            return Err(SchemaViolation::EmptyField("file_id"));
        }
        for (metric, value) in [("wer", self.wer), ("cer", self.cer), ("der", self.der)] {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(SchemaViolation::InvalidMetric { metric, value });
                }
            }
        }
        Ok(())
    }

    /// Rebuilds the in-memory record, recomputing metrics from `ref` and `hyp`.
    ///
    /// Persisted metric values that disagree with the recomputed ones are
    /// reported but do not fail the load.
    pub fn into_record(
        self,
        normalizer: &TextNormalizer,
    ) -> Result<UtteranceRecord, SchemaViolation> {
        self.validate()?;

        let category: SpeakerCategory = self
            .category
            .parse()
            .map_err(|_| SchemaViolation::EmptyField("category"))?;
        let reference = normalizer.normalize(&self.reference);
        if reference.as_str() != self.reference {
            return Err(SchemaViolation::ReferenceNotNormalized);
        }

        let record = UtteranceRecord::evaluate(
            self.file_id,
            category,
            self.model,
            reference,
            self.hypothesis,
            normalizer,
        );

        for (metric, stored, computed) in [
            ("wer", self.wer, record.wer()),
            ("cer", self.cer, record.cer()),
            ("der", self.der, record.der()),
        ] {
            if stored != computed.map(round_metric) {
                log::warn!(
                    "{}/{}: stored {metric} {stored:?} differs from recomputed {computed:?}",
                    record.category(),
                    record.file_id()
                );
            }
        }

        Ok(record)
    }
}
