use std::collections::{HashMap, HashSet};

use serde::Serialize;
use thiserror::Error;

use super::statistical_comparator::{ComparisonResult, StatisticalComparator};
use crate::dataset::domain::dataset::{Dataset, DuplicateUtterance};
use crate::dataset::domain::speaker_category::SpeakerCategory;
use crate::dataset::domain::utterance_record::UtteranceRecord;
use crate::metrics::domain::metric_kind::MetricKind;
use crate::normalization::domain::normalized_text::NormalizedText;

/// Per-metric change of one utterance, second minus first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtteranceDifference {
    pub file_id: String,
    pub category: SpeakerCategory,
    pub wer: Option<f64>,
    pub cer: Option<f64>,
    pub der: Option<f64>,
}

impl UtteranceDifference {
    fn between(first: &UtteranceRecord, second: &UtteranceRecord) -> Self {
        let diff = |metric: MetricKind| {
            Some(metric.value(second.metrics())? - metric.value(first.metrics())?)
        };
        Self {
            file_id: first.file_id().to_string(),
            category: first.category().clone(),
            wer: diff(MetricKind::Wer),
            cer: diff(MetricKind::Cer),
            der: diff(MetricKind::Der),
        }
    }

    pub fn metric(&self, metric: MetricKind) -> Option<f64> {
        match metric {
            MetricKind::Wer => self.wer,
            MetricKind::Cer => self.cer,
            MetricKind::Der => self.der,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDifferenceTest {
    pub metric: MetricKind,
    /// Mean of the defined differences.
    pub mean_difference: Option<f64>,
    pub result: ComparisonResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComparisonError {
    #[error("run '{label}' holds {count} model labels; select one model to compare")]
    MixedModels { label: String, count: usize },
    #[error("run '{label}': {source}")]
    Duplicate {
        label: String,
        source: DuplicateUtterance,
    },
}

/// Two evaluation runs over the same utterances, e.g. two ASR engines.
///
/// Each run must hold a single model label and each utterance once.
/// Utterances are matched on (file id, category, normalized reference).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelComparison {
    pub first_label: String,
    pub second_label: String,
    pub differences: Vec<UtteranceDifference>,
    pub unmatched_first: usize,
    pub unmatched_second: usize,
    pub tests: Vec<MetricDifferenceTest>,
}

type MatchKey<'a> = (&'a str, &'a SpeakerCategory, &'a NormalizedText);

fn match_key(record: &UtteranceRecord) -> MatchKey<'_> {
    (record.file_id(), record.category(), record.reference())
}

fn check_run(label: &str, run: &Dataset) -> Result<(), ComparisonError> {
    let count = run.models().len();
    if count > 1 {
        return Err(ComparisonError::MixedModels {
            label: label.to_string(),
            count,
        });
    }
    run.ensure_unique().map_err(|source| ComparisonError::Duplicate {
        label: label.to_string(),
        source,
    })
}

impl ModelComparison {
    pub fn between(
        first_label: impl Into<String>,
        first: &Dataset,
        second_label: impl Into<String>,
        second: &Dataset,
    ) -> Result<Self, ComparisonError> {
        let first_label = first_label.into();
        let second_label = second_label.into();
        check_run(&first_label, first)?;
        check_run(&second_label, second)?;

        let lookup: HashMap<MatchKey<'_>, &UtteranceRecord> =
            second.iter().map(|r| (match_key(r), r)).collect();

        let mut pairs = Vec::new();
        let mut matched_second = HashSet::new();
        for record in first {
            let key = match_key(record);
            match lookup.get(&key) {
                Some(other) => {
                    matched_second.insert(key);
                    pairs.push((record, *other));
                }
                None => log::debug!(
                    "No match for {}/{} in '{second_label}'",
                    record.category(),
                    record.file_id()
                ),
            }
        }

        let unmatched_first = first.len() - pairs.len();
        let unmatched_second = second.len() - matched_second.len();
        if unmatched_first > 0 || unmatched_second > 0 {
            log::warn!(
                "Unmatched utterances: {unmatched_first} in '{first_label}', \
                 {unmatched_second} in '{second_label}'"
            );
        }

        let differences: Vec<UtteranceDifference> = pairs
            .iter()
            .map(|(a, b)| UtteranceDifference::between(a, b))
            .collect();

        let tests = MetricKind::ALL
            .iter()
            .map(|&metric| {
                let (a, b) = StatisticalComparator::paired_values(
                    pairs.iter().map(|(a, _)| *a),
                    pairs.iter().map(|(_, b)| *b),
                    metric,
                );
                let defined: Vec<f64> = differences
                    .iter()
                    .filter_map(|d| d.metric(metric))
                    .collect();
                let mean_difference = (!defined.is_empty())
                    .then(|| defined.iter().sum::<f64>() / defined.len() as f64);
                MetricDifferenceTest {
                    metric,
                    mean_difference,
                    result: StatisticalComparator::paired(&a, &b),
                }
            })
            .collect();

        Ok(Self {
            first_label,
            second_label,
            differences,
            unmatched_first,
            unmatched_second,
            tests,
        })
    }

    pub fn matched(&self) -> usize {
        self.differences.len()
    }
}
