use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use super::speaker_category::SpeakerCategory;
use super::utterance_record::UtteranceRecord;
use crate::metrics::domain::metric_kind::MetricKind;
use crate::metrics::domain::micro_average::MicroAverage;

/// Which record attributes form a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Category,
    Model,
    ModelAndCategory,
}

/// Identity of a group of records. Unused dimensions are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupKey {
    pub model: Option<String>,
    pub category: Option<SpeakerCategory>,
}

impl GroupKey {
    fn of(record: &UtteranceRecord, by: GroupBy) -> Self {
        let model = || record.model().map(str::to_string);
        let category = || Some(record.category().clone());
        match by {
            GroupBy::Category => Self {
                model: None,
                category: category(),
            },
            GroupBy::Model => Self {
                model: model(),
                category: None,
            },
            GroupBy::ModelAndCategory => Self {
                model: model(),
                category: category(),
            },
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.model, &self.category) {
            (Some(m), Some(c)) => write!(f, "{m}/{c}"),
            (Some(m), None) => write!(f, "{m}"),
            (None, Some(c)) => write!(f, "{c}"),
            (None, None) => write!(f, "all"),
        }
    }
}

/// The same (model, category, file id) occurs twice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "utterance {category}/{file_id} of model {} occurs more than once",
    .model.as_deref().unwrap_or("(unlabelled)")
)]
pub struct DuplicateUtterance {
    pub model: Option<String>,
    pub category: SpeakerCategory,
    pub file_id: String,
}

/// Ordered, read-only collection of evaluated utterances.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<UtteranceRecord>,
}

impl Dataset {
    pub fn new(records: Vec<UtteranceRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[UtteranceRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &UtteranceRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Concatenates two datasets, keeping record order. The result must
    /// still hold each (model, category, file id) once.
    pub fn merge(self, other: Dataset) -> Result<Dataset, DuplicateUtterance> {
        let mut records = self.records;
        records.extend(other.records);
        let merged = Dataset { records };
        merged.ensure_unique()?;
        Ok(merged)
    }

    pub fn ensure_unique(&self) -> Result<(), DuplicateUtterance> {
        let mut seen = HashSet::new();
        for record in &self.records {
            if !seen.insert((record.model(), record.category(), record.file_id())) {
                return Err(DuplicateUtterance {
                    model: record.model().map(str::to_string),
                    category: record.category().clone(),
                    file_id: record.file_id().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Records of one model label only.
    pub fn for_model(&self, model: &str) -> Dataset {
        Dataset::new(self.select(Some(model), None).cloned().collect())
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<SpeakerCategory> {
        self.records
            .iter()
            .map(|r| r.category().clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct model labels in order of first appearance.
    pub fn models(&self) -> Vec<Option<String>> {
        let mut seen = Vec::new();
        for record in &self.records {
            let model = record.model().map(str::to_string);
            if !seen.contains(&model) {
                seen.push(model);
            }
        }
        seen
    }

    pub fn group_by(&self, by: GroupBy) -> BTreeMap<GroupKey, Vec<&UtteranceRecord>> {
        let mut groups: BTreeMap<GroupKey, Vec<&UtteranceRecord>> = BTreeMap::new();
        for record in &self.records {
            groups.entry(GroupKey::of(record, by)).or_default().push(record);
        }
        groups
    }

    /// Records matching an optional model label and category.
    pub fn select<'a>(
        &'a self,
        model: Option<&'a str>,
        category: Option<&'a SpeakerCategory>,
    ) -> impl Iterator<Item = &'a UtteranceRecord> + 'a {
        self.records.iter().filter(move |r| {
            model.map_or(true, |m| r.model() == Some(m))
                && category.map_or(true, |c| r.category() == c)
        })
    }

    /// Defined values of one metric, in record order.
    pub fn values<'a, I>(records: I, metric: MetricKind) -> Vec<f64>
    where
        I: IntoIterator<Item = &'a UtteranceRecord>,
    {
        records
            .into_iter()
            .filter_map(|r| metric.value(r.metrics()))
            .collect()
    }

    pub fn micro_average(&self) -> MicroAverage {
        MicroAverage::from_metrics(self.records.iter().map(UtteranceRecord::metrics))
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a UtteranceRecord;
    type IntoIter = std::slice::Iter<'a, UtteranceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
