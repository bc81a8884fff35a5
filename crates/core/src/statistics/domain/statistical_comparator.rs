use std::collections::HashMap;

use serde::Serialize;

use super::descriptive::MetricSummary;
use super::rank_sum_test::RankSumTest;
use super::signed_rank_test::SignedRankTest;
use super::significance::{StatisticsError, TestOutcome};
use crate::dataset::domain::dataset::{Dataset, GroupBy, GroupKey};
use crate::dataset::domain::speaker_category::SpeakerCategory;
use crate::dataset::domain::utterance_record::UtteranceRecord;
use crate::metrics::domain::metric_kind::MetricKind;
use crate::metrics::domain::micro_average::{CorpusRates, MicroAverage};

/// Descriptive statistics of one group of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub key: GroupKey,
    pub utterances: usize,
    pub wer: MetricSummary,
    pub cer: MetricSummary,
    pub der: MetricSummary,
    pub micro: CorpusRates,
}

impl GroupSummary {
    pub fn of(key: GroupKey, records: &[&UtteranceRecord]) -> Self {
        let summary = |metric| MetricSummary::of(&Dataset::values(records.iter().copied(), metric));
        Self {
            utterances: records.len(),
            wer: summary(MetricKind::Wer),
            cer: summary(MetricKind::Cer),
            der: summary(MetricKind::Der),
            micro: MicroAverage::from_metrics(records.iter().map(|r| r.metrics())).rates(),
            key,
        }
    }

    pub fn metric(&self, metric: MetricKind) -> &MetricSummary {
        match metric {
            MetricKind::Wer => &self.wer,
            MetricKind::Cer => &self.cer,
            MetricKind::Der => &self.der,
        }
    }
}

/// Per-utterance values of one group, in record order, for distribution plots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupDistribution {
    pub key: GroupKey,
    pub wer: Vec<f64>,
    pub cer: Vec<f64>,
    pub der: Vec<f64>,
}

impl GroupDistribution {
    pub fn of(key: GroupKey, records: &[&UtteranceRecord]) -> Self {
        let values = |metric| Dataset::values(records.iter().copied(), metric);
        Self {
            wer: values(MetricKind::Wer),
            cer: values(MetricKind::Cer),
            der: values(MetricKind::Der),
            key,
        }
    }
}

/// A test outcome, or why the test could not be run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComparisonResult {
    Available(TestOutcome),
    Unavailable { reason: String },
}

impl ComparisonResult {
    fn from_test(result: Result<TestOutcome, StatisticsError>) -> Self {
        match result {
            Ok(outcome) => ComparisonResult::Available(outcome),
            Err(e) => {
                log::info!("Test unavailable: {e}");
                ComparisonResult::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn outcome(&self) -> Option<&TestOutcome> {
        match self {
            ComparisonResult::Available(outcome) => Some(outcome),
            ComparisonResult::Unavailable { .. } => None,
        }
    }
}

/// Two groups of one dataset compared on one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupComparison {
    pub metric: MetricKind,
    pub first: GroupKey,
    pub second: GroupKey,
    pub result: ComparisonResult,
}

/// Group summaries and two-sided significance tests over a dataset.
pub struct StatisticalComparator;

impl StatisticalComparator {
    pub fn summarize(dataset: &Dataset, by: GroupBy) -> Vec<GroupSummary> {
        dataset
            .group_by(by)
            .into_iter()
            .map(|(key, records)| GroupSummary::of(key, &records))
            .collect()
    }

    /// One summary over every record, keyed as `all`.
    pub fn summarize_all(dataset: &Dataset) -> GroupSummary {
        let records: Vec<&UtteranceRecord> = dataset.iter().collect();
        let key = GroupKey {
            model: None,
            category: None,
        };
        GroupSummary::of(key, &records)
    }

    pub fn distributions(dataset: &Dataset, by: GroupBy) -> Vec<GroupDistribution> {
        dataset
            .group_by(by)
            .into_iter()
            .map(|(key, records)| GroupDistribution::of(key, &records))
            .collect()
    }

    /// Mann–Whitney U on raw samples; an empty sample makes it unavailable.
    pub fn independent(first: &[f64], second: &[f64]) -> ComparisonResult {
        ComparisonResult::from_test(RankSumTest::run(first, second))
    }

    /// Wilcoxon signed-rank on index-aligned samples.
    pub fn paired(first: &[f64], second: &[f64]) -> ComparisonResult {
        ComparisonResult::from_test(SignedRankTest::run(first, second))
    }

    /// Two speaker categories of the same model, as independent samples.
    pub fn compare_categories(
        dataset: &Dataset,
        model: Option<&str>,
        first: &SpeakerCategory,
        second: &SpeakerCategory,
        metric: MetricKind,
    ) -> GroupComparison {
        let a = Dataset::values(dataset.select(model, Some(first)), metric);
        let b = Dataset::values(dataset.select(model, Some(second)), metric);
        let key = |category: &SpeakerCategory| GroupKey {
            model: model.map(str::to_string),
            category: Some(category.clone()),
        };
        GroupComparison {
            metric,
            first: key(first),
            second: key(second),
            result: Self::independent(&a, &b),
        }
    }

    /// Two models on the same utterances, as paired samples.
    ///
    /// Records are joined on (file id, category); only pairs where both
    /// metric values are defined enter the test.
    pub fn compare_models(
        dataset: &Dataset,
        category: Option<&SpeakerCategory>,
        first: &str,
        second: &str,
        metric: MetricKind,
    ) -> GroupComparison {
        let (a, b) = Self::paired_values(
            dataset.select(Some(first), category),
            dataset.select(Some(second), category),
            metric,
        );
        let key = |model: &str| GroupKey {
            model: Some(model.to_string()),
            category: category.cloned(),
        };
        GroupComparison {
            metric,
            first: key(first),
            second: key(second),
            result: Self::paired(&a, &b),
        }
    }

    /// Joins two record streams on (file id, category), in the order of
    /// `first`, keeping pairs with both values defined.
    pub fn paired_values<'a, I, J>(
        first: I,
        second: J,
        metric: MetricKind,
    ) -> (Vec<f64>, Vec<f64>)
    where
        I: IntoIterator<Item = &'a UtteranceRecord>,
        J: IntoIterator<Item = &'a UtteranceRecord>,
    {
        let lookup: HashMap<(&str, &SpeakerCategory), &UtteranceRecord> = second
            .into_iter()
            .map(|r| ((r.file_id(), r.category()), r))
            .collect();

        first
            .into_iter()
            .filter_map(|a| {
                let b = lookup.get(&(a.file_id(), a.category()))?;
                Some((metric.value(a.metrics())?, metric.value(b.metrics())?))
            })
            .unzip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalization::domain::text_normalizer::TextNormalizer;
    use crate::statistics::domain::significance::TestKind;
    use approx::assert_relative_eq;

    fn record(
        id: &str,
        category: SpeakerCategory,
        model: &str,
        hypothesis: &str,
    ) -> UtteranceRecord {
        let normalizer = TextNormalizer::default();
        UtteranceRecord::evaluate(
            id,
            category,
            Some(model.to_string()),
            normalizer.normalize("jedan dva tri četiri"),
            hypothesis,
            &normalizer,
        )
    }

    fn dataset() -> Dataset {
        let mut records = Vec::new();
        for i in 0..5 {
            let id = format!("u{i}");
            records.push(record(&id, SpeakerCategory::Male, "small", "jedan dva tri četiri"));
            records.push(record(&id, SpeakerCategory::Female, "small", "x y z w"));
            records.push(record(&id, SpeakerCategory::Male, "large", "jedan dva tri četiri"));
            records.push(record(&id, SpeakerCategory::Female, "large", "jedan dva tri"));
        }
        Dataset::new(records)
    }

    #[test]
    fn test_summarize_by_model_and_category() {
        let summaries = StatisticalComparator::summarize(&dataset(), GroupBy::ModelAndCategory);
        assert_eq!(summaries.len(), 4);

        let small_female = summaries
            .iter()
            .find(|s| s.key.to_string() == "small/f")
            .unwrap();
        assert_eq!(small_female.utterances, 5);
        assert_relative_eq!(small_female.wer.mean.unwrap(), 1.0);
        assert_relative_eq!(small_female.wer.std_dev.unwrap(), 0.0);
        assert_relative_eq!(small_female.micro.wer.unwrap(), 1.0);
    }

    #[test]
    fn test_summarize_all_spans_every_record() {
        let all = StatisticalComparator::summarize_all(&dataset());
        assert_eq!(all.key.to_string(), "all");
        assert_eq!(all.utterances, 20);
        // 0 (x10), 1 (x5) and 0.25 (x5)
        assert_relative_eq!(all.wer.mean.unwrap(), 6.25 / 20.0);
        assert_eq!(all.wer.min, Some(0.0));
        assert_eq!(all.wer.max, Some(1.0));
        assert_relative_eq!(all.der.mean.unwrap(), 1.25 / 20.0);
        assert_eq!(all.micro.word.deletions, 5);
    }

    #[test]
    fn test_distributions_keep_every_value() {
        let distributions =
            StatisticalComparator::distributions(&dataset(), GroupBy::ModelAndCategory);
        assert_eq!(distributions.len(), 4);
        let large_female = distributions
            .iter()
            .find(|d| d.key.to_string() == "large/f")
            .unwrap();
        assert_eq!(large_female.wer, vec![0.25; 5]);
        assert_eq!(large_female.der, vec![0.25; 5]);
    }

    #[test]
    fn test_separated_categories_differ_significantly() {
        let comparison = StatisticalComparator::compare_categories(
            &dataset(),
            Some("small"),
            &SpeakerCategory::Male,
            &SpeakerCategory::Female,
            MetricKind::Wer,
        );
        let outcome = comparison.result.outcome().unwrap();
        assert_eq!(outcome.test, TestKind::MannWhitneyU);
        assert!(outcome.significant);
        assert_eq!(comparison.first.to_string(), "small/m");
    }

    #[test]
    fn test_missing_category_is_unavailable() {
        let comparison = StatisticalComparator::compare_categories(
            &dataset(),
            Some("small"),
            &SpeakerCategory::Male,
            &SpeakerCategory::Other("child".to_string()),
            MetricKind::Wer,
        );
        assert!(matches!(
            comparison.result,
            ComparisonResult::Unavailable { .. }
        ));
    }

    #[test]
    fn test_identical_models_give_p_one() {
        let comparison = StatisticalComparator::compare_models(
            &dataset(),
            Some(&SpeakerCategory::Male),
            "small",
            "large",
            MetricKind::Wer,
        );
        let outcome = comparison.result.outcome().unwrap();
        assert_eq!(outcome.test, TestKind::WilcoxonSignedRank);
        assert_eq!(outcome.p_value, 1.0);
        assert_eq!(outcome.first_size, 5);
    }

    #[test]
    fn test_paired_values_join_on_file_id() {
        let first = vec![
            record("a", SpeakerCategory::Male, "small", "jedan"),
            record("b", SpeakerCategory::Male, "small", "jedan dva"),
        ];
        let second = vec![
            record("b", SpeakerCategory::Male, "large", "jedan dva tri četiri"),
            record("c", SpeakerCategory::Male, "large", "jedan"),
        ];
        let (a, b) = StatisticalComparator::paired_values(&first, &second, MetricKind::Wer);
        assert_eq!(a, vec![0.5]);
        assert_eq!(b, vec![0.0]);
    }

    #[test]
    fn test_paired_length_mismatch_is_unavailable() {
        let result = StatisticalComparator::paired(&[0.1, 0.2], &[0.1]);
        assert!(matches!(result, ComparisonResult::Unavailable { .. }));
    }
}
