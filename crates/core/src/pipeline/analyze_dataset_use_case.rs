use std::fmt;

use serde::Serialize;

use crate::dataset::domain::dataset::{Dataset, GroupBy};
use crate::diacritics::domain::confusion_tally::{ConfusionEntry, ConfusionMatrix, LetterErrorRate};
use crate::diacritics::domain::confusion_tracker::{ComparisonMode, DiacriticConfusionTracker};
use crate::metrics::domain::metric_kind::MetricKind;
use crate::metrics::domain::micro_average::CorpusRates;
use crate::metrics::domain::word_error_counter::{MissedWord, WordErrorCounter};
use crate::shared::constants::DEFAULT_TOP_CONFUSIONS;
use crate::shared::language_profile::DiacriticAlphabet;
use crate::statistics::domain::statistical_comparator::{
    ComparisonResult, GroupComparison, GroupDistribution, GroupSummary, StatisticalComparator,
};

/// Diacritic recognition of one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDiacritics {
    pub model: Option<String>,
    pub letters: Vec<LetterErrorRate>,
    pub top_confusions: Vec<ConfusionEntry>,
    pub matrix: ConfusionMatrix,
}

/// Everything the analysis step derives from a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub overall: CorpusRates,
    /// Per-utterance statistics over the whole dataset.
    pub overall_summary: GroupSummary,
    pub groups: Vec<GroupSummary>,
    /// Per-utterance values of each (model, category) group.
    pub distributions: Vec<GroupDistribution>,
    /// WER between speaker categories, per model (Mann–Whitney U).
    pub category_tests: Vec<GroupComparison>,
    /// WER between models, per category (Wilcoxon signed-rank).
    pub model_tests: Vec<GroupComparison>,
    pub diacritic_mode: ComparisonMode,
    pub diacritics: Vec<ModelDiacritics>,
    pub most_missed_words: Vec<MissedWord>,
}

const BY_GROUP: GroupBy = GroupBy::ModelAndCategory;

pub struct AnalyzeDatasetUseCase {
    tracker: DiacriticConfusionTracker,
    top: usize,
}

impl AnalyzeDatasetUseCase {
    pub fn new(alphabet: DiacriticAlphabet, mode: ComparisonMode, top: usize) -> Self {
        Self {
            tracker: DiacriticConfusionTracker::new(alphabet, mode),
            top,
        }
    }

    pub fn run(&self, dataset: &Dataset) -> AnalysisReport {
        log::info!("Analyzing {} record(s)", dataset.len());

        let categories = dataset.categories();
        let models = dataset.models();

        let mut category_tests = Vec::new();
        for model in &models {
            for (i, first) in categories.iter().enumerate() {
                for second in &categories[i + 1..] {
                    category_tests.push(StatisticalComparator::compare_categories(
                        dataset,
                        model.as_deref(),
                        first,
                        second,
                        MetricKind::Wer,
                    ));
                }
            }
        }

        let labelled: Vec<&str> = models.iter().filter_map(|m| m.as_deref()).collect();
        let mut model_tests = Vec::new();
        for category in &categories {
            for (i, first) in labelled.iter().enumerate() {
                for second in &labelled[i + 1..] {
                    model_tests.push(StatisticalComparator::compare_models(
                        dataset,
                        Some(category),
                        first,
                        second,
                        MetricKind::Wer,
                    ));
                }
            }
        }

        let diacritics = self
            .tracker
            .tally_by_model(dataset)
            .into_iter()
            .map(|(model, tally)| ModelDiacritics {
                model,
                letters: tally.letter_rates(),
                top_confusions: tally.most_common_confusions(self.top),
                matrix: tally.confusion_matrix(),
            })
            .collect();

        AnalysisReport {
            overall: dataset.micro_average().rates(),
            overall_summary: StatisticalComparator::summarize_all(dataset),
            groups: StatisticalComparator::summarize(dataset, BY_GROUP),
            distributions: StatisticalComparator::distributions(dataset, BY_GROUP),
            category_tests,
            model_tests,
            diacritic_mode: self.tracker.mode(),
            diacritics,
            most_missed_words: WordErrorCounter::from_records(dataset).most_common(self.top),
        }
    }
}

impl Default for AnalyzeDatasetUseCase {
    fn default() -> Self {
        Self::new(
            DiacriticAlphabet::default(),
            ComparisonMode::default(),
            DEFAULT_TOP_CONFUSIONS,
        )
    }
}

fn rate(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}%", v * 100.0))
}

fn number(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"))
}

fn write_summary(f: &mut fmt::Formatter<'_>, group: &GroupSummary) -> fmt::Result {
    for metric in MetricKind::ALL {
        let summary = group.metric(*metric);
        writeln!(
            f,
            "    {metric}: mean {}  median {}  std {}  min {}  max {}  IQR {}",
            number(summary.mean),
            number(summary.median),
            number(summary.std_dev),
            number(summary.min),
            number(summary.max),
            number(summary.iqr())
        )?;
    }
    Ok(())
}

fn write_tests(f: &mut fmt::Formatter<'_>, tests: &[GroupComparison]) -> fmt::Result {
    for test in tests {
        write!(f, "  {} {} vs {}: ", test.metric, test.first, test.second)?;
        match &test.result {
            ComparisonResult::Available(outcome) => writeln!(f, "{outcome}")?,
            ComparisonResult::Unavailable { reason } => writeln!(f, "unavailable ({reason})")?,
        }
    }
    Ok(())
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Overall ({} utterances, {} reference words): WER {}  CER {}  DER {}",
            self.overall.utterances,
            self.overall.reference_words,
            rate(self.overall.wer),
            rate(self.overall.cer),
            rate(self.overall.der)
        )?;
        write_summary(f, &self.overall_summary)?;

        writeln!(f, "\nGroups:")?;
        for group in &self.groups {
            writeln!(
                f,
                "  {:<16} n={:<5} micro WER {:>8}  CER {:>8}  DER {:>8}",
                group.key.to_string(),
                group.utterances,
                rate(group.micro.wer),
                rate(group.micro.cer),
                rate(group.micro.der)
            )?;
            let words = &group.micro.word;
            writeln!(
                f,
                "    words: N={}  S={}  D={}  I={}",
                words.reference_len(),
                words.substitutions,
                words.deletions,
                words.insertions
            )?;
            write_summary(f, group)?;
        }

        if !self.category_tests.is_empty() {
            writeln!(f, "\nBetween categories:")?;
            write_tests(f, &self.category_tests)?;
        }
        if !self.model_tests.is_empty() {
            writeln!(f, "\nBetween models:")?;
            write_tests(f, &self.model_tests)?;
        }

        for model in &self.diacritics {
            writeln!(
                f,
                "\nDiacritics for {} ({:?} comparison):",
                model.model.as_deref().unwrap_or("all"),
                self.diacritic_mode
            )?;
            for letter in model.letters.iter().filter(|l| l.total > 0) {
                writeln!(
                    f,
                    "  {}: {}/{} errors ({:.2}%)",
                    letter.letter,
                    letter.errors,
                    letter.total,
                    letter.rate * 100.0
                )?;
            }
            for entry in &model.top_confusions {
                writeln!(f, "  {} -> {}: {}", entry.reference, entry.observed, entry.count)?;
            }
        }

        if !self.most_missed_words.is_empty() {
            writeln!(f, "\nMost missed words:")?;
            for word in &self.most_missed_words {
                writeln!(f, "  {}: {}", word.word, word.count)?;
            }
        }
        Ok(())
    }
}
