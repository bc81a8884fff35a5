use std::collections::BTreeMap;

use serde::Serialize;

use super::confusion_tally::{ConfusionOutcome, ConfusionTally};
use crate::alignment::domain::alignment_chunk::EditOperation;
use crate::alignment::domain::sequence_aligner::SequenceAligner;
use crate::dataset::domain::dataset::Dataset;
use crate::dataset::domain::utterance_record::UtteranceRecord;
use crate::normalization::domain::normalized_text::NormalizedText;
use crate::shared::language_profile::DiacriticAlphabet;

/// How a tracked reference letter is paired with a hypothesis character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    /// Same character index in both strings. Any earlier insertion or
    /// deletion shifts every later index, so counts after the first word
    /// error are unreliable.
    #[default]
    Positional,
    /// Partner taken from the character-level edit alignment.
    AlignmentAnchored,
}

/// Counts how each diacritic letter of the references is recognized.
#[derive(Debug, Clone)]
pub struct DiacriticConfusionTracker {
    alphabet: DiacriticAlphabet,
    mode: ComparisonMode,
}

impl DiacriticConfusionTracker {
    pub fn new(alphabet: DiacriticAlphabet, mode: ComparisonMode) -> Self {
        Self { alphabet, mode }
    }

    pub fn mode(&self) -> ComparisonMode {
        self.mode
    }

    pub fn tally<'a, I>(&self, pairs: I) -> ConfusionTally
    where
        I: IntoIterator<Item = (&'a NormalizedText, &'a NormalizedText)>,
    {
        let mut tally = ConfusionTally::new(self.alphabet.clone());
        for (reference, hypothesis) in pairs {
            self.observe(&mut tally, reference, hypothesis);
        }
        tally
    }

    pub fn tally_records<'a, I>(&self, records: I) -> ConfusionTally
    where
        I: IntoIterator<Item = &'a UtteranceRecord>,
    {
        self.tally(
            records
                .into_iter()
                .map(|r| (r.reference(), r.normalized_hypothesis())),
        )
    }

    /// One tally per model label.
    pub fn tally_by_model(
        &self,
        dataset: &Dataset,
    ) -> BTreeMap<Option<String>, ConfusionTally> {
        dataset
            .models()
            .into_iter()
            .map(|model| {
                let tally = self.tally_records(dataset.select(model.as_deref(), None));
                (model, tally)
            })
            .collect()
    }

    fn observe(
        &self,
        tally: &mut ConfusionTally,
        reference: &NormalizedText,
        hypothesis: &NormalizedText,
    ) {
        let ref_chars = reference.chars();
        let hyp_chars = hypothesis.chars();

        match self.mode {
            ComparisonMode::Positional => {
                for (i, &letter) in ref_chars.iter().enumerate() {
                    if self.alphabet.contains(letter) {
                        let outcome = hyp_chars
                            .get(i)
                            .map_or(ConfusionOutcome::Deleted, |&c| {
                                ConfusionOutcome::Observed(c)
                            });
                        tally.record(letter, outcome);
                    }
                }
            }
            ComparisonMode::AlignmentAnchored => {
                let alignment = SequenceAligner::align(&ref_chars, &hyp_chars);
                for chunk in alignment.chunks() {
                    for (offset, i) in chunk.reference_span().enumerate() {
                        let letter = ref_chars[i];
                        if !self.alphabet.contains(letter) {
                            continue;
                        }
                        let outcome = match chunk.operation {
                            EditOperation::Hit | EditOperation::Substitute => {
                                ConfusionOutcome::Observed(hyp_chars[chunk.hyp_start + offset])
                            }
                            EditOperation::Delete => ConfusionOutcome::Deleted,
                            EditOperation::Insert => continue,
                        };
                        tally.record(letter, outcome);
                    }
                }
            }
        }
    }
}
