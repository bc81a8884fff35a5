use std::collections::HashMap;

use serde::Serialize;

use crate::alignment::domain::alignment_chunk::EditOperation;
use crate::alignment::domain::sequence_aligner::SequenceAligner;
use crate::dataset::domain::utterance_record::UtteranceRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissedWord {
    pub word: String,
    pub count: u64,
}

/// Counts reference words that were substituted or deleted.
#[derive(Debug, Clone, Default)]
pub struct WordErrorCounter {
    counts: HashMap<String, u64>,
}

impl WordErrorCounter {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a UtteranceRecord>,
    {
        let mut counter = Self::default();
        for record in records {
            counter.observe(record);
        }
        counter
    }

    pub fn observe(&mut self, record: &UtteranceRecord) {
        let reference = record.reference().words();
        let hypothesis = record.normalized_hypothesis().words();
        let alignment = SequenceAligner::align(&reference, &hypothesis);

        for chunk in alignment.chunks() {
            if matches!(
                chunk.operation,
                EditOperation::Substitute | EditOperation::Delete
            ) {
                for word in &reference[chunk.reference_span()] {
                    *self.counts.entry((*word).to_string()).or_default() += 1;
                }
            }
        }
    }

    pub fn count(&self, word: &str) -> u64 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    /// Most frequently missed words; equal counts in alphabetical order.
    pub fn most_common(&self, n: usize) -> Vec<MissedWord> {
        let mut words: Vec<MissedWord> = self
            .counts
            .iter()
            .map(|(word, &count)| MissedWord {
                word: word.clone(),
                count,
            })
            .collect();
        words.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
        words.truncate(n);
        words
    }
}
