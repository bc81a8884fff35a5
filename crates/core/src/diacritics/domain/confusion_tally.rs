use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::shared::language_profile::DiacriticAlphabet;

/// What the hypothesis holds where the reference has a tracked letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfusionOutcome {
    Observed(char),
    Deleted,
}

impl fmt::Display for ConfusionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfusionOutcome::Observed(' ') => write!(f, "␣"),
            ConfusionOutcome::Observed(c) => write!(f, "{c}"),
            ConfusionOutcome::Deleted => write!(f, "deleted"),
        }
    }
}

impl Serialize for ConfusionOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfusionOutcome::Observed(c) => serializer.serialize_char(*c),
            ConfusionOutcome::Deleted => serializer.serialize_str("deleted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionEntry {
    pub reference: char,
    pub observed: ConfusionOutcome,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LetterErrorRate {
    pub letter: char,
    pub total: u64,
    pub errors: u64,
    pub rate: f64,
}

/// Count table for rendering. Rows are the tracked letters; columns are the
/// same letters in the same order, then `other` (any untracked character) and
/// `deleted`. The letter block is square, and each row sums to the letter's
/// total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub rows: Vec<char>,
    pub columns: Vec<String>,
    pub counts: Vec<Vec<u64>>,
}

pub const OTHER_COLUMN: &str = "other";
pub const DELETED_COLUMN: &str = "deleted";

/// Accumulated diacritic occurrence, error and confusion counts.
///
/// Counts only ever grow; two tallies combine by addition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionTally {
    alphabet: DiacriticAlphabet,
    totals: BTreeMap<char, u64>,
    errors: BTreeMap<char, u64>,
    pairs: BTreeMap<(char, ConfusionOutcome), u64>,
}

impl ConfusionTally {
    pub fn new(alphabet: DiacriticAlphabet) -> Self {
        Self {
            alphabet,
            totals: BTreeMap::new(),
            errors: BTreeMap::new(),
            pairs: BTreeMap::new(),
        }
    }

    pub(crate) fn record(&mut self, letter: char, outcome: ConfusionOutcome) {
        *self.totals.entry(letter).or_default() += 1;
        if outcome != ConfusionOutcome::Observed(letter) {
            *self.errors.entry(letter).or_default() += 1;
        }
        *self.pairs.entry((letter, outcome)).or_default() += 1;
    }

    pub fn combine(&self, other: &ConfusionTally) -> ConfusionTally {
        let mut combined = self.clone();
        for (letter, n) in &other.totals {
            *combined.totals.entry(*letter).or_default() += n;
        }
        for (letter, n) in &other.errors {
            *combined.errors.entry(*letter).or_default() += n;
        }
        for (key, n) in &other.pairs {
            *combined.pairs.entry(*key).or_default() += n;
        }
        combined
    }

    pub fn alphabet(&self) -> &DiacriticAlphabet {
        &self.alphabet
    }

    pub fn total(&self, letter: char) -> u64 {
        self.totals.get(&letter).copied().unwrap_or(0)
    }

    pub fn errors(&self, letter: char) -> u64 {
        self.errors.get(&letter).copied().unwrap_or(0)
    }

    /// errors / total, or 0.0 for a letter that never occurred.
    pub fn error_rate(&self, letter: char) -> f64 {
        match self.total(letter) {
            0 => 0.0,
            total => self.errors(letter) as f64 / total as f64,
        }
    }

    pub fn confusion_count(&self, letter: char, outcome: ConfusionOutcome) -> u64 {
        self.pairs.get(&(letter, outcome)).copied().unwrap_or(0)
    }

    /// Every observed partner of `letter` (itself included), by outcome.
    pub fn partners(&self, letter: char) -> Vec<(ConfusionOutcome, u64)> {
        self.pairs
            .iter()
            .filter(|((l, _), _)| *l == letter)
            .map(|((_, outcome), n)| (*outcome, *n))
            .collect()
    }

    /// All pairs, most frequent first; ties in key order.
    pub fn entries(&self) -> Vec<ConfusionEntry> {
        let mut entries: Vec<ConfusionEntry> = self
            .pairs
            .iter()
            .map(|(&(reference, observed), &count)| ConfusionEntry {
                reference,
                observed,
                count,
            })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries
    }

    pub fn most_common(&self, n: usize) -> Vec<ConfusionEntry> {
        self.entries().into_iter().take(n).collect()
    }

    /// The `n` most frequent mistakes (correct recognitions excluded).
    pub fn most_common_confusions(&self, n: usize) -> Vec<ConfusionEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.observed != ConfusionOutcome::Observed(e.reference))
            .take(n)
            .collect()
    }

    /// Per-letter table over the whole alphabet, zero-count letters included.
    pub fn letter_rates(&self) -> Vec<LetterErrorRate> {
        self.alphabet
            .letters()
            .map(|letter| LetterErrorRate {
                letter,
                total: self.total(letter),
                errors: self.errors(letter),
                rate: self.error_rate(letter),
            })
            .collect()
    }

    pub fn confusion_matrix(&self) -> ConfusionMatrix {
        let rows: Vec<char> = self.alphabet.letters().collect();
        let mut columns: Vec<String> = rows.iter().map(char::to_string).collect();
        columns.push(OTHER_COLUMN.to_string());
        columns.push(DELETED_COLUMN.to_string());

        let other = rows.len();
        let deleted = rows.len() + 1;
        let mut counts = vec![vec![0u64; columns.len()]; rows.len()];

        for (&(letter, outcome), &n) in &self.pairs {
            let Some(row) = rows.iter().position(|&r| r == letter) else {
                continue;
            };
            let column = match outcome {
                ConfusionOutcome::Deleted => deleted,
                ConfusionOutcome::Observed(c) => {
                    rows.iter().position(|&r| r == c).unwrap_or(other)
                }
            };
            counts[row][column] += n;
        }

        ConfusionMatrix {
            rows,
            columns,
            counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tally() -> ConfusionTally {
        let mut t = ConfusionTally::new(DiacriticAlphabet::default());
        t.record('č', ConfusionOutcome::Observed('č'));
        t.record('č', ConfusionOutcome::Observed('c'));
        t.record('č', ConfusionOutcome::Observed('ć'));
        t.record('č', ConfusionOutcome::Deleted);
        t.record('š', ConfusionOutcome::Observed('s'));
        t
    }

    #[test]
    fn test_error_rate_counts_every_mismatch() {
        let t = tally();
        assert_eq!(t.total('č'), 4);
        assert_eq!(t.errors('č'), 3);
        assert_relative_eq!(t.error_rate('č'), 0.75);
    }

    #[test]
    fn test_unseen_letter_rate_is_zero() {
        let t = tally();
        assert_eq!(t.total('đ'), 0);
        assert_relative_eq!(t.error_rate('đ'), 0.0);
    }

    #[test]
    fn test_partners_sum_to_total() {
        let t = tally();
        let sum: u64 = t.partners('č').iter().map(|(_, n)| n).sum();
        assert_eq!(sum, t.total('č'));
    }

    #[test]
    fn test_most_common_excludes_hits() {
        let mut t = tally();
        for _ in 0..5 {
            t.record('ž', ConfusionOutcome::Observed('ž'));
        }
        t.record('ž', ConfusionOutcome::Observed('z'));
        t.record('ž', ConfusionOutcome::Observed('z'));

        let top = t.most_common_confusions(1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].reference, 'ž');
        assert_eq!(top[0].observed, ConfusionOutcome::Observed('z'));
        assert_eq!(top[0].count, 2);

        let all = t.most_common(1);
        assert_eq!(all[0].observed, ConfusionOutcome::Observed('ž'));
        assert_eq!(all[0].count, 5);
    }

    #[test]
    fn test_combine_adds_counts() {
        let combined = tally().combine(&tally());
        assert_eq!(combined.total('č'), 8);
        assert_eq!(combined.confusion_count('č', ConfusionOutcome::Deleted), 2);
    }

    #[test]
    fn test_letter_rates_cover_alphabet() {
        let rates = tally().letter_rates();
        assert_eq!(rates.len(), 10);
        let s = rates.iter().find(|r| r.letter == 'š').unwrap();
        assert_eq!(s.total, 1);
        assert_relative_eq!(s.rate, 1.0);
    }

    #[test]
    fn test_confusion_matrix_rows_sum_to_totals() {
        let t = tally();
        let matrix = t.confusion_matrix();
        assert_eq!(matrix.columns.last().map(String::as_str), Some(DELETED_COLUMN));
        let letters: Vec<String> = matrix.rows.iter().map(char::to_string).collect();
        assert_eq!(matrix.columns[..matrix.rows.len()], letters[..]);
        assert_eq!(matrix.columns.len(), matrix.rows.len() + 2);
        for (row, letter) in matrix.rows.iter().enumerate() {
            let sum: u64 = matrix.counts[row].iter().sum();
            assert_eq!(sum, t.total(*letter));
        }

        let c_row = matrix.rows.iter().position(|&r| r == 'č').unwrap();
        let c_acute = matrix.columns.iter().position(|c| c == "ć").unwrap();
        let other = matrix.columns.iter().position(|c| c == OTHER_COLUMN).unwrap();
        assert_eq!(matrix.counts[c_row][c_acute], 1);
        assert_eq!(matrix.counts[c_row][other], 1);
    }

    #[test]
    fn test_outcome_serializes_as_string() {
        assert_eq!(
            serde_json::to_string(&ConfusionOutcome::Observed('c')).unwrap(),
            "\"c\""
        );
        assert_eq!(
            serde_json::to_string(&ConfusionOutcome::Deleted).unwrap(),
            "\"deleted\""
        );
    }
}
