use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::Serialize;

use crate::alignment::domain::alignment_chunk::{AlignmentChunk, EditOperation};

/// Raw hit/substitution/deletion/insertion tallies of one or more alignments.
///
/// Counts add, so corpus figures are obtained by summing before dividing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EditCounts {
    pub hits: usize,
    pub substitutions: usize,
    pub deletions: usize,
    pub insertions: usize,
}

impl EditCounts {
    pub fn from_chunks(chunks: &[AlignmentChunk]) -> Self {
        let mut counts = Self::default();
        for chunk in chunks {
            let n = chunk.len();
            match chunk.operation {
                EditOperation::Hit => counts.hits += n,
                EditOperation::Substitute => counts.substitutions += n,
                EditOperation::Delete => counts.deletions += n,
                EditOperation::Insert => counts.insertions += n,
            }
        }
        counts
    }

    /// Reference length N = H + S + D. Insertions never consume the reference.
    pub fn reference_len(&self) -> usize {
        self.hits + self.substitutions + self.deletions
    }

    pub fn errors(&self) -> usize {
        self.substitutions + self.deletions + self.insertions
    }

    /// (S + D + I) / N, `None` when the reference is empty.
    pub fn error_rate(&self) -> Option<f64> {
        self.ratio(self.errors())
    }

    /// D / N, `None` when the reference is empty.
    pub fn deletion_rate(&self) -> Option<f64> {
        self.ratio(self.deletions)
    }

    fn ratio(&self, numerator: usize) -> Option<f64> {
        match self.reference_len() {
            0 => None,
            n => Some(numerator as f64 / n as f64),
        }
    }
}

impl Add for EditCounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            hits: self.hits + other.hits,
            substitutions: self.substitutions + other.substitutions,
            deletions: self.deletions + other.deletions,
            insertions: self.insertions + other.insertions,
        }
    }
}

impl AddAssign for EditCounts {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sum for EditCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl<'a> Sum<&'a EditCounts> for EditCounts {
    fn sum<I: Iterator<Item = &'a EditCounts>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::domain::sequence_aligner::SequenceAligner;
    use approx::assert_relative_eq;

    fn counts(s: usize, d: usize, i: usize, h: usize) -> EditCounts {
        EditCounts {
            hits: h,
            substitutions: s,
            deletions: d,
            insertions: i,
        }
    }

    #[test]
    fn test_from_chunks_cat_sat_on_mat() {
        let reference: Vec<&str> = "the cat sat on the mat".split(' ').collect();
        let hypothesis: Vec<&str> = "the cat sit on mat".split(' ').collect();
        let alignment = SequenceAligner::align(&reference, &hypothesis);
        let c = EditCounts::from_chunks(alignment.chunks());

        assert_eq!(c, counts(1, 1, 0, 4));
        assert_eq!(c.reference_len(), 6);
        assert_relative_eq!(c.error_rate().unwrap(), 2.0 / 6.0);
        assert_relative_eq!(c.deletion_rate().unwrap(), 1.0 / 6.0);
    }

    #[test]
    fn test_empty_reference_is_undefined() {
        let c = counts(0, 0, 3, 0);
        assert_eq!(c.reference_len(), 0);
        assert!(c.error_rate().is_none());
        assert!(c.deletion_rate().is_none());
    }

    #[test]
    fn test_insertions_can_push_rate_above_one() {
        let c = counts(1, 0, 2, 0);
        assert_relative_eq!(c.error_rate().unwrap(), 3.0);
    }

    #[test]
    fn test_sum_adds_fieldwise() {
        let total: EditCounts = [counts(1, 2, 3, 4), counts(4, 3, 2, 1)].iter().sum();
        assert_eq!(total, counts(5, 5, 5, 5));
    }

    #[test]
    fn test_add_assign() {
        let mut c = counts(1, 0, 0, 1);
        c += counts(0, 1, 0, 1);
        assert_eq!(c, counts(1, 1, 0, 2));
    }
}
