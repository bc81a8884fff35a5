use std::fmt;
use std::ops::Range;

use serde::Serialize;

/// Kind of edit applied to turn the reference into the hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditOperation {
    Hit,
    Substitute,
    Delete,
    Insert,
}

impl EditOperation {
    pub fn consumes_reference(self) -> bool {
        !matches!(self, EditOperation::Insert)
    }

    pub fn consumes_hypothesis(self) -> bool {
        !matches!(self, EditOperation::Delete)
    }
}

impl fmt::Display for EditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditOperation::Hit => write!(f, "hit"),
            EditOperation::Substitute => write!(f, "substitute"),
            EditOperation::Delete => write!(f, "delete"),
            EditOperation::Insert => write!(f, "insert"),
        }
    }
}

/// A maximal run of one edit operation.
///
/// Spans are half-open indices into the reference and hypothesis token
/// sequences. A `Delete` chunk has an empty hypothesis span and an `Insert`
/// chunk an empty reference span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignmentChunk {
    pub operation: EditOperation,
    pub ref_start: usize,
    pub ref_end: usize,
    pub hyp_start: usize,
    pub hyp_end: usize,
}

impl AlignmentChunk {
    pub fn reference_span(&self) -> Range<usize> {
        self.ref_start..self.ref_end
    }

    pub fn hypothesis_span(&self) -> Range<usize> {
        self.hyp_start..self.hyp_end
    }

    /// Number of single-token edits in the run.
    pub fn len(&self) -> usize {
        (self.ref_end - self.ref_start).max(self.hyp_end - self.hyp_start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
