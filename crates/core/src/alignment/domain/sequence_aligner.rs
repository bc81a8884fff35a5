use super::alignment_chunk::{AlignmentChunk, EditOperation};

/// Minimum-edit-distance alignment between a reference and a hypothesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    chunks: Vec<AlignmentChunk>,
    cost: usize,
}

impl Alignment {
    pub fn chunks(&self) -> &[AlignmentChunk] {
        &self.chunks
    }

    /// Total number of substitutions, deletions and insertions.
    pub fn cost(&self) -> usize {
        self.cost
    }
}

/// Levenshtein aligner over arbitrary token sequences.
///
/// Unit cost for substitution, deletion and insertion; zero for a match.
/// Among equal-cost paths the backtrace picks, per cell:
/// 1. a hit whenever the tokens match
/// 2. deletion rather than insertion
/// 3. the operation of the chunk being extended, if it is still optimal
/// 4. otherwise substitution, then deletion, then insertion
pub struct SequenceAligner;

impl SequenceAligner {
    pub fn align<T: PartialEq>(reference: &[T], hypothesis: &[T]) -> Alignment {
        let table = CostTable::build(reference, hypothesis);
        let operations = backtrace(&table, reference, hypothesis);
        Alignment {
            chunks: group_into_chunks(&operations),
            cost: table.get(reference.len(), hypothesis.len()),
        }
    }
}

struct CostTable {
    cells: Vec<usize>,
    width: usize,
}

impl CostTable {
    fn build<T: PartialEq>(reference: &[T], hypothesis: &[T]) -> Self {
        let (m, n) = (reference.len(), hypothesis.len());
        let width = n + 1;
        let mut cells = vec![0usize; (m + 1) * width];

        for (j, cell) in cells.iter_mut().take(width).enumerate() {
            *cell = j;
        }
        for i in 1..=m {
            cells[i * width] = i;
            for j in 1..=n {
                let diagonal = cells[(i - 1) * width + j - 1]
                    + usize::from(reference[i - 1] != hypothesis[j - 1]);
                let deletion = cells[(i - 1) * width + j] + 1;
                let insertion = cells[i * width + j - 1] + 1;
                cells[i * width + j] = diagonal.min(deletion).min(insertion);
            }
        }

        Self { cells, width }
    }

    fn get(&self, i: usize, j: usize) -> usize {
        self.cells[i * self.width + j]
    }
}

fn backtrace<T: PartialEq>(
    table: &CostTable,
    reference: &[T],
    hypothesis: &[T],
) -> Vec<EditOperation> {
    let (mut i, mut j) = (reference.len(), hypothesis.len());
    let mut operations = Vec::with_capacity(i + j);
    let mut previous: Option<EditOperation> = None;

    while i > 0 || j > 0 {
        let operation = choose_operation(table, reference, hypothesis, i, j, previous);
        match operation {
            EditOperation::Hit | EditOperation::Substitute => {
                i -= 1;
                j -= 1;
            }
            EditOperation::Delete => i -= 1,
            EditOperation::Insert => j -= 1,
        }
        operations.push(operation);
        previous = Some(operation);
    }

    operations.reverse();
    operations
}

fn choose_operation<T: PartialEq>(
    table: &CostTable,
    reference: &[T],
    hypothesis: &[T],
    i: usize,
    j: usize,
    previous: Option<EditOperation>,
) -> EditOperation {
    let here = table.get(i, j);
    let diagonal = i > 0 && j > 0;
    let tokens_match = diagonal && reference[i - 1] == hypothesis[j - 1];

    if tokens_match && table.get(i - 1, j - 1) == here {
        return EditOperation::Hit;
    }

    let substitute = diagonal && !tokens_match && table.get(i - 1, j - 1) + 1 == here;
    let delete = i > 0 && table.get(i - 1, j) + 1 == here;
    let insert = j > 0 && !delete && table.get(i, j - 1) + 1 == here;

    let candidates = [
        (EditOperation::Substitute, substitute),
        (EditOperation::Delete, delete),
        (EditOperation::Insert, insert),
    ];

    if let Some(prev) = previous {
        if candidates.iter().any(|&(op, ok)| ok && op == prev) {
            return prev;
        }
    }

    candidates
        .iter()
        .find(|(_, ok)| *ok)
        .map(|(op, _)| *op)
        .unwrap_or(if i > 0 {
            EditOperation::Delete
        } else {
            EditOperation::Insert
        })
}

fn group_into_chunks(operations: &[EditOperation]) -> Vec<AlignmentChunk> {
    let mut chunks: Vec<AlignmentChunk> = Vec::new();
    let (mut r, mut h) = (0, 0);

    for &operation in operations {
        let next_r = r + usize::from(operation.consumes_reference());
        let next_h = h + usize::from(operation.consumes_hypothesis());

        match chunks.last_mut() {
            Some(last) if last.operation == operation => {
                last.ref_end = next_r;
                last.hyp_end = next_h;
            }
            _ => chunks.push(AlignmentChunk {
                operation,
                ref_start: r,
                ref_end: next_r,
                hyp_start: h,
                hyp_end: next_h,
            }),
        }

        r = next_r;
        h = next_h;
    }

    chunks
}
