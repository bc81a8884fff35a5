/// Average ranks (1-based) of a sample, with the sizes of its tie groups.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub ranks: Vec<f64>,
    pub tie_groups: Vec<usize>,
}

impl Ranking {
    /// Ranks `values`, giving tied values the mean of the ranks they span.
    pub fn of(values: &[f64]) -> Self {
        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

        let mut ranks = vec![0.0; values.len()];
        let mut tie_groups = Vec::new();
        let mut start = 0;
        while start < order.len() {
            let mut end = start + 1;
            while end < order.len() && values[order[end]] == values[order[start]] {
                end += 1;
            }
            // positions start..end hold ranks start+1..=end
            let average = (start + 1 + end) as f64 / 2.0;
            for &index in &order[start..end] {
                ranks[index] = average;
            }
            if end - start > 1 {
                tie_groups.push(end - start);
            }
            start = end;
        }

        Self { ranks, tie_groups }
    }

    pub fn has_ties(&self) -> bool {
        !self.tie_groups.is_empty()
    }

    /// Σ (t³ − t) over tie groups.
    pub fn tie_term(&self) -> f64 {
        self.tie_groups
            .iter()
            .map(|&t| {
                let t = t as f64;
                t * t * t - t
            })
            .sum()
    }
}
