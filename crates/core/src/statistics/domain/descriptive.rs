use serde::Serialize;

/// Location, spread and five-number summary of the defined values of a metric.
///
/// Quartiles interpolate linearly between order statistics, so `q1`, `median`
/// and `q3` together with `min` and `max` are enough to draw a box plot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub q1: Option<f64>,
    pub q3: Option<f64>,
}

impl MetricSummary {
    /// `std_dev` uses the n − 1 denominator and needs at least two values.
    pub fn of(values: &[f64]) -> Self {
        let count = values.len();
        if count == 0 {
            return Self::default();
        }

        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let std_dev = (count > 1).then(|| {
            let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
            variance.sqrt()
        });

        Self {
            count,
            mean: Some(mean),
            median: Some(quantile(&sorted, 0.5)),
            std_dev,
            min: sorted.first().copied(),
            max: sorted.last().copied(),
            q1: Some(quantile(&sorted, 0.25)),
            q3: Some(quantile(&sorted, 0.75)),
        }
    }

    /// Interquartile range `q3 - q1`.
    pub fn iqr(&self) -> Option<f64> {
        Some(self.q3? - self.q1?)
    }
}

/// Quantile of a non-empty sorted slice at position `q * (n - 1)`.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
