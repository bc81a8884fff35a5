use std::time::Instant;

use crate::evaluation::domain::utterance_evaluator::SkippedUtterance;

/// Cross-cutting logger for evaluation run events.
///
/// Decouples use cases from specific output mechanisms so callers can
/// observe a run without changing the orchestration code.
pub trait EvaluationLogger: Send {
    /// Report utterance-level progress.
    fn progress(&mut self, current: usize, total: usize);

    /// Record an utterance excluded from the dataset.
    fn skipped(&mut self, skipped: &SkippedUtterance);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullEvaluationLogger;

impl EvaluationLogger for NullEvaluationLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn skipped(&mut self, _skipped: &SkippedUtterance) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI-oriented logger that keeps skip reasons and prints a summary at the
/// end of the run.
///
/// Progress output is throttled to every `throttle` utterances.
pub struct StdoutEvaluationLogger {
    throttle: usize,
    start_time: Instant,
    total: usize,
    skipped: Vec<String>,
}

impl StdoutEvaluationLogger {
    pub fn new(throttle: usize) -> Self {
        Self {
            throttle: throttle.max(1),
            start_time: Instant::now(),
            total: 0,
            skipped: Vec::new(),
        }
    }

    /// Returns the formatted summary string, or `None` if nothing ran.
    pub fn summary_string(&self) -> Option<String> {
        if self.total == 0 && self.skipped.is_empty() {
            return None;
        }

        let elapsed = self.start_time.elapsed().as_secs_f64();
        let evaluated = self.total.saturating_sub(self.skipped.len());
        let mut lines = vec![
            format!("Evaluation summary ({} utterances, {elapsed:.1}s total):", self.total),
            format!("  evaluated: {evaluated}"),
            format!("  skipped:   {}", self.skipped.len()),
        ];
        for reason in &self.skipped {
            lines.push(format!("    {reason}"));
        }
        if elapsed > 0.0 && self.total > 0 {
            lines.push(format!(
                "  Throughput: {:.1} utterances/s",
                self.total as f64 / elapsed
            ));
        }
        Some(lines.join("\n"))
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

impl Default for StdoutEvaluationLogger {
    fn default() -> Self {
        Self::new(crate::shared::constants::DEFAULT_PROGRESS_THROTTLE)
    }
}

impl EvaluationLogger for StdoutEvaluationLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.total = total;
        if total > 0 && (current % self.throttle == 0 || current == total) {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Evaluating: {current}/{total} utterances ({pct:.1}%)");
        }
    }

    fn skipped(&mut self, skipped: &SkippedUtterance) {
        log::warn!("Skipping {skipped}");
        self.skipped.push(skipped.to_string());
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
