use super::transcriber::Transcriber;
use super::utterance_evaluator::{UtteranceEvaluator, UtteranceOutcome};
use super::utterance_source::UtteranceSource;

/// Abstracts how the per-utterance transcribe → score step is scheduled.
///
/// Outcomes come back in the order of `sources` whatever the schedule.
pub trait EvaluationExecutor: Send {
    fn execute(
        &self,
        sources: &[UtteranceSource],
        evaluator: &UtteranceEvaluator,
        transcriber: &dyn Transcriber,
        on_progress: &mut dyn FnMut(usize, usize),
    ) -> Vec<UtteranceOutcome>;
}
