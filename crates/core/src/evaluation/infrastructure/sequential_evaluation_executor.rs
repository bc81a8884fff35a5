use crate::evaluation::domain::evaluation_executor::EvaluationExecutor;
use crate::evaluation::domain::transcriber::Transcriber;
use crate::evaluation::domain::utterance_evaluator::{UtteranceEvaluator, UtteranceOutcome};
use crate::evaluation::domain::utterance_source::UtteranceSource;

/// Evaluates utterances one after another on the calling thread.
#[derive(Debug, Default)]
pub struct SequentialEvaluationExecutor;

impl EvaluationExecutor for SequentialEvaluationExecutor {
    fn execute(
        &self,
        sources: &[UtteranceSource],
        evaluator: &UtteranceEvaluator,
        transcriber: &dyn Transcriber,
        on_progress: &mut dyn FnMut(usize, usize),
    ) -> Vec<UtteranceOutcome> {
        let total = sources.len();
        sources
            .iter()
            .enumerate()
            .map(|(i, source)| {
                let outcome = evaluator.evaluate(source, transcriber);
                on_progress(i + 1, total);
                outcome
            })
            .collect()
    }
}
