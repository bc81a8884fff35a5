use std::num::NonZeroUsize;

use crate::evaluation::domain::evaluation_executor::EvaluationExecutor;
use crate::evaluation::domain::transcriber::Transcriber;
use crate::evaluation::domain::utterance_evaluator::{UtteranceEvaluator, UtteranceOutcome};
use crate::evaluation::domain::utterance_source::UtteranceSource;

const DEFAULT_CHANNEL_CAPACITY: usize = 32;

/// Evaluates utterances on a pool of scoped worker threads.
///
/// Layout: `feeder → workers [transcribe/score] → main [reorder/progress]`
///
/// Jobs carry their input index so the main thread can restore input order.
pub struct ThreadedEvaluationExecutor {
    workers: usize,
    channel_capacity: usize,
}

impl ThreadedEvaluationExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl Default for ThreadedEvaluationExecutor {
    fn default() -> Self {
        let workers = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
        Self::new(workers)
    }
}

impl EvaluationExecutor for ThreadedEvaluationExecutor {
    fn execute(
        &self,
        sources: &[UtteranceSource],
        evaluator: &UtteranceEvaluator,
        transcriber: &dyn Transcriber,
        on_progress: &mut dyn FnMut(usize, usize),
    ) -> Vec<UtteranceOutcome> {
        let total = sources.len();
        let mut slots: Vec<Option<UtteranceOutcome>> = (0..total).map(|_| None).collect();

        let (job_tx, job_rx) =
            crossbeam_channel::bounded::<(usize, &UtteranceSource)>(self.channel_capacity);
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<(usize, UtteranceOutcome)>();

        std::thread::scope(|scope| {
            for _ in 0..self.workers.min(total.max(1)) {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for (index, source) in job_rx {
                        let outcome = evaluator.evaluate(source, transcriber);
                        if result_tx.send((index, outcome)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(job_rx);
            drop(result_tx);

            scope.spawn(move || {
                for job in sources.iter().enumerate() {
                    if job_tx.send(job).is_err() {
                        break;
                    }
                }
            });

            for (done, (index, outcome)) in result_rx.iter().enumerate() {
                slots[index] = Some(outcome);
                on_progress(done + 1, total);
            }
        });

        slots.into_iter().flatten().collect()
    }
}
