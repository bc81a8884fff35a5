use crate::dataset::domain::dataset::Dataset;
use crate::evaluation::domain::evaluation_executor::EvaluationExecutor;
use crate::evaluation::domain::transcriber::Transcriber;
use crate::evaluation::domain::utterance_evaluator::{SkippedUtterance, UtteranceEvaluator};
use crate::evaluation::domain::utterance_source::UtteranceSource;
use crate::persistence::domain::record_store::{RecordStore, RecordStoreError};
use crate::pipeline::evaluation_logger::EvaluationLogger;

/// Records produced by one run, plus the utterances that had to be left out.
#[derive(Debug, Clone, Default)]
pub struct EvaluationOutcome {
    pub dataset: Dataset,
    pub skipped: Vec<SkippedUtterance>,
}

/// Transcribes and scores a corpus for one model, then persists the records.
pub struct EvaluateCorpusUseCase {
    transcriber: Box<dyn Transcriber>,
    executor: Box<dyn EvaluationExecutor>,
    evaluator: UtteranceEvaluator,
    store: Box<dyn RecordStore>,
    logger: Box<dyn EvaluationLogger>,
}

impl EvaluateCorpusUseCase {
    pub fn new(
        transcriber: Box<dyn Transcriber>,
        executor: Box<dyn EvaluationExecutor>,
        evaluator: UtteranceEvaluator,
        store: Box<dyn RecordStore>,
        logger: Box<dyn EvaluationLogger>,
    ) -> Self {
        Self {
            transcriber,
            executor,
            evaluator,
            store,
            logger,
        }
    }

    /// Skipped utterances never abort the run; only a failing store does.
    pub fn run(
        &mut self,
        sources: &[UtteranceSource],
    ) -> Result<EvaluationOutcome, RecordStoreError> {
        self.logger.info(&format!(
            "Evaluating {} utterance(s) for model {}",
            sources.len(),
            self.evaluator.model().unwrap_or("(unlabelled)")
        ));

        let logger = &mut self.logger;
        let outcomes = self.executor.execute(
            sources,
            &self.evaluator,
            self.transcriber.as_ref(),
            &mut |current, total| logger.progress(current, total),
        );

        let mut records = Vec::with_capacity(outcomes.len());
        let mut skipped = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(record) => records.push(record),
                Err(skip) => {
                    self.logger.skipped(&skip);
                    skipped.push(skip);
                }
            }
        }

        let dataset = Dataset::new(records);
        self.store.save(&dataset)?;
        self.logger.summary();

        Ok(EvaluationOutcome { dataset, skipped })
    }
}
