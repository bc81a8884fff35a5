pub mod evaluation_executor;
pub mod transcriber;
pub mod utterance_evaluator;
pub mod utterance_source;
