pub mod analyze_dataset_use_case;
pub mod evaluate_corpus_use_case;
pub mod evaluation_logger;
