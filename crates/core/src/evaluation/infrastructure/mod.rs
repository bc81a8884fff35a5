pub mod corpus_directory;
pub mod hypothesis_directory_transcriber;
pub mod sequential_evaluation_executor;
pub mod threaded_evaluation_executor;
