pub mod dataset;
pub mod speaker_category;
pub mod utterance_record;
