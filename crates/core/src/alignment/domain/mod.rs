pub mod alignment_chunk;
pub mod sequence_aligner;
