pub mod normalized_text;
pub mod text_normalizer;
