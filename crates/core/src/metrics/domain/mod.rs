pub mod edit_counts;
pub mod metric_calculator;
pub mod metric_kind;
pub mod micro_average;
pub mod word_error_counter;
