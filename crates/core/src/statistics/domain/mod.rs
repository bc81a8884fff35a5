pub mod descriptive;
pub mod model_comparison;
pub mod normal;
pub mod ranking;
pub mod significance;
pub mod statistical_comparator;
