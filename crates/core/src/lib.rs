pub mod alignment;
pub mod dataset;
pub mod diacritics;
pub mod evaluation;
pub mod metrics;
pub mod normalization;
pub mod persistence;
pub mod pipeline;
pub mod shared;
pub mod statistics;
