use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::shared::constants::SIGNIFICANCE_LEVEL;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatisticsError {
    #[error("sample '{0}' is empty")]
    EmptySample(&'static str),
    #[error("paired samples differ in length ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },
    #[error("sample '{0}' contains a non-finite value")]
    NonFinite(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    MannWhitneyU,
    WilcoxonSignedRank,
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestKind::MannWhitneyU => write!(f, "Mann-Whitney U"),
            TestKind::WilcoxonSignedRank => write!(f, "Wilcoxon signed-rank"),
        }
    }
}

/// How the p-value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PValueMethod {
    Exact,
    NormalApproximation,
}

/// Result of a two-sided nonparametric test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestOutcome {
    pub test: TestKind,
    pub statistic: f64,
    pub p_value: f64,
    pub method: PValueMethod,
    /// `p_value < SIGNIFICANCE_LEVEL`
    pub significant: bool,
    pub first_size: usize,
    pub second_size: usize,
}

impl TestOutcome {
    pub(crate) fn new(
        test: TestKind,
        statistic: f64,
        p_value: f64,
        method: PValueMethod,
        sizes: (usize, usize),
    ) -> Self {
        Self {
            test,
            statistic,
            p_value,
            method,
            significant: p_value < SIGNIFICANCE_LEVEL,
            first_size: sizes.0,
            second_size: sizes.1,
        }
    }

    pub fn conclusion(&self) -> &'static str {
        if self.significant {
            "significant difference"
        } else {
            "no significant difference"
        }
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: statistic={:.3}, p={:.4} ({}), {}",
            self.test,
            self.statistic,
            self.p_value,
            match self.method {
                PValueMethod::Exact => "exact",
                PValueMethod::NormalApproximation => "normal approx.",
            },
            self.conclusion()
        )
    }
}

pub(crate) fn check_sample(values: &[f64], name: &'static str) -> Result<(), StatisticsError> {
    if values.is_empty() {
        return Err(StatisticsError::EmptySample(name));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(StatisticsError::NonFinite(name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_significance_follows_threshold() {
        let outcome = TestOutcome::new(
            TestKind::MannWhitneyU,
            0.0,
            0.049,
            PValueMethod::Exact,
            (5, 5),
        );
        assert!(outcome.significant);
        assert_eq!(outcome.conclusion(), "significant difference");

        let outcome = TestOutcome::new(
            TestKind::MannWhitneyU,
            0.0,
            0.05,
            PValueMethod::Exact,
            (5, 5),
        );
        assert!(!outcome.significant);
    }

    #[test]
    fn test_check_sample() {
        assert_eq!(
            check_sample(&[], "first"),
            Err(StatisticsError::EmptySample("first"))
        );
        assert_eq!(
            check_sample(&[0.1, f64::NAN], "second"),
            Err(StatisticsError::NonFinite("second"))
        );
        assert!(check_sample(&[0.1], "first").is_ok());
    }
}
