// expecta-core/src/domain/expectation/evaluation.rs

// Pure success rules. Metric collection lives in the application layer,
// these functions only decide pass/fail from the collected counts.

use serde::{Deserialize, Serialize};

/// Absolute tolerance applied to `mostly` comparisons so that an exact
/// ratio (e.g. 16/20 against 0.8) is not lost to float rounding.
pub const MOSTLY_TOLERANCE: f64 = 1e-9;

/// Counts gathered for a column-map rule over one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ColumnMapMetrics {
    /// Rows in the batch.
    pub element_count: u64,
    /// Rows whose value is null.
    pub missing_count: u64,
    /// Rows the rule is evaluated on (all rows, or non-null rows only).
    pub evaluated_count: u64,
    /// Evaluated rows that do not satisfy the rule.
    pub unexpected_count: u64,
}

impl ColumnMapMetrics {
    /// Share of evaluated rows that violate the rule, in percent.
    pub fn unexpected_percent(&self) -> f64 {
        if self.evaluated_count == 0 {
            return 0.0;
        }
        self.unexpected_count as f64 / self.evaluated_count as f64 * 100.0
    }

    /// Share of evaluated rows that satisfy the rule, in [0, 1].
    /// An empty domain counts as fully satisfied.
    pub fn success_ratio(&self) -> f64 {
        if self.evaluated_count == 0 {
            return 1.0;
        }
        let expected = self.evaluated_count.saturating_sub(self.unexpected_count);
        expected as f64 / self.evaluated_count as f64
    }

    pub fn is_success(&self, mostly: Option<f64>) -> bool {
        let threshold = mostly.unwrap_or(1.0);
        self.success_ratio() + MOSTLY_TOLERANCE >= threshold
    }
}

pub fn exact_count_success(observed: u64, expected: u64) -> bool {
    observed == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn null_rule_metrics(rows: u64, nulls: u64) -> ColumnMapMetrics {
        ColumnMapMetrics {
            element_count: rows,
            missing_count: nulls,
            evaluated_count: rows,
            unexpected_count: rows - nulls,
        }
    }

    #[test]
    fn test_mostly_exact_threshold_passes() {
        // 16 of 20 null is exactly 80%
        assert!(null_rule_metrics(20, 16).is_success(Some(0.8)));
        assert!(null_rule_metrics(10, 8).is_success(Some(0.8)));
    }

    #[test]
    fn test_mostly_below_threshold_fails() {
        assert!(!null_rule_metrics(100, 79).is_success(Some(0.8)));
    }

    #[test]
    fn test_default_mostly_requires_every_row() {
        let metrics = ColumnMapMetrics {
            element_count: 21,
            missing_count: 1,
            evaluated_count: 21,
            unexpected_count: 1,
        };
        assert!(!metrics.is_success(None));
        assert!(metrics.is_success(Some(0.9)));
    }

    #[test]
    fn test_empty_domain_is_vacuous_success() {
        let metrics = ColumnMapMetrics::default();
        assert!(metrics.is_success(None));
        assert_eq!(metrics.unexpected_percent(), 0.0);
    }

    #[test]
    fn test_unexpected_percent() {
        let metrics = null_rule_metrics(20, 15);
        assert!((metrics.unexpected_percent() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_exact_count() {
        assert!(exact_count_success(21, 21));
        assert!(!exact_count_success(20, 21));
    }
}
