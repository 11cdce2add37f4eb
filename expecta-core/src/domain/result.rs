// expecta-core/src/domain/result.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::expectation::Expectation;

pub const DEFAULT_RUN_NAME: &str = "Quality";

/// Logical label of one execution. Every result produced by one run carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunIdentifier {
    pub run_name: String,
    pub run_time: DateTime<Utc>,
}

impl RunIdentifier {
    /// Mints an identifier stamped with the current UTC time.
    pub fn now(run_name: &str) -> Self {
        Self {
            run_name: run_name.to_string(),
            run_time: Utc::now(),
        }
    }

    /// Filesystem-safe, sortable rendering of the run time.
    pub fn run_time_key(&self) -> String {
        self.run_time.format("%Y%m%dT%H%M%S%.6fZ").to_string()
    }
}

impl std::fmt::Display for RunIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.run_name, self.run_time_key())
    }
}

/// Metrics observed while evaluating one rule. Fields depend on the rule kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ObservedMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unexpected_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unexpected_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectationResult {
    pub expectation: Expectation,
    pub success: bool,
    #[serde(default)]
    pub observed: ObservedMetrics,
    /// Set when the metric could not be computed (e.g. missing column).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
}

impl ExpectationResult {
    pub fn passed(expectation: Expectation, success: bool, observed: ObservedMetrics) -> Self {
        Self {
            expectation,
            success,
            observed,
            exception: None,
        }
    }

    pub fn raised(expectation: Expectation, message: impl Into<String>) -> Self {
        Self {
            expectation,
            success: false,
            observed: ObservedMetrics::default(),
            exception: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ValidationStatistics {
    pub evaluated_expectations: usize,
    pub successful_expectations: usize,
    pub unsuccessful_expectations: usize,
    pub success_percent: f64,
}

impl ValidationStatistics {
    pub fn from_results(results: &[ExpectationResult]) -> Self {
        let evaluated = results.len();
        let successful = results.iter().filter(|r| r.success).count();
        let success_percent = if evaluated == 0 {
            100.0
        } else {
            successful as f64 / evaluated as f64 * 100.0
        };
        Self {
            evaluated_expectations: evaluated,
            successful_expectations: successful,
            unsuccessful_expectations: evaluated - successful,
            success_percent,
        }
    }
}

/// Outcome of one validation definition against one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub validation_definition: String,
    pub suite: String,
    pub batch_id: String,
    pub run_id: RunIdentifier,
    pub success: bool,
    pub statistics: ValidationStatistics,
    pub results: Vec<ExpectationResult>,
}

impl ValidationResult {
    pub fn new(
        validation_definition: &str,
        suite: &str,
        batch_id: &str,
        run_id: &RunIdentifier,
        results: Vec<ExpectationResult>,
    ) -> Self {
        let statistics = ValidationStatistics::from_results(&results);
        Self {
            validation_definition: validation_definition.to_string(),
            suite: suite.to_string(),
            batch_id: batch_id.to_string(),
            run_id: run_id.clone(),
            success: results.iter().all(|r| r.success),
            statistics,
            results,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointResult {
    pub checkpoint: String,
    pub run_id: RunIdentifier,
    pub success: bool,
    pub validation_results: Vec<ValidationResult>,
}

impl CheckpointResult {
    pub fn new(checkpoint: &str, run_id: &RunIdentifier, results: Vec<ValidationResult>) -> Self {
        Self {
            checkpoint: checkpoint.to_string(),
            run_id: run_id.clone(),
            success: results.iter().all(|r| r.success),
            validation_results: results,
        }
    }
}
