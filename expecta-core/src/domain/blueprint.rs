// expecta-core/src/domain/blueprint.rs

// Suites and checkpoints as data. The initializer consumes a Blueprint
// through one generic registration routine.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::context::validate_name;
use crate::domain::error::DomainError;
use crate::domain::expectation::Expectation;
use crate::domain::suite::ExpectationSuite;

pub const SOURCE_NAME: &str = "pandas";
pub const ASSET_NAME: &str = "transactions";
pub const BATCH_NAME: &str = "transactions batch";

pub const STATISTICAL_CHECKPOINT: &str = "statistical_checkpoint";
pub const COMPLETENESS_CHECKPOINT: &str = "completeness_checkpoint";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointBlueprint {
    pub name: String,
    /// Validation definitions, which carry the name of their suite.
    pub validation_definitions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub data_source: String,
    pub asset: String,
    pub batch_definition: String,
    pub suites: Vec<ExpectationSuite>,
    pub checkpoints: Vec<CheckpointBlueprint>,
}

impl Default for Blueprint {
    fn default() -> Self {
        Self::transactions()
    }
}

impl Blueprint {
    /// The fixed transactions project: four suites, two checkpoints.
    pub fn transactions() -> Self {
        Self {
            data_source: SOURCE_NAME.to_string(),
            asset: ASSET_NAME.to_string(),
            batch_definition: BATCH_NAME.to_string(),
            suites: vec![
                ExpectationSuite::with_expectations(
                    "distribution",
                    vec![Expectation::between("transaction_id", 1001.0, 1020.0)],
                ),
                ExpectationSuite::with_expectations(
                    "missingness",
                    vec![
                        Expectation::not_null("customer_id"),
                        Expectation::null("product_rating", Some(0.8)),
                    ],
                ),
                ExpectationSuite::with_expectations(
                    "schema",
                    vec![
                        Expectation::column_exists("purchase_date"),
                        Expectation::column_count(6),
                    ],
                ),
                ExpectationSuite::with_expectations("volume", vec![Expectation::row_count(21)]),
            ],
            checkpoints: vec![
                CheckpointBlueprint {
                    name: STATISTICAL_CHECKPOINT.to_string(),
                    validation_definitions: vec!["distribution".to_string()],
                },
                CheckpointBlueprint {
                    name: COMPLETENESS_CHECKPOINT.to_string(),
                    validation_definitions: vec![
                        "missingness".to_string(),
                        "schema".to_string(),
                        "volume".to_string(),
                    ],
                },
            ],
        }
    }

    pub fn suite_names(&self) -> Vec<String> {
        self.suites.iter().map(|s| s.name.clone()).collect()
    }

    pub fn checkpoint_names(&self) -> Vec<String> {
        self.checkpoints.iter().map(|c| c.name.clone()).collect()
    }

    /// Rejects duplicated names, dangling checkpoint references and invalid rules.
    pub fn validate(&self) -> Result<(), DomainError> {
        for name in [&self.data_source, &self.asset, &self.batch_definition] {
            validate_name(name)?;
        }

        let mut suites = HashSet::new();
        for suite in &self.suites {
            validate_name(&suite.name)?;
            if !suites.insert(suite.name.as_str()) {
                return Err(DomainError::InvalidBlueprint(format!(
                    "suite '{}' is declared twice",
                    suite.name
                )));
            }
            suite.validate()?;
        }

        let mut checkpoints = HashSet::new();
        for checkpoint in &self.checkpoints {
            validate_name(&checkpoint.name)?;
            if !checkpoints.insert(checkpoint.name.as_str()) {
                return Err(DomainError::InvalidBlueprint(format!(
                    "checkpoint '{}' is declared twice",
                    checkpoint.name
                )));
            }
            if checkpoint.validation_definitions.is_empty() {
                return Err(DomainError::InvalidBlueprint(format!(
                    "checkpoint '{}' has no validation definitions",
                    checkpoint.name
                )));
            }
            if let Some(missing) = checkpoint
                .validation_definitions
                .iter()
                .find(|name| !suites.contains(name.as_str()))
            {
                return Err(DomainError::InvalidBlueprint(format!(
                    "checkpoint '{}' references unknown validation definition '{}'",
                    checkpoint.name, missing
                )));
            }
        }
        Ok(())
    }
}
