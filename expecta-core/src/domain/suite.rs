// expecta-core/src/domain/suite.rs

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::expectation::Expectation;

/// Named, ordered collection of expectations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectationSuite {
    pub name: String,
    #[serde(default)]
    pub expectations: Vec<Expectation>,
}

impl ExpectationSuite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expectations: Vec::new(),
        }
    }

    pub fn with_expectations(name: impl Into<String>, expectations: Vec<Expectation>) -> Self {
        Self {
            name: name.into(),
            expectations,
        }
    }

    /// Appends a rule, keeping declaration order.
    pub fn add_expectation(&mut self, expectation: Expectation) -> Result<(), DomainError> {
        expectation
            .validate_params()
            .map_err(|e| DomainError::InvalidExpectation {
                suite: self.name.clone(),
                reason: e.to_string(),
            })?;
        self.expectations.push(expectation);
        Ok(())
    }

    /// Validates every rule parameter set.
    pub fn validate(&self) -> Result<(), DomainError> {
        for expectation in &self.expectations {
            expectation
                .validate_params()
                .map_err(|e| DomainError::InvalidExpectation {
                    suite: self.name.clone(),
                    reason: format!("{}: {}", expectation.kind(), e),
                })?;
        }
        Ok(())
    }
}
