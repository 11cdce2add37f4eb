// expecta-core/src/ports/results_store.rs

use crate::domain::result::ValidationResult;
use crate::error::ExpectaError;

/// Persistence of validation results across runs.
pub trait ResultsStore: Send + Sync {
    fn store(&self, result: &ValidationResult) -> Result<(), ExpectaError>;

    /// Every stored result, oldest run first.
    fn list(&self) -> Result<Vec<ValidationResult>, ExpectaError>;

    fn backend_name(&self) -> &str;
}
