// expecta-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExpectaError {
    // --- DOMAIN ERRORS (lookups, invalid rules, invalid blueprint) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (IO, parsing, engine, stores) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    #[error("Internal Error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for ExpectaError {
    fn from(err: std::io::Error) -> Self {
        ExpectaError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl ExpectaError {
    /// True when the failure comes from a missing or unreadable project context.
    pub fn is_context_not_found(&self) -> bool {
        matches!(
            self,
            ExpectaError::Infrastructure(InfrastructureError::ContextNotFound(_))
        )
    }
}
