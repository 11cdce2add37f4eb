// expecta-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Expectation suite '{0}' not found in context")]
    #[diagnostic(
        code(expecta::domain::suite_not_found),
        help("Run 'expecta init --mode recreate' to provision the project again.")
    )]
    SuiteNotFound(String),

    #[error("Validation definition '{0}' not found in context")]
    #[diagnostic(code(expecta::domain::validation_definition_not_found))]
    ValidationDefinitionNotFound(String),

    #[error("Checkpoint '{0}' not found in context")]
    #[diagnostic(
        code(expecta::domain::checkpoint_not_found),
        help("Run 'expecta init' before 'expecta run'.")
    )]
    CheckpointNotFound(String),

    #[error("Invalid expectation in suite '{suite}': {reason}")]
    #[diagnostic(code(expecta::domain::invalid_expectation))]
    InvalidExpectation { suite: String, reason: String },

    #[error("Invalid blueprint: {0}")]
    #[diagnostic(code(expecta::domain::blueprint))]
    InvalidBlueprint(String),

    #[error("Invalid name '{0}': names cannot be empty or contain path separators")]
    #[diagnostic(code(expecta::domain::invalid_name))]
    InvalidName(String),

    #[error("Unknown initialization mode '{0}'")]
    #[diagnostic(
        code(expecta::domain::invalid_mode),
        help("Use one of: init, recreate.")
    )]
    InvalidMode(String),
}
