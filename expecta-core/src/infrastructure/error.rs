// expecta-core/src/infrastructure/error.rs

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DatabaseError {
    #[error("DuckDB Engine Error: {0}")]
    #[diagnostic(
        code(expecta::infra::database::duckdb),
        help("An error occurred inside the results store.")
    )]
    DuckDB(#[from] duckdb::Error),

    #[error("DataFusion Engine Error: {0}")]
    #[diagnostic(
        code(expecta::infra::database::datafusion),
        help("An error occurred inside the evaluation engine.")
    )]
    DataFusion(#[from] datafusion::error::DataFusionError),
}

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- DATABASE (Abstracted) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DatabaseError),

    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(expecta::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    #[error("Storage Error at {path:?}: {source}")]
    #[diagnostic(
        code(expecta::infra::storage),
        help("The project directory could not be created or removed.")
    )]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // --- CONFIG / YAML / JSON ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(expecta::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON Error: {0}")]
    #[diagnostic(code(expecta::infra::json))]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(expecta::infra::config))]
    ConfigError(String),

    #[error("Required environment variable '{0}' is not set")]
    #[diagnostic(
        code(expecta::infra::missing_env),
        help("Export the variable before running the command.")
    )]
    MissingEnvironment(String),

    #[error("Project context not found: {0}")]
    #[diagnostic(
        code(expecta::infra::context_not_found),
        help("Run 'expecta init' first.")
    )]
    ContextNotFound(String),

    // --- DATA LOADING ---
    #[error("Failed to load data from {path:?}: {reason}")]
    #[diagnostic(
        code(expecta::infra::data_load),
        help("Check that the file exists and is a valid CSV with a header row.")
    )]
    DataLoad { path: PathBuf, reason: String },

    // --- TEMPLATING ---
    #[error("Template Rendering Error: {0}")]
    #[diagnostic(code(expecta::infra::template))]
    TemplateError(#[from] minijinja::Error),
}

// Shortcuts for `?` on engine calls
impl From<duckdb::Error> for InfrastructureError {
    fn from(err: duckdb::Error) -> Self {
        InfrastructureError::Database(DatabaseError::DuckDB(err))
    }
}

impl From<datafusion::error::DataFusionError> for InfrastructureError {
    fn from(err: datafusion::error::DataFusionError) -> Self {
        InfrastructureError::Database(DatabaseError::DataFusion(err))
    }
}
