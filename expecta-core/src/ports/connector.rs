// expecta-core/src/ports/connector.rs

// What the validation use cases need from an evaluation engine, without
// knowing which engine answers.

use crate::error::ExpectaError;
use async_trait::async_trait;
use std::path::Path;

/// Engine-independent description of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
}

#[async_trait]
pub trait Connector: Send + Sync {
    async fn execute(&self, query: &str) -> Result<(), ExpectaError>;

    /// Loads a tabular file eagerly into an in-memory table and returns its row count.
    async fn register_source(&self, name: &str, path: &Path) -> Result<u64, ExpectaError>;

    async fn fetch_columns(&self, table_name: &str) -> Result<Vec<ColumnSchema>, ExpectaError>;

    /// Runs a query returning a single unsigned integer (counts).
    async fn query_scalar(&self, query: &str) -> Result<u64, ExpectaError>;

    fn engine_name(&self) -> &str;
}
