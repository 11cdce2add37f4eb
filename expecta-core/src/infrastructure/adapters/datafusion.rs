// expecta-core/src/infrastructure/adapters/datafusion.rs

use async_trait::async_trait;
use datafusion::datasource::MemTable;
use datafusion::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

// Hexagonal Imports
use crate::error::ExpectaError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::connector::{ColumnSchema, Connector};

use datafusion::arrow::array::Array;

/// In-process evaluation engine. Sources are loaded eagerly into memory
/// tables, so every rule of a run sees the same snapshot of the file.
pub struct DataFusionConnector {
    ctx: Arc<SessionContext>,
}

impl Default for DataFusionConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl DataFusionConnector {
    pub fn new() -> Self {
        Self {
            ctx: Arc::new(SessionContext::new()),
        }
    }
}

fn engine_error(e: datafusion::error::DataFusionError) -> ExpectaError {
    ExpectaError::Infrastructure(InfrastructureError::Database(DatabaseError::DataFusion(e)))
}

fn load_error(path: &Path, reason: impl ToString) -> ExpectaError {
    ExpectaError::Infrastructure(InfrastructureError::DataLoad {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    })
}

#[async_trait]
impl Connector for DataFusionConnector {
    async fn execute(&self, query: &str) -> Result<(), ExpectaError> {
        let df = self.ctx.sql(query).await.map_err(engine_error)?;
        // Collect to trigger execution
        df.collect().await.map_err(engine_error)?;
        Ok(())
    }

    async fn register_source(&self, name: &str, path: &Path) -> Result<u64, ExpectaError> {
        if !path.is_file() {
            return Err(load_error(path, "file does not exist"));
        }
        let path_str = path
            .to_str()
            .ok_or_else(|| load_error(path, "path is not valid UTF-8"))?;

        // Any extension is accepted; DataFusion filters on `.csv` by default
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        let options = CsvReadOptions::new()
            .has_header(true)
            .file_extension(&extension);

        let df = self
            .ctx
            .read_csv(path_str, options)
            .await
            .map_err(|e| load_error(path, e))?;
        let schema = Arc::clone(df.schema().inner());
        let batches = df.collect().await.map_err(|e| load_error(path, e))?;
        let row_count: usize = batches.iter().map(|b| b.num_rows()).sum();

        let table = MemTable::try_new(schema, vec![batches]).map_err(engine_error)?;
        // Re-registering a name replaces the previous snapshot
        self.ctx.deregister_table(name).map_err(engine_error)?;
        self.ctx
            .register_table(name, Arc::new(table))
            .map_err(engine_error)?;

        info!(table = name, path = ?path, rows = row_count, "Loaded source into memory");
        Ok(row_count as u64)
    }

    async fn fetch_columns(&self, table_name: &str) -> Result<Vec<ColumnSchema>, ExpectaError> {
        let df = self.ctx.table(table_name).await.map_err(engine_error)?;

        let schema = df.schema();
        let columns = schema
            .fields()
            .iter()
            .map(|field| ColumnSchema {
                name: field.name().clone(),
                data_type: format!("{:?}", field.data_type()),
                is_nullable: field.is_nullable(),
            })
            .collect();

        Ok(columns)
    }

    async fn query_scalar(&self, query: &str) -> Result<u64, ExpectaError> {
        debug!(sql = query, "Evaluating metric");
        let df = self.ctx.sql(query).await.map_err(engine_error)?;
        let batches = df.collect().await.map_err(engine_error)?;

        // First value of the first column of the first batch
        let batch = batches
            .first()
            .ok_or_else(|| ExpectaError::InternalError("No result returned".into()))?;

        if batch.num_rows() == 0 {
            return Err(ExpectaError::InternalError(
                "No scalar value returned".into(),
            ));
        }

        let col = batch.column(0);
        if col.is_null(0) {
            return Ok(0);
        }

        use datafusion::arrow::array::{Int32Array, Int64Array, UInt64Array};

        if let Some(arr) = col.as_any().downcast_ref::<Int64Array>() {
            Ok(arr.value(0).max(0) as u64)
        } else if let Some(arr) = col.as_any().downcast_ref::<Int32Array>() {
            Ok(arr.value(0).max(0) as u64)
        } else if let Some(arr) = col.as_any().downcast_ref::<UInt64Array>() {
            Ok(arr.value(0))
        } else {
            Err(ExpectaError::InternalError(format!(
                "Could not extract scalar value from column type: {}",
                col.data_type()
            )))
        }
    }

    fn engine_name(&self) -> &str {
        "datafusion"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;

    const CSV: &str = "\
transaction_id,customer_id,amount,product_rating
1001,C1,120.5,4
1002,C2,80.0,
1003,C3,99.9,
";

    #[tokio::test]
    async fn test_datafusion_execution_and_schema() -> Result<()> {
        let connector = DataFusionConnector::new();

        connector
            .execute("CREATE TABLE test_users (id INT, name VARCHAR, age INT) AS VALUES (1, 'Alice', 30), (2, 'Bob', 25)")
            .await?;

        let columns = connector.fetch_columns("test_users").await?;
        assert_eq!(columns.len(), 3);

        let id_col = columns
            .iter()
            .find(|c| c.name == "id")
            .ok_or_else(|| anyhow::anyhow!("Column 'id' not found"))?;
        assert_eq!(id_col.data_type, "Int32");
        Ok(())
    }

    #[tokio::test]
    async fn test_register_csv_source() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("transactions.csv");
        fs::write(&path, CSV)?;

        let connector = DataFusionConnector::new();
        let rows = connector.register_source("transactions", &path).await?;
        assert_eq!(rows, 3);

        let columns = connector.fetch_columns("transactions").await?;
        let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["transaction_id", "customer_id", "amount", "product_rating"]
        );

        // Empty fields are loaded as nulls
        let rated = connector
            .query_scalar("SELECT COUNT(\"product_rating\") FROM \"transactions\"")
            .await?;
        assert_eq!(rated, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_register_source_with_other_extension() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("snapshot.txt");
        fs::write(&path, CSV)?;

        let connector = DataFusionConnector::new();
        assert_eq!(connector.register_source("transactions", &path).await?, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_register_replaces_previous_snapshot() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("transactions.csv");
        fs::write(&path, CSV)?;

        let connector = DataFusionConnector::new();
        connector.register_source("transactions", &path).await?;

        fs::write(&path, "transaction_id,amount\n1001,10.0\n")?;
        let rows = connector.register_source("transactions", &path).await?;
        assert_eq!(rows, 1);
        assert_eq!(connector.fetch_columns("transactions").await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_is_data_load_error() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let connector = DataFusionConnector::new();

        let res = connector
            .register_source("transactions", &tmp.path().join("absent.csv"))
            .await;
        assert!(matches!(
            res,
            Err(ExpectaError::Infrastructure(InfrastructureError::DataLoad { .. }))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_datafusion_query_scalar() -> Result<()> {
        let connector = DataFusionConnector::new();

        connector
            .execute("CREATE TABLE counts (id INT) AS VALUES (1), (2), (3)")
            .await?;

        let count = connector
            .query_scalar("SELECT count(*) FROM counts")
            .await?;

        assert_eq!(count, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_datafusion_error() -> Result<()> {
        let connector = DataFusionConnector::new();

        let result = connector.execute("SELECT * FROM non_existent_table").await;
        assert!(result.is_err());
        assert_eq!(connector.engine_name(), "datafusion");
        Ok(())
    }
}
