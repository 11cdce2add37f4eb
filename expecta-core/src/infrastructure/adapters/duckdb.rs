// expecta-core/src/infrastructure/adapters/duckdb.rs

use duckdb::{Config, Connection, params};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

use crate::domain::result::ValidationResult;
use crate::error::ExpectaError;
use crate::infrastructure::config::environment::validate_identifier;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::results_store::ResultsStore;

pub const DUCKDB_SCHEME: &str = "duckdb://";
const IN_MEMORY: &str = ":memory:";

/// Relational results store. One row per validation result; the full
/// result is kept as a JSON payload next to a few queryable columns.
pub struct DuckDbResultsStore {
    conn: Arc<Mutex<Connection>>,
    table: String,
}

impl DuckDbResultsStore {
    /// Opens `duckdb://<path>` (or `duckdb://:memory:`) and ensures the table exists.
    pub fn connect(connection_string: &str, table: &str) -> Result<Self, InfrastructureError> {
        validate_identifier(table)?;
        let db_path = connection_string.strip_prefix(DUCKDB_SCHEME).ok_or_else(|| {
            InfrastructureError::ConfigError(format!(
                "unsupported results store connection string (expected {DUCKDB_SCHEME}<path>)"
            ))
        })?;
        if db_path.is_empty() {
            return Err(InfrastructureError::ConfigError(
                "results store connection string has no database path".into(),
            ));
        }

        let config = Config::default();
        let conn = if db_path == IN_MEMORY {
            Connection::open_in_memory_with_flags(config)?
        } else {
            Connection::open_with_flags(db_path, config)?
        };

        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                run_name VARCHAR NOT NULL,
                run_time VARCHAR NOT NULL,
                validation_definition VARCHAR NOT NULL,
                suite VARCHAR NOT NULL,
                success BOOLEAN NOT NULL,
                payload VARCHAR NOT NULL
            )"
        ))?;
        info!(table, in_memory = db_path == IN_MEMORY, "Connected results store");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            table: table.to_string(),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, ExpectaError> {
        self.conn.lock().map_err(|_| {
            ExpectaError::Infrastructure(InfrastructureError::Io(std::io::Error::other(
                "DuckDB Mutex Poisoned",
            )))
        })
    }
}

fn db_error(e: duckdb::Error) -> ExpectaError {
    ExpectaError::Infrastructure(InfrastructureError::Database(DatabaseError::DuckDB(e)))
}

impl ResultsStore for DuckDbResultsStore {
    fn store(&self, result: &ValidationResult) -> Result<(), ExpectaError> {
        let payload = serde_json::to_string(result).map_err(InfrastructureError::from)?;
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (run_name, run_time, validation_definition, suite, success, payload) VALUES (?, ?, ?, ?, ?, ?)",
                self.table
            ),
            params![
                result.run_id.run_name,
                result.run_id.run_time_key(),
                result.validation_definition,
                result.suite,
                result.success,
                payload
            ],
        )
        .map_err(db_error)?;
        debug!(table = %self.table, definition = %result.validation_definition, "Stored validation result");
        Ok(())
    }

    fn list(&self) -> Result<Vec<ValidationResult>, ExpectaError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT payload FROM {} ORDER BY run_time, validation_definition",
                self.table
            ))
            .map_err(db_error)?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(db_error)?;

        let mut results = Vec::new();
        for row in rows {
            let payload = row.map_err(db_error)?;
            let result: ValidationResult =
                serde_json::from_str(&payload).map_err(InfrastructureError::from)?;
            results.push(result);
        }
        Ok(results)
    }

    fn backend_name(&self) -> &str {
        "duckdb"
    }
}
