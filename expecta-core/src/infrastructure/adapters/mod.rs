// expecta-core/src/infrastructure/adapters/mod.rs

pub mod datafusion;
pub mod duckdb;
pub mod file_store;

use tracing::info;

use crate::domain::context::StoreConfig;
use crate::error::ExpectaError;
use crate::infrastructure::config::environment::resolve_placeholders;
use crate::infrastructure::config::project::ProjectPaths;
use crate::ports::results_store::ResultsStore;

pub use self::datafusion::DataFusionConnector;
pub use self::duckdb::DuckDbResultsStore;
pub use self::file_store::FileResultsStore;

/// Builds the results store declared in the project descriptor.
/// Placeholders in SQL settings are resolved from the environment here.
pub fn open_results_store(
    paths: &ProjectPaths,
    config: &StoreConfig,
) -> Result<Box<dyn ResultsStore>, ExpectaError> {
    let store: Box<dyn ResultsStore> = match config {
        StoreConfig::File { base_directory } => {
            Box::new(FileResultsStore::new(paths.in_context(base_directory)))
        }
        StoreConfig::Sql {
            connection_string,
            table,
        } => {
            let connection_string = resolve_placeholders(connection_string)?;
            let table = resolve_placeholders(table)?;
            Box::new(DuckDbResultsStore::connect(&connection_string, &table)?)
        }
    };
    info!(backend = store.backend_name(), "Opened results store");
    Ok(store)
}
