// expecta-core/src/infrastructure/adapters/file_store.rs

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::domain::result::ValidationResult;
use crate::error::ExpectaError;
use crate::infrastructure::fs::{read_json, write_json};
use crate::ports::results_store::ResultsStore;

/// Results written as JSON documents under
/// `<base>/<suite>/<run_name>/<run_time>/<batch_id>.json`.
pub struct FileResultsStore {
    base_dir: PathBuf,
}

impl FileResultsStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn result_path(&self, result: &ValidationResult) -> PathBuf {
        self.base_dir
            .join(&result.suite)
            .join(&result.run_id.run_name)
            .join(result.run_id.run_time_key())
            .join(format!("{}.json", result.batch_id))
    }
}

impl ResultsStore for FileResultsStore {
    fn store(&self, result: &ValidationResult) -> Result<(), ExpectaError> {
        let path = self.result_path(result);
        write_json(&path, result)?;
        debug!(path = ?path, "Stored validation result");
        Ok(())
    }

    fn list(&self) -> Result<Vec<ValidationResult>, ExpectaError> {
        if !self.base_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut results = Vec::new();
        for entry in WalkDir::new(&self.base_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
        {
            match read_json::<ValidationResult>(entry.path()) {
                Ok(result) => results.push(result),
                Err(e) => warn!(path = ?entry.path(), error = %e, "Skipping unreadable validation result"),
            }
        }
        results.sort_by(|a, b| {
            a.run_id
                .run_time
                .cmp(&b.run_id.run_time)
                .then_with(|| a.validation_definition.cmp(&b.validation_definition))
        });
        Ok(results)
    }

    fn backend_name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::expectation::Expectation;
    use crate::domain::result::{ExpectationResult, ObservedMetrics, RunIdentifier};
    use anyhow::Result;
    use tempfile::tempdir;

    fn result_for(definition: &str, run: &RunIdentifier) -> ValidationResult {
        ValidationResult::new(
            definition,
            definition,
            "pandas-transactions",
            run,
            vec![ExpectationResult::passed(
                Expectation::column_count(6),
                true,
                ObservedMetrics::default(),
            )],
        )
    }

    #[test]
    fn test_layout_and_listing() -> Result<()> {
        let dir = tempdir()?;
        let store = FileResultsStore::new(dir.path().join("validations"));
        let run = RunIdentifier::now("Quality");

        store.store(&result_for("schema", &run))?;
        store.store(&result_for("distribution", &run))?;

        let expected = dir
            .path()
            .join("validations/schema/Quality")
            .join(run.run_time_key())
            .join("pandas-transactions.json");
        assert!(expected.is_file());

        let listed = store.list()?;
        let names: Vec<_> = listed
            .iter()
            .map(|r| r.validation_definition.as_str())
            .collect();
        assert_eq!(names, vec!["distribution", "schema"]);
        Ok(())
    }

    #[test]
    fn test_empty_store_lists_nothing() -> Result<()> {
        let dir = tempdir()?;
        let store = FileResultsStore::new(dir.path().join("absent"));
        assert!(store.list()?.is_empty());
        assert_eq!(store.backend_name(), "file");
        Ok(())
    }

    #[test]
    fn test_unreadable_result_is_skipped() -> Result<()> {
        let dir = tempdir()?;
        let store = FileResultsStore::new(dir.path().join("validations"));
        let run = RunIdentifier::now("Quality");
        store.store(&result_for("volume", &run))?;

        let corrupt = dir.path().join("validations/volume/Quality/broken.json");
        std::fs::write(&corrupt, "{ not json")?;

        let listed = store.list()?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].validation_definition, "volume");
        Ok(())
    }
}
