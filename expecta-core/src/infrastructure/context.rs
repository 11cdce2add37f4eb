// expecta-core/src/infrastructure/context.rs

// File-backed project context. Every registration is written to disk
// immediately, so the directory always mirrors what has been declared.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::context::{
    BatchDefinition, BatchRef, Checkpoint, ContextDescriptor, DataAsset, DataDocsSite, DataSource,
    DataSourceKind, Partitioner, StoreConfig, ValidationDefinition, validate_name,
};
use crate::domain::error::DomainError;
use crate::domain::suite::ExpectationSuite;
use crate::error::ExpectaError;
use crate::infrastructure::config::project::{ProjectPaths, load_context_descriptor};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::{ensure_dir, read_yaml, write_yaml};

const DECLARATION_EXTENSION: &str = "yml";

pub struct FileDataContext {
    paths: ProjectPaths,
    descriptor: ContextDescriptor,
}

impl FileDataContext {
    /// Creates the context directory and writes a default descriptor.
    pub fn create(paths: &ProjectPaths) -> Result<Self, ExpectaError> {
        ensure_dir(&paths.context_dir())?;
        for dir in [
            paths.expectations_dir(),
            paths.validation_definitions_dir(),
            paths.checkpoints_dir(),
        ] {
            ensure_dir(&dir)?;
        }

        let context = Self {
            paths: paths.clone(),
            descriptor: ContextDescriptor::default(),
        };
        context.save()?;
        info!(dir = ?paths.context_dir(), "Created project context");
        Ok(context)
    }

    /// Attaches to an existing context. Never creates anything.
    pub fn open(paths: &ProjectPaths) -> Result<Self, ExpectaError> {
        let descriptor = load_context_descriptor(paths)?;
        Ok(Self {
            paths: paths.clone(),
            descriptor,
        })
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.paths
    }

    pub fn descriptor(&self) -> &ContextDescriptor {
        &self.descriptor
    }

    pub fn data_docs_sites(&self) -> &BTreeMap<String, DataDocsSite> {
        &self.descriptor.data_docs_sites
    }

    pub fn results_store_config(&self) -> &StoreConfig {
        &self.descriptor.validation_results_store
    }

    fn save(&self) -> Result<(), ExpectaError> {
        write_yaml(&self.paths.descriptor_path(), &self.descriptor)?;
        Ok(())
    }

    // --- PROJECT SETTINGS ---

    pub fn enable_analytics(&mut self, enable: bool) -> Result<(), ExpectaError> {
        self.descriptor.analytics_enabled = enable;
        self.save()
    }

    pub fn add_data_docs_site(&mut self, name: &str, site: DataDocsSite) -> Result<(), ExpectaError> {
        validate_name(name)?;
        debug!(site = name, base_directory = %site.base_directory, "Registering data docs site");
        self.descriptor
            .data_docs_sites
            .insert(name.to_string(), site);
        self.save()
    }

    pub fn set_results_store(&mut self, store: StoreConfig) -> Result<(), ExpectaError> {
        self.descriptor.validation_results_store = store;
        self.save()
    }

    // --- DATA SOURCES ---

    pub fn add_data_source(&mut self, name: &str) -> Result<(), ExpectaError> {
        validate_name(name)?;
        self.descriptor.data_sources.push(DataSource {
            name: name.to_string(),
            kind: DataSourceKind::InMemory,
            assets: Vec::new(),
        });
        self.save()
    }

    pub fn add_data_asset(&mut self, source: &str, asset: &str) -> Result<(), ExpectaError> {
        validate_name(asset)?;
        let data_source = self
            .descriptor
            .data_sources
            .iter_mut()
            .find(|s| s.name == source)
            .ok_or_else(|| unknown_reference("data source", source))?;
        data_source.assets.push(DataAsset {
            name: asset.to_string(),
            batch_definitions: Vec::new(),
        });
        self.save()
    }

    /// Registers a whole-table batch definition and returns the reference to it.
    pub fn add_batch_definition(
        &mut self,
        source: &str,
        asset: &str,
        batch: &str,
    ) -> Result<BatchRef, ExpectaError> {
        validate_name(batch)?;
        let data_asset = self
            .descriptor
            .data_sources
            .iter_mut()
            .find(|s| s.name == source)
            .and_then(|s| s.assets.iter_mut().find(|a| a.name == asset))
            .ok_or_else(|| unknown_reference("data asset", asset))?;
        data_asset.batch_definitions.push(BatchDefinition {
            name: batch.to_string(),
            partitioner: Partitioner::WholeTable,
        });
        self.save()?;
        Ok(BatchRef {
            data_source: source.to_string(),
            asset: asset.to_string(),
            batch_definition: batch.to_string(),
        })
    }

    // --- SUITES ---

    pub fn add_suite(&self, suite: &ExpectationSuite) -> Result<(), ExpectaError> {
        validate_name(&suite.name)?;
        suite.validate()?;
        write_yaml(&self.declaration_path(&self.paths.expectations_dir(), &suite.name), suite)?;
        debug!(suite = %suite.name, rules = suite.expectations.len(), "Registered suite");
        Ok(())
    }

    pub fn get_suite(&self, name: &str) -> Result<ExpectationSuite, ExpectaError> {
        self.read_declaration(&self.paths.expectations_dir(), name)?
            .ok_or_else(|| DomainError::SuiteNotFound(name.to_string()).into())
    }

    pub fn list_suites(&self) -> Result<Vec<String>, ExpectaError> {
        list_declarations(&self.paths.expectations_dir())
    }

    // --- VALIDATION DEFINITIONS ---

    pub fn add_validation_definition(
        &self,
        definition: &ValidationDefinition,
    ) -> Result<(), ExpectaError> {
        validate_name(&definition.name)?;
        if !self.descriptor.resolves(&definition.data) {
            return Err(unknown_reference("batch definition", &definition.data.batch_definition));
        }
        // The suite must already be registered.
        self.get_suite(&definition.suite)?;
        write_yaml(
            &self.declaration_path(&self.paths.validation_definitions_dir(), &definition.name),
            definition,
        )?;
        debug!(definition = %definition.name, suite = %definition.suite, "Registered validation definition");
        Ok(())
    }

    pub fn get_validation_definition(
        &self,
        name: &str,
    ) -> Result<ValidationDefinition, ExpectaError> {
        self.read_declaration(&self.paths.validation_definitions_dir(), name)?
            .ok_or_else(|| DomainError::ValidationDefinitionNotFound(name.to_string()).into())
    }

    pub fn list_validation_definitions(&self) -> Result<Vec<String>, ExpectaError> {
        list_declarations(&self.paths.validation_definitions_dir())
    }

    // --- CHECKPOINTS ---

    pub fn add_checkpoint(&mut self, checkpoint: &Checkpoint) -> Result<(), ExpectaError> {
        validate_name(&checkpoint.name)?;
        for name in &checkpoint.validation_definitions {
            self.get_validation_definition(name)?;
        }
        write_yaml(
            &self.declaration_path(&self.paths.checkpoints_dir(), &checkpoint.name),
            checkpoint,
        )?;
        if !self.descriptor.checkpoints.contains(&checkpoint.name) {
            self.descriptor.checkpoints.push(checkpoint.name.clone());
            self.save()?;
        }
        debug!(checkpoint = %checkpoint.name, "Registered checkpoint");
        Ok(())
    }

    pub fn get_checkpoint(&self, name: &str) -> Result<Checkpoint, ExpectaError> {
        self.read_declaration(&self.paths.checkpoints_dir(), name)?
            .ok_or_else(|| DomainError::CheckpointNotFound(name.to_string()).into())
    }

    pub fn list_checkpoints(&self) -> Result<Vec<String>, ExpectaError> {
        list_declarations(&self.paths.checkpoints_dir())
    }

    /// Checkpoints in the order they were registered. Falls back to the
    /// sorted declarations for descriptors that carry no order.
    pub fn checkpoint_order(&self) -> Result<Vec<String>, ExpectaError> {
        if self.descriptor.checkpoints.is_empty() {
            return self.list_checkpoints();
        }
        Ok(self.descriptor.checkpoints.clone())
    }

    /// Name of the table the snapshot is loaded into.
    pub fn data_asset(&self) -> Result<&str, ExpectaError> {
        self.descriptor.single_asset().ok_or_else(|| {
            InfrastructureError::ConfigError(format!(
                "project at {} must declare exactly one data asset",
                self.paths.context_dir().display()
            ))
            .into()
        })
    }

    // --- HELPERS ---

    fn declaration_path(&self, dir: &Path, name: &str) -> PathBuf {
        dir.join(format!("{name}.{DECLARATION_EXTENSION}"))
    }

    fn read_declaration<T: serde::de::DeserializeOwned>(
        &self,
        dir: &Path,
        name: &str,
    ) -> Result<Option<T>, ExpectaError> {
        validate_name(name)?;
        let path = self.declaration_path(dir, name);
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(read_yaml(&path)?))
    }
}

fn unknown_reference(kind: &str, name: &str) -> ExpectaError {
    InfrastructureError::ConfigError(format!("unknown {kind} '{name}'")).into()
}

/// Sorted declaration names found in a directory.
fn list_declarations(dir: &Path) -> Result<Vec<String>, ExpectaError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext == DECLARATION_EXTENSION)
            && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
        {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::expectation::Expectation;
    use anyhow::Result;
    use tempfile::tempdir;

    fn context_with_batch(paths: &ProjectPaths) -> Result<(FileDataContext, BatchRef)> {
        let mut context = FileDataContext::create(paths)?;
        context.add_data_source("pandas")?;
        context.add_data_asset("pandas", "transactions")?;
        let batch = context.add_batch_definition("pandas", "transactions", "transactions batch")?;
        Ok((context, batch))
    }

    #[test]
    fn test_create_and_reopen() -> Result<()> {
        let dir = tempdir()?;
        let paths = ProjectPaths::new(dir.path().join("quality"));
        let (context, _) = context_with_batch(&paths)?;
        assert!(paths.descriptor_path().is_file());

        let reopened = FileDataContext::open(&paths)?;
        assert_eq!(reopened.descriptor(), context.descriptor());
        assert_eq!(
            reopened.descriptor().asset_names("pandas"),
            vec!["transactions".to_string()]
        );
        Ok(())
    }

    #[test]
    fn test_open_missing_context() -> Result<()> {
        let dir = tempdir()?;
        let paths = ProjectPaths::new(dir.path().join("quality"));
        match FileDataContext::open(&paths) {
            Err(e) => assert!(e.is_context_not_found()),
            Ok(_) => anyhow::bail!("opening a missing context must fail"),
        }
        Ok(())
    }

    #[test]
    fn test_suite_and_definition_registration() -> Result<()> {
        let dir = tempdir()?;
        let paths = ProjectPaths::new(dir.path());
        let (context, batch) = context_with_batch(&paths)?;

        let suite = ExpectationSuite::with_expectations("volume", vec![Expectation::row_count(21)]);
        context.add_suite(&suite)?;
        context.add_validation_definition(&ValidationDefinition {
            name: "volume".into(),
            data: batch,
            suite: "volume".into(),
        })?;

        assert_eq!(context.get_suite("volume")?, suite);
        assert_eq!(context.list_suites()?, vec!["volume".to_string()]);
        assert_eq!(
            context.get_validation_definition("volume")?.data.batch_definition,
            "transactions batch"
        );
        Ok(())
    }

    #[test]
    fn test_lookup_errors() -> Result<()> {
        let dir = tempdir()?;
        let paths = ProjectPaths::new(dir.path());
        let (mut context, batch) = context_with_batch(&paths)?;

        assert!(matches!(
            context.get_suite("freshness"),
            Err(ExpectaError::Domain(DomainError::SuiteNotFound(_)))
        ));
        assert!(matches!(
            context.get_checkpoint("nightly"),
            Err(ExpectaError::Domain(DomainError::CheckpointNotFound(_)))
        ));

        // Definition referencing an unregistered suite
        let res = context.add_validation_definition(&ValidationDefinition {
            name: "distribution".into(),
            data: batch,
            suite: "distribution".into(),
        });
        assert!(matches!(
            res,
            Err(ExpectaError::Domain(DomainError::SuiteNotFound(_)))
        ));

        // Checkpoint referencing an unregistered definition
        let res = context.add_checkpoint(&Checkpoint {
            name: "statistical_checkpoint".into(),
            validation_definitions: vec!["distribution".into()],
            actions: vec![],
        });
        assert!(matches!(
            res,
            Err(ExpectaError::Domain(DomainError::ValidationDefinitionNotFound(_)))
        ));
        Ok(())
    }

    #[test]
    fn test_dangling_batch_reference_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let paths = ProjectPaths::new(dir.path());
        let (context, batch) = context_with_batch(&paths)?;
        context.add_suite(&ExpectationSuite::new("volume"))?;

        let res = context.add_validation_definition(&ValidationDefinition {
            name: "volume".into(),
            data: BatchRef {
                batch_definition: "monthly batch".into(),
                ..batch
            },
            suite: "volume".into(),
        });
        assert!(res.is_err());
        Ok(())
    }

    #[test]
    fn test_checkpoints_keep_registration_order() -> Result<()> {
        let dir = tempdir()?;
        let paths = ProjectPaths::new(dir.path());
        let (mut context, batch) = context_with_batch(&paths)?;
        assert_eq!(context.data_asset()?, "transactions");

        context.add_suite(&ExpectationSuite::new("volume"))?;
        context.add_validation_definition(&ValidationDefinition {
            name: "volume".into(),
            data: batch,
            suite: "volume".into(),
        })?;
        for name in ["statistical_checkpoint", "completeness_checkpoint"] {
            context.add_checkpoint(&Checkpoint {
                name: name.into(),
                validation_definitions: vec!["volume".into()],
                actions: vec![],
            })?;
        }

        let reopened = FileDataContext::open(&paths)?;
        assert_eq!(
            reopened.checkpoint_order()?,
            vec!["statistical_checkpoint", "completeness_checkpoint"]
        );
        assert_eq!(
            reopened.list_checkpoints()?,
            vec!["completeness_checkpoint", "statistical_checkpoint"]
        );
        Ok(())
    }

    #[test]
    fn test_data_asset_requires_one_asset() -> Result<()> {
        let dir = tempdir()?;
        let context = FileDataContext::create(&ProjectPaths::new(dir.path()))?;
        assert!(matches!(
            context.data_asset(),
            Err(ExpectaError::Infrastructure(InfrastructureError::ConfigError(_)))
        ));
        Ok(())
    }
}
