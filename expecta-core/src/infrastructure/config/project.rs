// expecta-core/src/infrastructure/config/project.rs

use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::domain::blueprint::Blueprint;
use crate::domain::context::ContextDescriptor;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::read_yaml;

pub const DEFAULT_PROJECT_DIR: &str = "quality";
pub const DEFAULT_DATA_PATH: &str = "Data/transactions.csv";
pub const CONTEXT_DIR_NAME: &str = "gx";
pub const DESCRIPTOR_FILE: &str = "expecta.yml";

/// Filesystem layout of a validation project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub project_root: PathBuf,
}

impl Default for ProjectPaths {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT_DIR)
    }
}

impl ProjectPaths {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    /// Root of everything the initializer writes.
    pub fn context_dir(&self) -> PathBuf {
        self.project_root.join(CONTEXT_DIR_NAME)
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.context_dir().join(DESCRIPTOR_FILE)
    }

    pub fn expectations_dir(&self) -> PathBuf {
        self.context_dir().join("expectations")
    }

    pub fn validation_definitions_dir(&self) -> PathBuf {
        self.context_dir().join("validation_definitions")
    }

    pub fn checkpoints_dir(&self) -> PathBuf {
        self.context_dir().join("checkpoints")
    }

    /// Resolves a path declared relative to the context directory.
    pub fn in_context(&self, relative: &str) -> PathBuf {
        self.context_dir().join(relative)
    }
}

/// Loads the project descriptor written by the initializer.
///
/// A missing directory, a missing file and an unreadable file are all
/// reported as `ContextNotFound`: the runner never repairs a project.
#[instrument(skip(paths), fields(root = ?paths.project_root))]
pub fn load_context_descriptor(
    paths: &ProjectPaths,
) -> Result<ContextDescriptor, InfrastructureError> {
    let context_dir = paths.context_dir();
    if !context_dir.is_dir() {
        return Err(InfrastructureError::ContextNotFound(format!(
            "directory {context_dir:?} does not exist"
        )));
    }

    let descriptor_path = paths.descriptor_path();
    if !descriptor_path.is_file() {
        return Err(InfrastructureError::ContextNotFound(format!(
            "descriptor {descriptor_path:?} is missing"
        )));
    }

    let descriptor: ContextDescriptor = read_yaml(&descriptor_path).map_err(|e| {
        InfrastructureError::ContextNotFound(format!(
            "descriptor {descriptor_path:?} is corrupt: {e}"
        ))
    })?;
    info!(path = ?descriptor_path, "Loaded project descriptor");
    Ok(descriptor)
}

/// Loads a blueprint from a YAML file. Validation is left to the caller.
pub fn load_blueprint(path: &Path) -> Result<Blueprint, InfrastructureError> {
    if !path.is_file() {
        return Err(InfrastructureError::ConfigError(format!(
            "blueprint file {path:?} not found"
        )));
    }
    read_yaml(path)
}
