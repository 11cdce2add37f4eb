// expecta-core/src/domain/context.rs

// Declarative model of a validation project: what the initializer writes
// and what the runner reads back.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::domain::error::DomainError;

pub const DEFAULT_SITE_NAME: &str = "local_site";
pub const DATA_DOCS_ROOT: &str = "uncommitted/data_docs";
pub const VALIDATIONS_ROOT: &str = "uncommitted/validations";
pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceKind {
    /// Tables are handed over in memory at run time.
    #[default]
    InMemory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Partitioner {
    #[default]
    WholeTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchDefinition {
    pub name: String,
    #[serde(default)]
    pub partitioner: Partitioner,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataAsset {
    pub name: String,
    #[serde(default)]
    pub batch_definitions: Vec<BatchDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub name: String,
    #[serde(default)]
    pub kind: DataSourceKind,
    #[serde(default)]
    pub assets: Vec<DataAsset>,
}

/// Reference from a validation definition to its batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRef {
    pub data_source: String,
    pub asset: String,
    pub batch_definition: String,
}

impl BatchRef {
    /// Stable identifier used in result keys.
    pub fn batch_id(&self) -> String {
        format!("{}-{}", self.data_source, self.asset)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationDefinition {
    pub name: String,
    pub data: BatchRef,
    pub suite: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotifyOn {
    #[default]
    All,
    Failure,
    Success,
}

impl NotifyOn {
    pub fn should_notify(&self, success: bool) -> bool {
        match self {
            NotifyOn::All => true,
            NotifyOn::Failure => !success,
            NotifyOn::Success => success,
        }
    }
}

impl FromStr for NotifyOn {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(NotifyOn::All),
            "failure" => Ok(NotifyOn::Failure),
            "success" => Ok(NotifyOn::Success),
            other => Err(DomainError::InvalidBlueprint(format!(
                "unknown notification policy '{other}' (expected all, failure or success)"
            ))),
        }
    }
}

/// Post-run side effect attached to a checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckpointAction {
    UpdateDataDocs { site_names: Vec<String> },
    Notify { on: NotifyOn },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub name: String,
    pub validation_definitions: Vec<String>,
    #[serde(default)]
    pub actions: Vec<CheckpointAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDocsSite {
    /// Directory relative to the context root.
    pub base_directory: String,
}

impl DataDocsSite {
    pub fn for_name(site_name: &str) -> Self {
        Self {
            base_directory: format!("{DATA_DOCS_ROOT}/{site_name}"),
        }
    }
}

/// Where validation results are persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    File {
        base_directory: String,
    },
    /// Values may hold `${VAR}` placeholders resolved at run time.
    Sql {
        connection_string: String,
        table: String,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::File {
            base_directory: VALIDATIONS_ROOT.to_string(),
        }
    }
}

/// Root descriptor persisted as `expecta.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextDescriptor {
    pub config_version: u32,
    #[serde(default)]
    pub analytics_enabled: bool,
    #[serde(default)]
    pub data_sources: Vec<DataSource>,
    #[serde(default)]
    pub data_docs_sites: BTreeMap<String, DataDocsSite>,
    #[serde(default)]
    pub validation_results_store: StoreConfig,
    /// Checkpoint names in registration order, which is the run order.
    #[serde(default)]
    pub checkpoints: Vec<String>,
}

impl Default for ContextDescriptor {
    fn default() -> Self {
        let mut sites = BTreeMap::new();
        sites.insert(
            DEFAULT_SITE_NAME.to_string(),
            DataDocsSite::for_name(DEFAULT_SITE_NAME),
        );
        Self {
            config_version: CONFIG_VERSION,
            analytics_enabled: false,
            data_sources: Vec::new(),
            data_docs_sites: sites,
            validation_results_store: StoreConfig::default(),
            checkpoints: Vec::new(),
        }
    }
}

impl ContextDescriptor {
    pub fn data_source(&self, name: &str) -> Option<&DataSource> {
        self.data_sources.iter().find(|s| s.name == name)
    }

    pub fn asset_names(&self, data_source: &str) -> Vec<String> {
        self.data_source(data_source)
            .map(|s| s.assets.iter().map(|a| a.name.clone()).collect())
            .unwrap_or_default()
    }

    /// The project's data asset. None unless exactly one asset is registered.
    pub fn single_asset(&self) -> Option<&str> {
        let mut assets = self.data_sources.iter().flat_map(|s| s.assets.iter());
        match (assets.next(), assets.next()) {
            (Some(asset), None) => Some(asset.name.as_str()),
            _ => None,
        }
    }

    /// True when the reference points to a registered batch definition.
    pub fn resolves(&self, batch: &BatchRef) -> bool {
        self.data_source(&batch.data_source)
            .and_then(|s| s.assets.iter().find(|a| a.name == batch.asset))
            .is_some_and(|a| {
                a.batch_definitions
                    .iter()
                    .any(|b| b.name == batch.batch_definition)
            })
    }
}

/// Names become file names in the context directory.
pub fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name == "."
        || name == ".."
    {
        return Err(DomainError::InvalidName(name.to_string()));
    }
    Ok(())
}
