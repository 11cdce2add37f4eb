// expecta-core/src/application/initializer.rs

// Provisions a validation project from a Blueprint. Idempotence is
// existence based: when the context directory is present nothing is
// touched, whatever it contains.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, instrument};

use crate::domain::blueprint::Blueprint;
use crate::domain::context::{
    Checkpoint, CheckpointAction, DataDocsSite, NotifyOn, StoreConfig, ValidationDefinition,
    validate_name,
};
use crate::domain::error::DomainError;
use crate::error::ExpectaError;
use crate::infrastructure::config::environment::{
    RESULTS_STORE_TABLE_VAR, RESULTS_STORE_URL_VAR, ResultsStoreEnv, placeholder,
};
use crate::infrastructure::config::project::ProjectPaths;
use crate::infrastructure::context::FileDataContext;
use crate::infrastructure::fs::remove_tree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitMode {
    /// Provision only when no context exists yet.
    #[default]
    Init,
    /// Delete any existing context, then provision.
    Recreate,
}

impl FromStr for InitMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "init" => Ok(InitMode::Init),
            "recreate" => Ok(InitMode::Recreate),
            other => Err(DomainError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for InitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitMode::Init => write!(f, "init"),
            InitMode::Recreate => write!(f, "recreate"),
        }
    }
}

/// Optional project features, all off by default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitOptions {
    /// Extra data docs site, rebuilt by every checkpoint.
    pub docs_site: Option<String>,
    /// Persist results in the relational store configured by the environment.
    pub results_store: bool,
    /// Log a notification after each checkpoint according to this policy.
    pub notify: Option<NotifyOn>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionSummary {
    pub context_dir: PathBuf,
    pub suites: Vec<String>,
    pub checkpoints: Vec<String>,
    pub data_docs_sites: Vec<String>,
    pub results_store: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Provisioned(ProvisionSummary),
    AlreadyInitialized,
}

#[instrument(skip_all, fields(root = ?paths.project_root, mode = %mode))]
pub fn initialize(
    paths: &ProjectPaths,
    mode: InitMode,
    blueprint: &Blueprint,
    options: &InitOptions,
) -> Result<InitOutcome, ExpectaError> {
    let context_dir = paths.context_dir();

    if mode == InitMode::Recreate && context_dir.exists() {
        info!(dir = ?context_dir, "Removing existing project context");
        remove_tree(&context_dir)?;
    }

    if context_dir.exists() {
        info!(dir = ?context_dir, "Project context already exists, nothing to do");
        return Ok(InitOutcome::AlreadyInitialized);
    }

    // Everything that can fail on configuration fails before the directory exists
    blueprint.validate()?;
    if let Some(site) = &options.docs_site {
        validate_name(site)?;
    }
    if options.results_store {
        ResultsStoreEnv::from_env()?;
    }

    let summary = provision(paths, blueprint, options)?;
    info!(
        suites = summary.suites.len(),
        checkpoints = summary.checkpoints.len(),
        "Project provisioned"
    );
    Ok(InitOutcome::Provisioned(summary))
}

fn provision(
    paths: &ProjectPaths,
    blueprint: &Blueprint,
    options: &InitOptions,
) -> Result<ProvisionSummary, ExpectaError> {
    // 1. Context
    let mut context = FileDataContext::create(paths)?;
    context.enable_analytics(false)?;

    // 2. Optional features
    let mut actions = Vec::new();
    if let Some(site) = &options.docs_site {
        context.add_data_docs_site(site, DataDocsSite::for_name(site))?;
        actions.push(CheckpointAction::UpdateDataDocs {
            site_names: vec![site.clone()],
        });
    }
    if options.results_store {
        context.set_results_store(StoreConfig::Sql {
            connection_string: placeholder(RESULTS_STORE_URL_VAR),
            table: placeholder(RESULTS_STORE_TABLE_VAR),
        })?;
    }
    if let Some(on) = options.notify {
        actions.push(CheckpointAction::Notify { on });
    }

    // 3. Data source -> asset -> batch definition
    context.add_data_source(&blueprint.data_source)?;
    context.add_data_asset(&blueprint.data_source, &blueprint.asset)?;
    let batch = context.add_batch_definition(
        &blueprint.data_source,
        &blueprint.asset,
        &blueprint.batch_definition,
    )?;

    // 4. Suites, each bound to the batch by a definition of the same name
    for suite in &blueprint.suites {
        context.add_suite(suite)?;
        context.add_validation_definition(&ValidationDefinition {
            name: suite.name.clone(),
            data: batch.clone(),
            suite: suite.name.clone(),
        })?;
    }

    // 5. Checkpoints
    for checkpoint in &blueprint.checkpoints {
        context.add_checkpoint(&Checkpoint {
            name: checkpoint.name.clone(),
            validation_definitions: checkpoint.validation_definitions.clone(),
            actions: actions.clone(),
        })?;
    }

    Ok(ProvisionSummary {
        context_dir: paths.context_dir(),
        suites: blueprint.suite_names(),
        checkpoints: blueprint.checkpoint_names(),
        data_docs_sites: context.data_docs_sites().keys().cloned().collect(),
        results_store: match context.results_store_config() {
            StoreConfig::File { .. } => "file",
            StoreConfig::Sql { .. } => "sql",
        },
    })
}
