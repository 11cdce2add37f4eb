// expecta-core/src/application/runner.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{error, info, instrument, warn};

use crate::application::checkpoint::{CheckpointServices, run_checkpoint};
use crate::application::docs::{DocsSiteUrl, build_data_docs};
use crate::application::ports::TemplateEngine;
use crate::application::validation::validate_suite;
use crate::domain::result::{CheckpointResult, DEFAULT_RUN_NAME, RunIdentifier, ValidationResult};
use crate::error::ExpectaError;
use crate::infrastructure::adapters::open_results_store;
use crate::infrastructure::config::project::{DEFAULT_DATA_PATH, ProjectPaths};
use crate::infrastructure::context::FileDataContext;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::connector::Connector;

/// One execution against one data file.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub paths: ProjectPaths,
    pub data_path: PathBuf,
    pub run_name: String,
    /// Checkpoints to run, in order. Empty runs every checkpoint the project
    /// declares, in registration order.
    pub checkpoints: Vec<String>,
}

impl Default for RunRequest {
    fn default() -> Self {
        Self {
            paths: ProjectPaths::default(),
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            run_name: DEFAULT_RUN_NAME.to_string(),
            checkpoints: Vec::new(),
        }
    }
}

impl RunRequest {
    pub fn new(paths: ProjectPaths, data_path: impl Into<PathBuf>) -> Self {
        Self {
            paths,
            data_path: data_path.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: RunIdentifier,
    /// AND of every checkpoint verdict.
    pub success: bool,
    pub checkpoints: Vec<CheckpointResult>,
    pub docs: Vec<DocsSiteUrl>,
}

impl RunOutcome {
    pub fn docs_url(&self) -> Option<&str> {
        self.docs.first().map(|d| d.site_url.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ValidateOutcome {
    pub run_id: RunIdentifier,
    /// Results by validation definition name. Missing definitions are absent.
    pub results: BTreeMap<String, ValidationResult>,
    pub skipped: Vec<String>,
    pub docs: Vec<DocsSiteUrl>,
}

impl ValidateOutcome {
    pub fn success(&self) -> bool {
        self.results.values().all(|r| r.success)
    }
}

/// Opens the project read-only, then loads the snapshot into a table named
/// after the project's data asset. Nothing is evaluated or written when the
/// file cannot be loaded.
async fn prepare(
    connector: &dyn Connector,
    request: &RunRequest,
) -> Result<FileDataContext, ExpectaError> {
    let context = FileDataContext::open(&request.paths)?;
    connector
        .register_source(context.data_asset()?, &request.data_path)
        .await?;
    Ok(context)
}

/// Runs the checkpoints in order under a single run identifier, then
/// rebuilds every data docs site.
#[instrument(skip_all, fields(root = ?request.paths.project_root, data = ?request.data_path))]
pub async fn run_checkpoints(
    connector: &dyn Connector,
    renderer: &dyn TemplateEngine,
    request: &RunRequest,
) -> Result<RunOutcome, ExpectaError> {
    let context = prepare(connector, request).await?;
    let names = if request.checkpoints.is_empty() {
        context.checkpoint_order()?
    } else {
        request.checkpoints.clone()
    };
    if names.is_empty() {
        return Err(InfrastructureError::ConfigError(
            "project declares no checkpoints".to_string(),
        )
        .into());
    }
    let run_id = RunIdentifier::now(&request.run_name);
    let store = open_results_store(context.paths(), context.results_store_config())?;
    info!(run = %run_id, engine = connector.engine_name(), checkpoints = ?names, "Starting validation run");

    let services = CheckpointServices {
        connector,
        store: store.as_ref(),
        renderer,
    };

    let mut checkpoints = Vec::with_capacity(names.len());
    for name in &names {
        checkpoints.push(run_checkpoint(&context, &services, name, &run_id).await?);
    }
    let success = checkpoints.iter().all(|c| c.success);

    // Reports are built whatever the verdict
    let docs = build_data_docs(&context, store.as_ref(), renderer, &[])?;
    let outcome = RunOutcome {
        run_id,
        success,
        checkpoints,
        docs,
    };

    if outcome.success {
        info!(run = %outcome.run_id, docs = ?outcome.docs_url(), "Validation run passed");
    } else {
        warn!(run = %outcome.run_id, docs = ?outcome.docs_url(), "Validation run failed");
    }
    Ok(outcome)
}

/// Runs validation definitions one by one. Unknown names are logged and
/// skipped; an empty list selects every registered definition.
#[instrument(skip_all, fields(root = ?request.paths.project_root))]
pub async fn validate_definitions(
    connector: &dyn Connector,
    renderer: &dyn TemplateEngine,
    request: &RunRequest,
    names: &[String],
) -> Result<ValidateOutcome, ExpectaError> {
    let context = prepare(connector, request).await?;
    let run_id = RunIdentifier::now(&request.run_name);
    let store = open_results_store(context.paths(), context.results_store_config())?;

    let names = if names.is_empty() {
        context.list_validation_definitions()?
    } else {
        names.to_vec()
    };

    let mut results = BTreeMap::new();
    let mut skipped = Vec::new();
    for name in names {
        let lookup = context
            .get_validation_definition(&name)
            .and_then(|definition| {
                let suite = context.get_suite(&definition.suite)?;
                Ok((definition, suite))
            });
        let (definition, suite) = match lookup {
            Ok(found) => found,
            Err(e) => {
                error!(definition = %name, error = %e, "Skipping validation definition");
                skipped.push(name);
                continue;
            }
        };

        let result = validate_suite(connector, &definition, &suite, &run_id).await?;
        store.store(&result)?;
        info!(definition = %name, success = result.success, "Validation finished");
        results.insert(name, result);
    }

    let docs = build_data_docs(&context, store.as_ref(), renderer, &[])?;
    Ok(ValidateOutcome {
        run_id,
        results,
        skipped,
        docs,
    })
}
