// expecta-core/src/application/checkpoint.rs

use futures::future::try_join_all;
use tracing::{error, info, instrument};

use crate::application::docs::build_data_docs;
use crate::application::ports::TemplateEngine;
use crate::application::validation::validate_suite;
use crate::domain::context::CheckpointAction;
use crate::domain::result::{CheckpointResult, RunIdentifier};
use crate::error::ExpectaError;
use crate::infrastructure::context::FileDataContext;
use crate::ports::connector::Connector;
use crate::ports::results_store::ResultsStore;

/// Services a checkpoint needs besides the context.
pub struct CheckpointServices<'a> {
    pub connector: &'a dyn Connector,
    pub store: &'a dyn ResultsStore,
    pub renderer: &'a dyn TemplateEngine,
}

/// Runs every validation definition of a checkpoint under `run_id`, stores
/// the results, then runs the checkpoint actions.
#[instrument(skip(context, services, run_id), fields(run = %run_id))]
pub async fn run_checkpoint(
    context: &FileDataContext,
    services: &CheckpointServices<'_>,
    name: &str,
    run_id: &RunIdentifier,
) -> Result<CheckpointResult, ExpectaError> {
    let checkpoint = context.get_checkpoint(name)?;

    // Lookups first: a dangling reference fails before anything is evaluated
    let mut plan = Vec::with_capacity(checkpoint.validation_definitions.len());
    for definition_name in &checkpoint.validation_definitions {
        let definition = context.get_validation_definition(definition_name)?;
        let suite = context.get_suite(&definition.suite)?;
        plan.push((definition, suite));
    }

    let results = try_join_all(
        plan.iter()
            .map(|(definition, suite)| validate_suite(services.connector, definition, suite, run_id)),
    )
    .await?;

    for result in &results {
        services.store.store(result)?;
    }

    let outcome = CheckpointResult::new(&checkpoint.name, run_id, results);
    info!(
        checkpoint = %outcome.checkpoint,
        success = outcome.success,
        validations = outcome.validation_results.len(),
        "Checkpoint finished"
    );

    for action in &checkpoint.actions {
        match action {
            CheckpointAction::UpdateDataDocs { site_names } => {
                build_data_docs(context, services.store, services.renderer, site_names)?;
            }
            CheckpointAction::Notify { on } => {
                if on.should_notify(outcome.success) {
                    notify(&outcome);
                }
            }
        }
    }

    Ok(outcome)
}

fn notify(outcome: &CheckpointResult) {
    if outcome.success {
        info!(checkpoint = %outcome.checkpoint, run = %outcome.run_id, "Checkpoint passed");
        return;
    }
    let failed: Vec<&str> = outcome
        .validation_results
        .iter()
        .filter(|r| !r.success)
        .map(|r| r.validation_definition.as_str())
        .collect();
    error!(
        checkpoint = %outcome.checkpoint,
        run = %outcome.run_id,
        failed = ?failed,
        "Checkpoint failed"
    );
}
