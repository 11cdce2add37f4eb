// expecta/src/commands/run.rs
//
// USE CASE: Run the project's checkpoints against a data file.

use std::path::PathBuf;
use tracing::debug;

use expecta_core::application::{RunRequest, run_checkpoints};
use expecta_core::infrastructure::adapters::DataFusionConnector;
use expecta_core::infrastructure::config::project::ProjectPaths;
use expecta_core::infrastructure::rendering::JinjaRenderer;

use crate::commands::report::{results_table, verdict};

/// Returns the overall verdict. Fatal errors are returned as `Err`.
pub async fn execute(project_dir: PathBuf, data: PathBuf) -> anyhow::Result<bool> {
    let start = std::time::Instant::now();
    println!("🚀 Validating {} against {}", data.display(), project_dir.display());

    let connector = DataFusionConnector::new();
    let renderer = JinjaRenderer::new()?;
    let request = RunRequest::new(ProjectPaths::new(&project_dir), &data);

    let outcome = run_checkpoints(&connector, &renderer, &request).await?;
    debug!(run = %outcome.run_id, checkpoints = outcome.checkpoints.len(), "Run complete");

    let table = results_table(outcome.checkpoints.iter().flat_map(|c| {
        c.validation_results
            .iter()
            .map(move |r| (c.checkpoint.as_str(), r))
    }));
    println!("{table}");

    for checkpoint in &outcome.checkpoints {
        println!("   {} {}", verdict(checkpoint.success), checkpoint.checkpoint);
    }
    println!("\nRun: {}", outcome.run_id);
    println!("Validation result: {}", outcome.success);
    if let Some(url) = outcome.docs_url() {
        println!("Data docs: {url}");
    }
    println!("Finished in {:.2?}", start.elapsed());

    Ok(outcome.success)
}
