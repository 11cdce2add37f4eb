// expecta/src/commands/validate.rs
//
// USE CASE: Run validation definitions one by one.

use std::path::PathBuf;

use expecta_core::application::{RunRequest, validate_definitions};
use expecta_core::infrastructure::adapters::DataFusionConnector;
use expecta_core::infrastructure::config::project::ProjectPaths;
use expecta_core::infrastructure::rendering::JinjaRenderer;

use crate::commands::report::results_table;

pub async fn execute(
    project_dir: PathBuf,
    data: PathBuf,
    definitions: Vec<String>,
) -> anyhow::Result<bool> {
    let connector = DataFusionConnector::new();
    let renderer = JinjaRenderer::new()?;
    let request = RunRequest::new(ProjectPaths::new(&project_dir), &data);

    let outcome = validate_definitions(&connector, &renderer, &request, &definitions).await?;

    let table = results_table(outcome.results.values().map(|r| ("-", r)));
    println!("{table}");

    for name in &outcome.skipped {
        println!("   ⚠️  Skipped unknown validation definition '{name}'");
    }
    for (name, result) in &outcome.results {
        println!("   {name}: {}", result.success);
    }
    if let Some(docs) = outcome.docs.first() {
        println!("Data docs: {}", docs.site_url);
    }

    Ok(outcome.success())
}
