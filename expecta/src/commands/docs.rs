// expecta/src/commands/docs.rs
//
// USE CASE: Rebuild the data docs from stored results.

use std::path::PathBuf;
use tracing::debug;

use expecta_core::application::build_data_docs;
use expecta_core::infrastructure::FileDataContext;
use expecta_core::infrastructure::adapters::open_results_store;
use expecta_core::infrastructure::config::project::ProjectPaths;
use expecta_core::infrastructure::rendering::JinjaRenderer;
use expecta_core::ports::ResultsStore;

pub fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    println!("📚 Building data docs...");

    let context = FileDataContext::open(&ProjectPaths::new(&project_dir))?;
    let store = open_results_store(context.paths(), context.results_store_config())?;
    let renderer = JinjaRenderer::new()?;
    debug!(backend = store.backend_name(), "Reading stored results");

    for site in build_data_docs(&context, store.as_ref(), &renderer, &[])? {
        println!("✨ {}: {}", site.site_name, site.site_url);
    }
    Ok(())
}
