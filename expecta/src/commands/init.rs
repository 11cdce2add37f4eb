// expecta/src/commands/init.rs
//
// USE CASE: Provision the validation project.

use std::path::PathBuf;

use anyhow::Context;
use expecta_core::application::{InitMode, InitOptions, InitOutcome, initialize};
use expecta_core::domain::blueprint::Blueprint;
use expecta_core::domain::context::NotifyOn;
use expecta_core::infrastructure::config::project::{ProjectPaths, load_blueprint};
use expecta_core::ExpectaError;

pub struct InitArgs {
    pub mode: String,
    pub project_dir: PathBuf,
    pub docs_site: Option<String>,
    pub results_store: bool,
    pub notify: Option<String>,
    pub blueprint: Option<PathBuf>,
}

pub fn execute(args: InitArgs) -> anyhow::Result<()> {
    let mode = args.mode.parse::<InitMode>().map_err(ExpectaError::from)?;
    let notify = args
        .notify
        .as_deref()
        .map(str::parse::<NotifyOn>)
        .transpose()
        .map_err(ExpectaError::from)?;

    let blueprint = match &args.blueprint {
        Some(path) => load_blueprint(path)
            .with_context(|| format!("Failed to load blueprint from {:?}", path))?,
        None => Blueprint::transactions(),
    };

    let paths = ProjectPaths::new(&args.project_dir);
    let options = InitOptions {
        docs_site: args.docs_site,
        results_store: args.results_store,
        notify,
    };

    println!("⚙️  Initializing project in {} ({mode})", args.project_dir.display());

    match initialize(&paths, mode, &blueprint, &options)? {
        InitOutcome::AlreadyInitialized => {
            println!("   Project context already exists, nothing to do.");
        }
        InitOutcome::Provisioned(summary) => {
            println!("   Suites: {}", summary.suites.join(", "));
            println!("   Checkpoints: {}", summary.checkpoints.join(", "));
            println!("   Data docs sites: {}", summary.data_docs_sites.join(", "));
            println!("   Results store: {}", summary.results_store);
            println!("✨ Project provisioned in {}", summary.context_dir.display());
        }
    }
    Ok(())
}
