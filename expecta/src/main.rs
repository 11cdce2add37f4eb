// expecta/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use std::process::ExitCode;

use cli::{Cli, Commands};
use commands::init::InitArgs;
use expecta_core::ExpectaError;

/// Ok(false) means the data failed validation; Err means the command could not run.
async fn dispatch(command: Commands) -> anyhow::Result<bool> {
    match command {
        // --- USE CASE: PROVISION PROJECT ---
        Commands::Init {
            mode,
            project_dir,
            docs_site,
            results_store,
            notify,
            blueprint,
        } => {
            commands::init::execute(InitArgs {
                mode,
                project_dir,
                docs_site,
                results_store,
                notify,
                blueprint,
            })?;
            Ok(true)
        }

        // --- USE CASE: RUN CHECKPOINTS ---
        Commands::Run { project_dir, data } => commands::run::execute(project_dir, data).await,

        // --- USE CASE: AD-HOC VALIDATION ---
        Commands::Validate {
            project_dir,
            data,
            definitions,
        } => commands::validate::execute(project_dir, data, definitions).await,

        // --- USE CASE: DATA DOCS ---
        Commands::Docs { project_dir } => {
            commands::docs::execute(project_dir)?;
            Ok(true)
        }
    }
}

/// Library errors carry miette diagnostics (code + help); everything else is printed as is.
fn report(err: anyhow::Error) {
    match err.downcast::<ExpectaError>() {
        Ok(ExpectaError::Domain(e)) => eprintln!("{:?}", miette::Report::new(e)),
        Ok(ExpectaError::Infrastructure(e)) => eprintln!("{:?}", miette::Report::new(e)),
        Ok(other) => eprintln!("💥 {other}"),
        Err(err) => eprintln!("💥 {err:#}"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr, progress and tables to stdout
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    match dispatch(cli.command).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            report(err);
            ExitCode::FAILURE
        }
    }
}
