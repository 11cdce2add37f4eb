// expecta/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use expecta_core::infrastructure::config::project::{DEFAULT_DATA_PATH, DEFAULT_PROJECT_DIR};

#[derive(Parser)]
#[command(name = "expecta")]
#[command(about = "Declarative data quality checks for tabular files", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Provisions the validation project (suites, definitions, checkpoints)
    Init {
        /// init: provision only if absent | recreate: delete then provision
        #[arg(long, default_value = "init")]
        mode: String,

        /// Project directory
        #[arg(long, env = "EXPECTA_PROJECT_DIR", default_value = DEFAULT_PROJECT_DIR)]
        project_dir: PathBuf,

        /// Extra data docs site rebuilt after every checkpoint
        #[arg(long)]
        docs_site: Option<String>,

        /// Store results in the database named by EXPECTA_RESULTS_STORE_URL / _TABLE
        #[arg(long, default_value = "false")]
        results_store: bool,

        /// Log a notification after each checkpoint: all | failure | success
        #[arg(long)]
        notify: Option<String>,

        /// YAML blueprint replacing the built-in transactions rules
        #[arg(long)]
        blueprint: Option<PathBuf>,
    },

    /// Runs the project's checkpoints against a data file and rebuilds the data docs
    Run {
        /// Project directory
        #[arg(long, env = "EXPECTA_PROJECT_DIR", default_value = DEFAULT_PROJECT_DIR)]
        project_dir: PathBuf,

        /// CSV file to validate (header row required, any extension)
        #[arg(long, env = "EXPECTA_DATA_PATH", default_value = DEFAULT_DATA_PATH)]
        data: PathBuf,
    },

    /// Runs validation definitions individually (all of them by default)
    Validate {
        /// Project directory
        #[arg(long, env = "EXPECTA_PROJECT_DIR", default_value = DEFAULT_PROJECT_DIR)]
        project_dir: PathBuf,

        /// CSV file to validate (header row required, any extension)
        #[arg(long, env = "EXPECTA_DATA_PATH", default_value = DEFAULT_DATA_PATH)]
        data: PathBuf,

        /// Validation definition to run (repeatable)
        #[arg(long = "definition", short)]
        definitions: Vec<String>,
    },

    /// Rebuilds the data docs from stored results
    Docs {
        /// Project directory
        #[arg(long, env = "EXPECTA_PROJECT_DIR", default_value = DEFAULT_PROJECT_DIR)]
        project_dir: PathBuf,
    },
}
