// expecta-core/src/application/mod.rs

pub mod checkpoint;
pub mod docs;
pub mod initializer;
pub mod ports;
pub mod runner;
pub mod validation;

// --- RE-EXPORTS (FACADE PATTERN) ---
// The CLI only needs `use expecta_core::application::{initialize, run_checkpoints, ...}`.

pub use checkpoint::{CheckpointServices, run_checkpoint};
pub use docs::{DocsSiteUrl, build_data_docs};
pub use initializer::{InitMode, InitOptions, InitOutcome, ProvisionSummary, initialize};
pub use runner::{RunOutcome, RunRequest, ValidateOutcome, run_checkpoints, validate_definitions};
pub use validation::validate_suite;
