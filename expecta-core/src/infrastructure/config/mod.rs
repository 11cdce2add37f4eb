pub mod environment;
pub mod project;

pub use environment::{ResultsStoreEnv, resolve_placeholders};
pub use project::{ProjectPaths, load_blueprint, load_context_descriptor};
