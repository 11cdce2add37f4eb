// expecta-core/src/ports/mod.rs

pub mod connector;
pub mod results_store;

pub use connector::{ColumnSchema, Connector};
pub use results_store::ResultsStore;
