// expecta-core/src/domain/mod.rs

pub mod blueprint;
pub mod context;
pub mod error;
pub mod expectation;
pub mod result;
pub mod suite;

// Re-exports to keep imports short elsewhere
pub use blueprint::Blueprint;
pub use error::DomainError;
pub use expectation::Expectation;
pub use suite::ExpectationSuite;
