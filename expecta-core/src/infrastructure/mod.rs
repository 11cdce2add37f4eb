// expecta-core/src/infrastructure/mod.rs

pub mod adapters;
pub mod config;
pub mod context;
pub mod error;
pub mod fs;
pub mod rendering;

pub use context::FileDataContext;
