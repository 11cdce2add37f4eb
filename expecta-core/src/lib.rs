// expecta-core/src/lib.rs

// 1. Documentation is not mandatory yet
#![allow(missing_docs)]
// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Contracts for the evaluation engine and the results stores.
pub mod ports;

// 2. Domain
// Expectations, suites, context model, blueprint and results.
// Depends on nothing else in the crate.
pub mod domain;

// 3. Infrastructure (Adapters)
// File-backed context, DataFusion engine, result stores, data docs, config.
pub mod infrastructure;

// 4. Application (Use Cases)
// Initializer, validation, checkpoints, runner.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::ExpectaError;
