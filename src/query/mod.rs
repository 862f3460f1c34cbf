//! Query execution for BallerSQL.
//!
//! Isolates running a generated statement from the rest of the pipeline.

pub mod executor;

pub use executor::{ExecutionOutcome, QueryExecutor};
