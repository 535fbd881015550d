//! Decree execution pipeline
//!
//! Decree -> DecreeAction (parsed per action line) -> registry changes + Info events

pub mod executor;

pub use executor::{DecreeAction, DecreeExecutor, ExecutionResult};
