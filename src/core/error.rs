use std::time::Duration;

use thiserror::Error;

use crate::core::types::AgentId;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Agent already registered: {0}")]
    DuplicateId(AgentId),

    #[error("Agent not found: {0}")]
    NotFound(AgentId),

    #[error("Decision provider error: {0}")]
    DecisionProvider(#[from] DecisionError),

    #[error("World generation error: {0}")]
    Generation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Failure of a single `decide` call.
///
/// Always recoverable: the scheduler substitutes a fallback decision and
/// records the failure in the event log.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecisionError {
    #[error("oracle transport failed: {0}")]
    Transport(String),

    #[error("oracle returned an invalid decision: {0}")]
    InvalidPayload(String),

    #[error("oracle did not answer within {0:?}")]
    Timeout(Duration),

    #[error("decision provider unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, SimError>;
