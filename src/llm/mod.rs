//! Oracle plumbing: HTTP client, prompt building and reply parsing

pub mod client;
pub mod context;
pub mod parser;

pub use client::{ApiFormat, CompletionBackend, LlmClient};
pub use context::{DecisionPrompt, WorldSummary};
pub use parser::{parse_decision, parse_decree, request_decree, Decree, DecreePriority};
