pub mod config;
pub mod error;
pub mod types;

pub use config::{ResourceSeeding, SimulationConfig};
pub use error::{DecisionError, Result, SimError};
pub use types::{AgentId, Tick, Timestamp, Vec2};
