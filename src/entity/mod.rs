//! Agents, their species and the registry that owns them

pub mod agent;
pub mod registry;
pub mod species;

pub use agent::{ActionStatus, Agent, AgentPatch};
pub use registry::AgentRegistry;
pub use species::{SpeciesKind, SpeciesProfile};
