//! Agent state and partial updates

use std::collections::BTreeSet;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, Timestamp, Vec2};
use crate::entity::species::{SpeciesKind, SpeciesProfile};
use crate::world::biome::ResourceKind;

/// What an agent is currently doing
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    #[default]
    #[display(fmt = "idle")]
    Idle,
    #[display(fmt = "moving")]
    Moving,
    #[display(fmt = "gathering")]
    Gathering,
    #[display(fmt = "building")]
    Building,
    #[display(fmt = "exploring")]
    Exploring,
    #[display(fmt = "trading")]
    Trading,
    #[display(fmt = "communicating")]
    Communicating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub position: Vec2,
    pub status: ActionStatus,
    pub resources: Vec<ResourceKind>,
    pub species: SpeciesKind,
    pub traits: BTreeSet<String>,
    pub behavior: String,
    pub last_action_at: Timestamp,
}

impl Agent {
    /// Idle agent with the profile's traits and behavior
    pub fn new(
        id: AgentId,
        name: impl Into<String>,
        profile: &SpeciesProfile,
        position: Vec2,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            status: ActionStatus::Idle,
            resources: Vec::new(),
            species: profile.kind,
            traits: profile.traits.clone(),
            behavior: profile.behavior.clone(),
            last_action_at: now,
        }
    }

    /// Eligible to act at `now` given the cooldown
    pub fn is_eligible(&self, now: Timestamp, cooldown_ms: u64) -> bool {
        now.since(self.last_action_at) >= cooldown_ms
    }
}

/// Field-wise update merged by `AgentRegistry::patch`
///
/// `None` leaves the field untouched. The id is not patchable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentPatch {
    pub name: Option<String>,
    pub position: Option<Vec2>,
    pub status: Option<ActionStatus>,
    pub resources: Option<Vec<ResourceKind>>,
    pub traits: Option<BTreeSet<String>>,
    pub behavior: Option<String>,
    pub last_action_at: Option<Timestamp>,
}

impl AgentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_status(mut self, status: ActionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_resources(mut self, resources: Vec<ResourceKind>) -> Self {
        self.resources = Some(resources);
        self
    }

    pub fn with_last_action_at(mut self, at: Timestamp) -> Self {
        self.last_action_at = Some(at);
        self
    }

    /// Merge into `agent`
    ///
    /// `last_action_at` never moves backwards; an older timestamp is ignored.
    pub fn apply_to(self, agent: &mut Agent) {
        if let Some(name) = self.name {
            agent.name = name;
        }
        if let Some(position) = self.position {
            agent.position = position;
        }
        if let Some(status) = self.status {
            agent.status = status;
        }
        if let Some(resources) = self.resources {
            agent.resources = resources;
        }
        if let Some(traits) = self.traits {
            agent.traits = traits;
        }
        if let Some(behavior) = self.behavior {
            agent.behavior = behavior;
        }
        if let Some(at) = self.last_action_at {
            agent.last_action_at = agent.last_action_at.max(at);
        }
    }
}
