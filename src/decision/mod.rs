//! Decision providers
//!
//! The scheduler asks a [`DecisionProvider`] what each eligible agent does
//! next. Two providers exist: a synchronous rule table keyed on species and
//! an oracle backed by an external reasoning service. Both answer with the
//! same [`Decision`] shape, so the tick algorithm does not care which one is
//! configured.

pub mod dice;
pub mod oracle;
pub mod rules;

use async_trait::async_trait;
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::core::error::DecisionError;
use crate::core::types::{AgentId, Vec2};
use crate::entity::agent::{ActionStatus, Agent};
use crate::simulation::perception::DecisionContext;
use crate::world::biome::ResourceKind;

pub use dice::Dice;
pub use oracle::OracleProvider;
pub use rules::RuleBasedProvider;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    #[display(fmt = "move")]
    Move,
    #[display(fmt = "gather")]
    Gather,
    #[display(fmt = "build")]
    Build,
    #[display(fmt = "trade")]
    Trade,
    #[display(fmt = "explore")]
    Explore,
    #[display(fmt = "communicate")]
    Communicate,
}

impl ActionKind {
    /// Status an agent shows after performing this action
    pub fn status(self) -> ActionStatus {
        match self {
            ActionKind::Move => ActionStatus::Moving,
            ActionKind::Gather => ActionStatus::Gathering,
            ActionKind::Build => ActionStatus::Building,
            ActionKind::Trade => ActionStatus::Trading,
            ActionKind::Explore => ActionStatus::Exploring,
            ActionKind::Communicate => ActionStatus::Communicating,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceKind>,
}

impl DecisionTarget {
    pub fn position(pos: Vec2) -> Self {
        Self {
            x: Some(pos.x),
            y: Some(pos.y),
            ..Self::default()
        }
    }

    pub fn agent(id: AgentId) -> Self {
        Self {
            agent_id: Some(id),
            ..Self::default()
        }
    }

    pub fn resource(resource: ResourceKind) -> Self {
        Self {
            resource: Some(resource),
            ..Self::default()
        }
    }
}

/// One agent's choice for one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub message: String,
    pub action: ActionKind,
    pub target: DecisionTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech: Option<String>,
}

impl Decision {
    pub fn new(action: ActionKind, target: DecisionTarget, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            action,
            target,
            speech: None,
        }
    }

    pub fn with_speech(mut self, speech: impl Into<String>) -> Self {
        self.speech = Some(speech.into());
        self
    }

    /// Substitute for a failed decision: keep doing what the agent was doing
    ///
    /// A Move toward the agent's own position, so nothing about the agent
    /// changes except its cooldown.
    pub fn fallback(agent: &Agent) -> Self {
        Self::new(
            ActionKind::Move,
            DecisionTarget::position(agent.position),
            "Continuing current activity",
        )
    }
}

/// Source of per-agent decisions
///
/// `Ok(None)` means the agent does nothing this tick. Implementations must
/// not mutate simulation state; all writes happen in the scheduler's apply
/// step.
#[async_trait]
pub trait DecisionProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn decide(
        &self,
        agent: &Agent,
        context: &DecisionContext,
    ) -> Result<Option<Decision>, DecisionError>;
}
