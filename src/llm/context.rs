//! Prompt construction for oracle calls
//!
//! Decision prompts carry a JSON snapshot of one agent and what it perceives.
//! Decree prompts carry a plain-text summary of the whole society.

use serde::Serialize;

use crate::core::types::{AgentId, Vec2};
use crate::entity::agent::Agent;
use crate::entity::species::SpeciesKind;
use crate::simulation::perception::DecisionContext;
use crate::simulation::state::SimState;
use crate::world::biome::ResourceKind;

/// Request body of a decision call
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionPrompt {
    pub current_state: AgentSnapshot,
    pub surroundings: SurroundingsSummary,
    pub nearby_agents: Vec<NearbySummary>,
}

#[derive(Debug, Serialize)]
pub struct AgentSnapshot {
    pub name: String,
    pub species: SpeciesKind,
    pub traits: Vec<String>,
    pub behavior: String,
    pub status: String,
    pub resources: Vec<ResourceKind>,
    pub position: Vec2,
}

#[derive(Debug, Serialize)]
pub struct SurroundingsSummary {
    pub biome: String,
    pub resources: Vec<ResourceKind>,
}

#[derive(Debug, Serialize)]
pub struct NearbySummary {
    pub id: AgentId,
    pub name: String,
    pub species: SpeciesKind,
    pub resources: Vec<ResourceKind>,
    pub distance: f32,
}

impl DecisionPrompt {
    pub fn new(agent: &Agent, context: &DecisionContext) -> Self {
        Self {
            current_state: AgentSnapshot {
                name: agent.name.clone(),
                species: agent.species,
                traits: agent.traits.iter().cloned().collect(),
                behavior: agent.behavior.clone(),
                status: agent.status.to_string(),
                resources: agent.resources.clone(),
                position: agent.position,
            },
            surroundings: SurroundingsSummary {
                biome: context.surroundings.biome_name(),
                resources: context.surroundings.resources.clone(),
            },
            nearby_agents: context
                .nearby
                .iter()
                .map(|n| NearbySummary {
                    id: n.id.clone(),
                    name: n.name.clone(),
                    species: n.species,
                    resources: n.resources.clone(),
                    distance: n.distance,
                })
                .collect(),
        }
    }

    /// System prompt naming the agent and the reply schema
    pub fn system_prompt(&self) -> String {
        format!(
            "You are an AI agent in a simulated world. You are one of the {} named {} with traits: {}. \
             Your way of life: {}.\n\
             Make decisions based on your species behavior, traits, and current situation.\n\n{}",
            self.current_state.species,
            self.current_state.name,
            self.current_state.traits.join(", "),
            self.current_state.behavior,
            DECISION_SCHEMA_PROMPT
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

const DECISION_SCHEMA_PROMPT: &str = r#"Respond ONLY with a JSON object of this shape:
{
  "message": "short description of what you do",
  "action": "move" | "gather" | "build" | "trade" | "explore" | "communicate",
  "target": {
    "x": number (optional, tile to move toward),
    "y": number (optional),
    "agentId": "id of a nearby agent (optional)",
    "resource": "wood" | "stone" | "iron" | "gold" | "food" | "water" (optional)
  },
  "speech": "something you say out loud (optional)"
}
"target" is required; use {} when the action has no target."#;

/// Society overview for decree prompts
pub struct WorldSummary {
    pub current_tick: u64,
    pub population: Vec<(SpeciesKind, usize)>,
    pub named_agents: Vec<String>,
    pub recent_events: Vec<String>,
}

impl WorldSummary {
    pub fn from_state(state: &SimState) -> Self {
        let population = SpeciesKind::ALL
            .into_iter()
            .map(|kind| (kind, state.agents.list().filter(|a| a.species == kind).count()))
            .filter(|&(_, count)| count > 0)
            .collect();

        // Limit to keep the prompt small
        let named_agents = state
            .agents
            .list()
            .take(10)
            .map(|a| format!("{} [{}] ({}, {})", a.name, a.id, a.species, a.status))
            .collect();

        let recent_events = state
            .events
            .iter()
            .take(10)
            .map(|e| format!("[{}] {}", e.kind, e.message))
            .collect();

        Self {
            current_tick: state.current_tick,
            population,
            named_agents,
            recent_events,
        }
    }

    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str(&format!("Time: Tick {}\n", self.current_tick));
        let total: usize = self.population.iter().map(|(_, n)| n).sum();
        s.push_str(&format!("Population: {}\n", total));
        for (kind, count) in &self.population {
            s.push_str(&format!("- {}: {}\n", kind, count));
        }

        if !self.named_agents.is_empty() {
            s.push_str("\nInhabitants:\n");
            for agent in &self.named_agents {
                s.push_str(&format!("- {}\n", agent));
            }
        }

        if !self.recent_events.is_empty() {
            s.push_str("\nRecent Events:\n");
            for event in &self.recent_events {
                s.push_str(&format!("- {}\n", event));
            }
        }

        s
    }
}
