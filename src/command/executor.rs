//! Decree execution - converts decree action lines into registry changes

use rand::Rng;
use tracing::{info, warn};

use crate::core::config::SimulationConfig;
use crate::core::error::SimError;
use crate::core::types::{AgentId, Timestamp};
use crate::entity::species::SpeciesKind;
use crate::llm::parser::Decree;
use crate::simulation::event_log::EventKind;
use crate::simulation::population::{spawn_population, SpawnBounds};
use crate::simulation::state::SimState;

/// One recognised decree action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecreeAction {
    Spawn { species: SpeciesKind, count: usize },
    Remove { id: AgentId },
}

impl DecreeAction {
    /// Parse `spawn <Species> [count]` or `remove <agent-id>`
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let verb = words.next()?.to_lowercase();
        match verb.as_str() {
            "spawn" => {
                let species = SpeciesKind::parse(words.next()?)?;
                let count = match words.next() {
                    Some(n) => n.parse().ok()?,
                    None => 1,
                };
                words
                    .next()
                    .is_none()
                    .then_some(DecreeAction::Spawn { species, count })
            }
            "remove" => {
                let id = AgentId::new(words.next()?);
                words.next().is_none().then_some(DecreeAction::Remove { id })
            }
            _ => None,
        }
    }
}

/// Result of executing a decree
#[derive(Debug, Default)]
pub struct ExecutionResult {
    pub spawned: Vec<AgentId>,
    pub removed: Vec<AgentId>,
    /// Action lines that matched no known action
    pub unrecognized: Vec<String>,
    pub errors: Vec<SimError>,
}

/// Applies decrees to simulation state
pub struct DecreeExecutor;

impl DecreeExecutor {
    /// Execute `decree` at time `now`
    ///
    /// Spawned agents join the registry immediately but act no earlier than
    /// the next tick.
    pub fn execute<R: Rng + ?Sized>(
        config: &SimulationConfig,
        state: &mut SimState,
        decree: &Decree,
        now: Timestamp,
        rng: &mut R,
    ) -> ExecutionResult {
        let mut result = ExecutionResult::default();
        info!(priority = ?decree.priority, actions = decree.actions.len(), "executing decree");
        state.events.push(now, EventKind::Info, decree.message.clone());

        for line in &decree.actions {
            match DecreeAction::parse(line) {
                Some(DecreeAction::Spawn { species, count }) => {
                    match spawn_population(
                        config,
                        &mut state.agents,
                        &[(species, count)],
                        SpawnBounds::from_config(config),
                        rng,
                        now,
                    ) {
                        Ok(ids) => {
                            for id in &ids {
                                if let Some(agent) = state.agents.get(id) {
                                    state.events.push(
                                        now,
                                        EventKind::Info,
                                        format!("{} has arrived", agent.name),
                                    );
                                }
                            }
                            result.spawned.extend(ids);
                        }
                        Err(err) => {
                            warn!(error = %err, "decree spawn failed");
                            result.errors.push(err);
                        }
                    }
                }
                Some(DecreeAction::Remove { id }) => {
                    if let Some(agent) = state.agents.remove(&id) {
                        state.events.push(
                            now,
                            EventKind::Info,
                            format!("{} has left the world", agent.name),
                        );
                        result.removed.push(id);
                    }
                }
                None => {
                    warn!(action = %line, "unrecognized decree action");
                    result.unrecognized.push(line.clone());
                }
            }
        }

        result
    }
}
