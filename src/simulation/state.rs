//! Everything the scheduler mutates, owned in one place

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{Tick, Vec2};
use crate::entity::registry::AgentRegistry;
use crate::simulation::event_log::EventLog;
use crate::world::streamer::WorldStreamer;

pub struct SimState {
    pub current_tick: Tick,
    pub agents: AgentRegistry,
    pub world: WorldStreamer,
    pub events: EventLog,
}

impl SimState {
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        Ok(Self {
            current_tick: 0,
            agents: AgentRegistry::new(),
            world: WorldStreamer::new(config)?,
            events: EventLog::new(config.event_log_capacity),
        })
    }

    /// Mean agent position, `None` for an empty world
    pub fn centroid(&self) -> Option<Vec2> {
        if self.agents.is_empty() {
            return None;
        }
        let sum = self
            .agents
            .list()
            .fold(Vec2::default(), |acc, a| acc + a.position);
        Some(sum * (1.0 / self.agents.len() as f32))
    }

    /// Stream chunks around the population; returns chunks generated
    ///
    /// Blocking: missing chunks are built on the rayon pool before this
    /// returns (see [`WorldStreamer::center_on`]).
    pub fn follow_population(&mut self) -> usize {
        match self.centroid() {
            Some(center) => self.world.focus_tile(center),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{AgentId, Timestamp};
    use crate::entity::agent::Agent;
    use crate::entity::species::SpeciesKind;

    #[test]
    fn test_centroid() {
        let mut state = SimState::new(&SimulationConfig::default()).unwrap();
        assert_eq!(state.centroid(), None);
        assert_eq!(state.follow_population(), 0);

        for (id, x, y) in [("a", 0.0, 0.0), ("b", 4.0, 2.0)] {
            state
                .agents
                .add(Agent::new(
                    AgentId::new(id),
                    id,
                    &SpeciesKind::Builders.preset(),
                    Vec2::new(x, y),
                    Timestamp::ZERO,
                ))
                .unwrap();
        }
        assert_eq!(state.centroid(), Some(Vec2::new(2.0, 1.0)));
        assert_eq!(state.follow_population(), 25);
        assert!(state.world.tile_at(2, 1).is_some());
    }
}
