//! Population intake - turning species selections into agents

use rand::Rng;
use tracing::{info, warn};

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{AgentId, Timestamp, Vec2};
use crate::entity::agent::Agent;
use crate::entity::registry::AgentRegistry;
use crate::entity::species::SpeciesKind;

/// Most agents a single request may create for one species
pub const MAX_PER_SPECIES: usize = 20;

/// Rectangle new agents are placed in, in whole tiles from the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnBounds {
    pub width: u32,
    pub height: u32,
}

impl SpawnBounds {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            width: config.spawn_width.max(1),
            height: config.spawn_height.max(1),
        }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            rng.gen_range(0..self.width) as f32,
            rng.gen_range(0..self.height) as f32,
        )
    }
}

/// Add `count` agents of each requested species
///
/// Counts above [`MAX_PER_SPECIES`] are clamped. Names continue from the
/// number of agents of that species already registered, so a second call
/// never repeats a name. Returns the ids created, in registry order.
pub fn spawn_population<R: Rng + ?Sized>(
    config: &SimulationConfig,
    registry: &mut AgentRegistry,
    requests: &[(SpeciesKind, usize)],
    bounds: SpawnBounds,
    rng: &mut R,
    now: Timestamp,
) -> Result<Vec<AgentId>> {
    let mut created = Vec::new();

    for &(kind, requested) in requests {
        let count = requested.min(MAX_PER_SPECIES);
        if count < requested {
            warn!(species = %kind, requested, count, "population request clamped");
        }

        let profile = config.species_profile(kind);
        let existing = registry.list().filter(|a| a.species == kind).count();
        for n in 1..=count {
            let id = AgentId::generate(&kind.to_string());
            let agent = Agent::new(
                id.clone(),
                format!("{}-{}", kind, existing + n),
                &profile,
                bounds.sample(rng),
                now,
            );
            registry.add(agent)?;
            created.push(id);
        }
    }

    info!(spawned = created.len(), total = registry.len(), "population spawned");
    Ok(created)
}
