//! Perception - what an agent knows when it decides
//!
//! The context handed to a decision provider: the other agents within the
//! nearby radius (closest first) and the tile under the agent.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, Vec2};
use crate::entity::agent::Agent;
use crate::entity::species::SpeciesKind;
use crate::spatial::sparse_hash::SparseHashGrid;
use crate::world::biome::{BiomeKind, ResourceKind};
use crate::world::streamer::WorldStreamer;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyAgent {
    pub id: AgentId,
    pub name: String,
    pub species: SpeciesKind,
    pub resources: Vec<ResourceKind>,
    pub position: Vec2,
    pub distance: f32,
}

/// The tile an agent stands on
///
/// `biome` is `None` while the owning chunk has not been streamed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surroundings {
    pub tile: (i32, i32),
    pub biome: Option<BiomeKind>,
    pub resources: Vec<ResourceKind>,
}

impl Surroundings {
    pub fn unknown(tile: (i32, i32)) -> Self {
        Self {
            tile,
            biome: None,
            resources: Vec::new(),
        }
    }

    /// Look up the tile at `pos` rounded to the nearest integer coordinate
    pub fn at(world: &WorldStreamer, pos: Vec2) -> Self {
        let (x, y) = pos.rounded();
        match world.tile_at(x, y) {
            Some(tile) => Self {
                tile: (x, y),
                biome: Some(tile.biome),
                resources: tile.resources.clone(),
            },
            None => Self::unknown((x, y)),
        }
    }

    pub fn biome_name(&self) -> String {
        self.biome
            .map(|b| b.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionContext {
    /// Sorted by ascending distance
    pub nearby: Vec<NearbyAgent>,
    pub surroundings: Surroundings,
}

impl DecisionContext {
    pub fn new(nearby: Vec<NearbyAgent>, surroundings: Surroundings) -> Self {
        Self { nearby, surroundings }
    }

    pub fn closest(&self) -> Option<&NearbyAgent> {
        self.nearby.first()
    }
}

/// Builds contexts for one tick's agent snapshot
pub struct Perceiver<'a> {
    agents: &'a [Agent],
    positions: Vec<Vec2>,
    grid: SparseHashGrid,
    radius: f32,
}

impl<'a> Perceiver<'a> {
    pub fn new(agents: &'a [Agent], radius: f32) -> Self {
        let positions: Vec<Vec2> = agents.iter().map(|a| a.position).collect();
        let grid = SparseHashGrid::from_positions(radius, &positions);
        Self {
            agents,
            positions,
            grid,
            radius,
        }
    }

    /// Context for the agent at `idx` of the snapshot
    pub fn perceive(&self, idx: usize, world: &WorldStreamer) -> DecisionContext {
        let observer = &self.agents[idx];
        let mut nearby: Vec<NearbyAgent> = self
            .grid
            .query_radius(observer.position, self.radius, &self.positions)
            .into_iter()
            .filter(|&other| other != idx && self.agents[other].id != observer.id)
            .map(|other| {
                let agent = &self.agents[other];
                NearbyAgent {
                    id: agent.id.clone(),
                    name: agent.name.clone(),
                    species: agent.species,
                    resources: agent.resources.clone(),
                    position: agent.position,
                    distance: observer.position.distance(&agent.position),
                }
            })
            .collect();
        nearby.sort_by_key(|n| (OrderedFloat(n.distance), n.id.clone()));

        DecisionContext::new(nearby, Surroundings::at(world, observer.position))
    }
}
