//! Simulation configuration with documented constants
//!
//! All tunables are collected here with explanations of their purpose
//! and how they interact with each other. Every field has a default, so a
//! TOML file only needs to name the values it changes.

use std::path::Path;
use std::time::Duration;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::entity::species::{SpeciesKind, SpeciesProfile};

/// Largest accepted `chunk_size`; keeps `size * size` and chunk tile
/// origins inside 32-bit arithmetic
pub const MAX_CHUNK_SIZE: u32 = 4096;

/// Largest accepted `render_distance`
pub const MAX_RENDER_DISTANCE: u32 = 64;

/// How per-tile resource draws are seeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceSeeding {
    /// Draws come from a ChaCha8 stream keyed by world seed and chunk
    /// coordinate, so regenerating a chunk reproduces its resources.
    #[default]
    Deterministic,
    /// Draws come from the thread RNG. Biomes stay deterministic,
    /// resources do not.
    Entropy,
}

/// Partial override of a species preset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciesOverride {
    pub step: Option<f32>,
    pub action_threshold: Option<f32>,
}

/// Configuration for the simulation systems
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === SCHEDULING ===
    /// Milliseconds between two scheduler ticks
    pub tick_interval_ms: u64,

    /// Minimum milliseconds between two applied actions of one agent
    ///
    /// An agent whose last action is younger than this is Cooling and is
    /// skipped by the tick. With the defaults every agent acts at most
    /// every second tick.
    pub action_cooldown_ms: u64,

    /// Upper bound for a single oracle decision call
    ///
    /// A call that exceeds it fails with a timeout and the agent receives
    /// the fallback decision.
    pub oracle_timeout_ms: u64,

    // === WORLD ===
    /// Seed shared by the elevation and moisture fields
    pub world_seed: u64,

    /// Tiles per chunk edge
    pub chunk_size: u32,

    /// Chebyshev radius (in chunks) kept generated around the view centre
    ///
    /// The cache holds (2r + 1)^2 chunks per distinct viewport, so this also
    /// bounds how fast memory grows while the view pans.
    pub render_distance: u32,

    /// Screen pixels per tile at scale 1.0
    pub tile_size: f32,

    /// World units per noise lattice cell
    ///
    /// Larger values produce larger contiguous biome regions.
    pub noise_scale: f32,

    /// Number of octaves summed by the noise fields
    pub noise_octaves: u32,

    /// Coordinate offset applied when sampling moisture
    ///
    /// Elevation and moisture share one seed; sampling moisture far away
    /// from the elevation sample decorrelates the two fields.
    pub moisture_offset: f32,

    pub resource_seeding: ResourceSeeding,

    // === AGENTS ===
    /// Radius (tiles) within which other agents count as nearby
    pub nearby_radius: f32,

    /// Width and height (tiles) of the rectangle new populations spawn in
    pub spawn_width: u32,
    pub spawn_height: u32,

    /// Per-species preset overrides, keyed by species name
    pub species: AHashMap<SpeciesKind, SpeciesOverride>,

    // === EVENTS ===
    /// Number of most recent events kept by the event log
    pub event_log_capacity: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            action_cooldown_ms: 2000,
            oracle_timeout_ms: 15_000,

            world_seed: 0x5eed,
            chunk_size: 16,
            render_distance: 2,
            tile_size: 32.0,
            noise_scale: 24.0,
            noise_octaves: 3,
            moisture_offset: 10_000.0,
            resource_seeding: ResourceSeeding::Deterministic,

            nearby_radius: 5.0,
            spawn_width: 50,
            spawn_height: 30,
            species: AHashMap::new(),

            event_log_capacity: 100,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; absent keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_millis(self.oracle_timeout_ms)
    }

    /// Preset profile for `kind` with any configured overrides applied
    pub fn species_profile(&self, kind: SpeciesKind) -> SpeciesProfile {
        let mut profile = kind.preset();
        if let Some(overrides) = self.species.get(&kind) {
            if let Some(step) = overrides.step {
                profile.step = step;
            }
            if let Some(threshold) = overrides.action_threshold {
                profile.action_threshold = threshold;
            }
        }
        profile
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(SimError::InvalidConfig("tick_interval_ms must be > 0".into()));
        }
        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(SimError::InvalidConfig(format!(
                "chunk_size ({}) must lie in 1..={}",
                self.chunk_size, MAX_CHUNK_SIZE
            )));
        }
        if self.render_distance > MAX_RENDER_DISTANCE {
            return Err(SimError::InvalidConfig(format!(
                "render_distance ({}) must not exceed {}",
                self.render_distance, MAX_RENDER_DISTANCE
            )));
        }
        if !(self.tile_size > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "tile_size ({}) must be positive",
                self.tile_size
            )));
        }
        if !(self.noise_scale > 0.0) || self.noise_octaves == 0 {
            return Err(SimError::InvalidConfig(format!(
                "noise_scale ({}) must be positive and noise_octaves ({}) non-zero",
                self.noise_scale, self.noise_octaves
            )));
        }
        if !(self.nearby_radius > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "nearby_radius ({}) must be positive",
                self.nearby_radius
            )));
        }
        if self.event_log_capacity == 0 {
            return Err(SimError::InvalidConfig("event_log_capacity must be > 0".into()));
        }
        if self.spawn_width == 0 || self.spawn_height == 0 {
            return Err(SimError::InvalidConfig("spawn area must not be empty".into()));
        }
        for (kind, overrides) in &self.species {
            if let Some(step) = overrides.step {
                if !(step > 0.0) {
                    return Err(SimError::InvalidConfig(format!(
                        "{} step ({}) must be positive",
                        kind, step
                    )));
                }
            }
            if let Some(threshold) = overrides.action_threshold {
                if !(0.0..=1.0).contains(&threshold) {
                    return Err(SimError::InvalidConfig(format!(
                        "{} action_threshold ({}) must lie in [0, 1]",
                        kind, threshold
                    )));
                }
            }
        }
        Ok(())
    }
}
