//! Chunks and the chunk generator
//!
//! The world is an unbounded plane of tiles split into square chunks of
//! `chunk_size` tiles per edge. A chunk is a pure function of its coordinate
//! and the world seed (resources optionally excepted, see
//! [`ResourceSeeding`]).

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::{ResourceSeeding, SimulationConfig, MAX_CHUNK_SIZE};
use crate::core::error::{Result, SimError};
use crate::world::biome::{BiomeKind, ResourceKind};
use crate::world::noise::NoiseField;

/// Chunk coordinate (in chunks, not tiles)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chunk owning the tile at (`tile_x`, `tile_y`), flooring toward -inf
    pub const fn from_tile(tile_x: i32, tile_y: i32, chunk_size: u32) -> Self {
        let size = chunk_size as i32;
        Self {
            x: tile_x.div_euclid(size),
            y: tile_y.div_euclid(size),
        }
    }

    /// Tile coordinate of the chunk's origin corner
    pub const fn origin(self, chunk_size: u32) -> (i32, i32) {
        (self.x * chunk_size as i32, self.y * chunk_size as i32)
    }

    /// Nearest coordinate whose window of `radius` chunks has every tile
    /// representable as an `i32`
    pub fn clamp_window(self, chunk_size: u32, radius: u32) -> Self {
        let size = i64::from(chunk_size.max(1));
        let radius = i64::from(radius);
        // Chunk c spans tiles c*size ..= (c+1)*size - 1
        let lo = i64::from(i32::MIN) / size + radius;
        let hi = (i64::from(i32::MAX) + 1) / size - 1 - radius;
        let clamp = |v: i32| {
            if lo > hi {
                0
            } else {
                i64::from(v).clamp(lo, hi) as i32
            }
        };
        Self::new(clamp(self.x), clamp(self.y))
    }

    pub fn chebyshev_distance(self, other: ChunkCoord) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub biome: BiomeKind,
    pub resources: Vec<ResourceKind>,
    /// Absolute tile coordinate
    pub x: i32,
    pub y: i32,
}

/// Square block of tiles, immutable once generated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub coord: ChunkCoord,
    size: u32,
    /// Row-major, `size * size` entries
    tiles: Vec<Tile>,
}

impl Chunk {
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Tile at chunk-local (`lx`, `ly`)
    pub fn local_tile(&self, lx: u32, ly: u32) -> Option<&Tile> {
        if lx < self.size && ly < self.size {
            self.tiles.get((ly * self.size + lx) as usize)
        } else {
            None
        }
    }

    /// Tile at absolute (`x`, `y`), if it belongs to this chunk
    pub fn tile(&self, x: i32, y: i32) -> Option<&Tile> {
        let (ox, oy) = self.coord.origin(self.size);
        let lx = u32::try_from(i64::from(x) - i64::from(ox)).ok()?;
        let ly = u32::try_from(i64::from(y) - i64::from(oy)).ok()?;
        self.local_tile(lx, ly)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }
}

/// Builds chunks from two noise fields (elevation, moisture)
#[derive(Debug, Clone)]
pub struct ChunkGenerator {
    chunk_size: u32,
    elevation: NoiseField,
    moisture: NoiseField,
    moisture_offset: f32,
    seeding: ResourceSeeding,
}

impl ChunkGenerator {
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        if config.chunk_size == 0 || config.chunk_size > MAX_CHUNK_SIZE {
            return Err(SimError::Generation(format!(
                "chunk_size must lie in 1..={}, got {}",
                MAX_CHUNK_SIZE, config.chunk_size
            )));
        }
        if !config.noise_scale.is_finite() || config.noise_scale <= 0.0 {
            return Err(SimError::Generation(format!(
                "noise_scale must be positive and finite, got {}",
                config.noise_scale
            )));
        }
        if !config.moisture_offset.is_finite() {
            return Err(SimError::Generation("moisture_offset must be finite".into()));
        }

        let field = NoiseField::new(config.world_seed, config.noise_scale, config.noise_octaves);
        Ok(Self {
            chunk_size: config.chunk_size,
            elevation: field,
            moisture: field,
            moisture_offset: config.moisture_offset,
            seeding: config.resource_seeding,
        })
    }

    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Biome of the tile at absolute (`x`, `y`)
    pub fn biome_at(&self, x: i32, y: i32) -> BiomeKind {
        let (fx, fy) = (x as f32, y as f32);
        let elevation = self.elevation.sample(fx, fy);
        let moisture = self
            .moisture
            .sample(fx + self.moisture_offset, fy + self.moisture_offset);
        BiomeKind::classify(elevation, moisture)
    }

    /// Generate the chunk at `coord`
    pub fn generate(&self, coord: ChunkCoord) -> Chunk {
        match self.seeding {
            ResourceSeeding::Deterministic => {
                let mut rng = ChaCha8Rng::seed_from_u64(self.chunk_seed(coord));
                self.build(coord, &mut rng)
            }
            ResourceSeeding::Entropy => self.build(coord, &mut rand::thread_rng()),
        }
    }

    fn build<R: rand::Rng + ?Sized>(&self, coord: ChunkCoord, rng: &mut R) -> Chunk {
        let size = self.chunk_size;
        let (ox, oy) = coord.origin(size);
        let mut tiles = Vec::with_capacity((size * size) as usize);

        for ly in 0..size as i32 {
            for lx in 0..size as i32 {
                let (x, y) = (ox + lx, oy + ly);
                let biome = self.biome_at(x, y);
                let resources = biome.draw_resources(rng);
                tiles.push(Tile { biome, resources, x, y });
            }
        }

        Chunk { coord, size, tiles }
    }

    fn chunk_seed(&self, coord: ChunkCoord) -> u64 {
        let packed = ((coord.x as u32 as u64) << 32) | coord.y as u32 as u64;
        self.elevation.seed().rotate_left(17) ^ packed.wrapping_mul(0x2545_f491_4f6c_dd1d)
    }
}
