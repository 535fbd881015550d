//! Viewport-driven chunk streaming
//!
//! Only chunks near the view centre are ever generated. The cache grows
//! monotonically: nothing is evicted, which stays cheap because the visible
//! window is bounded by the render distance.

use ahash::AHashMap;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::core::config::{SimulationConfig, MAX_RENDER_DISTANCE};
use crate::core::error::{Result, SimError};
use crate::core::types::Vec2;
use crate::world::chunk::{Chunk, ChunkCoord, ChunkGenerator, Tile};

pub struct WorldStreamer {
    generator: ChunkGenerator,
    render_distance: u32,
    tile_size: f32,
    center_chunk: ChunkCoord,
    chunks: AHashMap<ChunkCoord, Chunk>,
    generated: u64,
}

impl WorldStreamer {
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        if config.render_distance > MAX_RENDER_DISTANCE {
            return Err(SimError::Generation(format!(
                "render_distance must not exceed {}, got {}",
                MAX_RENDER_DISTANCE, config.render_distance
            )));
        }
        Ok(Self {
            generator: ChunkGenerator::new(config)?,
            render_distance: config.render_distance,
            tile_size: config.tile_size,
            center_chunk: ChunkCoord::default(),
            chunks: AHashMap::new(),
            generated: 0,
        })
    }

    /// Move the view and generate any chunk it now needs
    ///
    /// `position` is the screen-space pixel position of the view centre
    /// relative to the world origin; dividing by `tile_size * scale` yields
    /// the centre tile. Returns the number of chunks generated by this call.
    ///
    /// Blocks until generation finishes; see [`WorldStreamer::center_on`].
    pub fn set_viewport(&mut self, position: Vec2, scale: f32) -> usize {
        let pixels_per_tile = self.tile_size * scale.max(f32::EPSILON);
        let tile_x = (position.x / pixels_per_tile).floor() as i32;
        let tile_y = (position.y / pixels_per_tile).floor() as i32;
        self.center_on(ChunkCoord::from_tile(tile_x, tile_y, self.chunk_size()))
    }

    /// Centre the view on the chunk containing world tile position `pos`
    ///
    /// Blocks like [`WorldStreamer::center_on`].
    pub fn focus_tile(&mut self, pos: Vec2) -> usize {
        let (x, y) = (pos.x.floor() as i32, pos.y.floor() as i32);
        self.center_on(ChunkCoord::from_tile(x, y, self.chunk_size()))
    }

    /// Set the centre chunk and fill the render window around it
    ///
    /// A centre so far out that part of its window would leave the `i32`
    /// tile range is pulled back to the nearest centre that fits.
    ///
    /// Missing chunks are generated on the rayon pool and this call blocks
    /// until they are done. At most (2r + 1)^2 chunks are built per call,
    /// and only the first visit to a region pays for it; async callers
    /// stall their executor thread for that long.
    pub fn center_on(&mut self, center: ChunkCoord) -> usize {
        let center = center.clamp_window(self.chunk_size(), self.render_distance);
        self.center_chunk = center;

        let missing: Vec<ChunkCoord> = self
            .visible_chunks()
            .filter(|coord| !self.chunks.contains_key(coord))
            .collect();
        if missing.is_empty() {
            return 0;
        }

        debug!(count = missing.len(), center = ?center, "generating chunks");
        let generator = &self.generator;
        let fresh: Vec<Chunk> = missing
            .par_iter()
            .map(|&coord| generator.generate(coord))
            .collect();

        let count = fresh.len();
        for chunk in fresh {
            self.chunks.entry(chunk.coord).or_insert(chunk);
        }
        self.generated += count as u64;
        info!(generated = count, cached = self.chunks.len(), "chunk cache grew");
        count
    }

    /// Every chunk coordinate within render distance of the centre
    pub fn visible_chunks(&self) -> impl Iterator<Item = ChunkCoord> {
        let r = self.render_distance as i32;
        let center = self.center_chunk;
        (-r..=r).flat_map(move |dy| {
            (-r..=r).map(move |dx| ChunkCoord::new(center.x + dx, center.y + dy))
        })
    }

    /// Tile at absolute (`x`, `y`), `None` if its chunk is not generated yet
    pub fn tile_at(&self, x: i32, y: i32) -> Option<&Tile> {
        let coord = ChunkCoord::from_tile(x, y, self.chunk_size());
        self.chunks.get(&coord).and_then(|chunk| chunk.tile(x, y))
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    pub fn center_chunk(&self) -> ChunkCoord {
        self.center_chunk
    }

    pub fn chunk_size(&self) -> u32 {
        self.generator.chunk_size()
    }

    pub fn cached_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Total chunks generated over the streamer's lifetime
    pub fn generation_count(&self) -> u64 {
        self.generated
    }

    pub fn generator(&self) -> &ChunkGenerator {
        &self.generator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn streamer() -> WorldStreamer {
        WorldStreamer::new(&SimulationConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_before_first_viewport() {
        let s = streamer();
        assert_eq!(s.cached_chunks(), 0);
        assert!(s.tile_at(0, 0).is_none());
    }

    #[test]
    fn test_viewport_position_maps_to_center_chunk() {
        let mut s = streamer();
        // 32px tiles at scale 0.5 → 16px per tile; 16 tiles per chunk → 256px per chunk
        s.set_viewport(Vec2::new(600.0, -10.0), 0.5);
        assert_eq!(s.center_chunk(), ChunkCoord::new(2, -1));
    }

    #[test]
    fn test_panning_only_generates_new_column() {
        let mut s = streamer();
        assert_eq!(s.center_on(ChunkCoord::new(0, 0)), 25);
        assert_eq!(s.center_on(ChunkCoord::new(1, 0)), 5);
        assert_eq!(s.cached_chunks(), 30);
        // Going back generates nothing and evicts nothing
        assert_eq!(s.center_on(ChunkCoord::new(0, 0)), 0);
        assert_eq!(s.cached_chunks(), 30);
    }

    #[test]
    fn test_far_viewport_stays_in_tile_range() {
        let mut s = streamer();
        for position in [
            Vec2::new(1.0e12, 0.0),
            Vec2::new(-1.0e12, 1.0e12),
            Vec2::new(f32::MAX, f32::MIN),
        ] {
            s.set_viewport(position, 1.0);
            let edge = s.visible_chunks().map(|c| c.x.max(c.y)).max().unwrap();
            let origin = ChunkCoord::new(edge, 0).origin(s.chunk_size()).0;
            assert!(origin.checked_add(s.chunk_size() as i32 - 1).is_some());
            assert_eq!(s.visible_chunks().count(), 25);
            assert!(s.chunk(s.center_chunk()).is_some());
        }
        // Re-centring on the same far edge is a cache hit
        assert_eq!(s.set_viewport(Vec2::new(f32::MAX, f32::MIN), 1.0), 0);
    }

    #[test]
    fn test_oversized_render_distance_rejected() {
        let config = SimulationConfig { render_distance: 10_000, ..SimulationConfig::default() };
        assert!(matches!(WorldStreamer::new(&config), Err(SimError::Generation(_))));
    }

    #[test]
    fn test_tile_at_negative_coordinates() {
        let mut s = streamer();
        s.center_on(ChunkCoord::new(0, 0));
        let tile = s.tile_at(-1, -17).unwrap();
        assert_eq!((tile.x, tile.y), (-1, -17));
        assert!(s.tile_at(-1000, 0).is_none());
    }
}
