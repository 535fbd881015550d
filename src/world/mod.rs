//! Procedural, chunk-streamed terrain

pub mod biome;
pub mod chunk;
pub mod noise;
pub mod streamer;

pub use biome::{BiomeKind, ResourceKind};
pub use chunk::{Chunk, ChunkCoord, ChunkGenerator, Tile};
pub use noise::NoiseField;
pub use streamer::WorldStreamer;
