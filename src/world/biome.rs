//! Biome classification and per-biome resource tables

use derive_more::Display;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Elevation above which a tile is mountainous
pub const MOUNTAIN_ELEVATION: f32 = 0.6;
/// Elevation below which a tile is flooded
pub const LAKE_ELEVATION: f32 = -0.3;
/// Moisture above which land is forested
pub const FOREST_MOISTURE: f32 = 0.3;
/// Moisture below which land is desert
pub const DESERT_MOISTURE: f32 = -0.3;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiomeKind {
    #[display(fmt = "forest")]
    Forest,
    #[display(fmt = "plains")]
    Plains,
    #[display(fmt = "desert")]
    Desert,
    #[display(fmt = "mountains")]
    Mountains,
    #[display(fmt = "lake")]
    Lake,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    #[display(fmt = "wood")]
    Wood,
    #[display(fmt = "stone")]
    Stone,
    #[display(fmt = "iron")]
    Iron,
    #[display(fmt = "gold")]
    Gold,
    #[display(fmt = "food")]
    Food,
    #[display(fmt = "water")]
    Water,
}

impl BiomeKind {
    /// Classify a tile from its two noise samples
    ///
    /// Elevation decides first (mountains, lakes); moisture only splits the
    /// remaining lowland.
    pub fn classify(elevation: f32, moisture: f32) -> BiomeKind {
        if elevation > MOUNTAIN_ELEVATION {
            BiomeKind::Mountains
        } else if elevation < LAKE_ELEVATION {
            BiomeKind::Lake
        } else if moisture > FOREST_MOISTURE {
            BiomeKind::Forest
        } else if moisture < DESERT_MOISTURE {
            BiomeKind::Desert
        } else {
            BiomeKind::Plains
        }
    }

    /// (resource, draw that must be exceeded) pairs, one independent draw each
    fn resource_table(self) -> &'static [(ResourceKind, f32)] {
        match self {
            BiomeKind::Forest => &[(ResourceKind::Wood, 0.7), (ResourceKind::Food, 0.9)],
            BiomeKind::Mountains => &[
                (ResourceKind::Stone, 0.6),
                (ResourceKind::Iron, 0.8),
                (ResourceKind::Gold, 0.95),
            ],
            BiomeKind::Plains => &[(ResourceKind::Food, 0.7)],
            BiomeKind::Desert => &[(ResourceKind::Stone, 0.9)],
            // Lakes always hold water
            BiomeKind::Lake => &[(ResourceKind::Water, -1.0)],
        }
    }

    /// Draw the resources present on one tile of this biome
    pub fn draw_resources<R: Rng + ?Sized>(self, rng: &mut R) -> Vec<ResourceKind> {
        self.resource_table()
            .iter()
            .filter_map(|&(resource, threshold)| {
                let roll: f32 = rng.gen();
                (roll > threshold).then_some(resource)
            })
            .collect()
    }
}
