//! Species presets
//!
//! A species fixes an agent's traits, its behavior sentence and the knobs the
//! rule table reads: how far one Move goes and how likely the species acts on
//! a given tick.

use std::collections::BTreeSet;

use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpeciesKind {
    Gatherers,
    Builders,
    Explorers,
    Traders,
}

impl SpeciesKind {
    pub const ALL: [SpeciesKind; 4] = [
        SpeciesKind::Gatherers,
        SpeciesKind::Builders,
        SpeciesKind::Explorers,
        SpeciesKind::Traders,
    ];

    /// Case-insensitive lookup, accepting the singular form as well
    pub fn parse(name: &str) -> Option<SpeciesKind> {
        let lower = name.trim().to_ascii_lowercase();
        let stem = lower.strip_suffix('s').unwrap_or(&lower);
        match stem {
            "gatherer" => Some(SpeciesKind::Gatherers),
            "builder" => Some(SpeciesKind::Builders),
            "explorer" => Some(SpeciesKind::Explorers),
            "trader" => Some(SpeciesKind::Traders),
            _ => None,
        }
    }

    /// Built-in profile before config overrides
    pub fn preset(self) -> SpeciesProfile {
        let (traits, behavior, step, action_threshold): (&[&str], &str, f32, f32) = match self {
            SpeciesKind::Gatherers => (
                &["resourceful", "cooperative", "peaceful"],
                "Collect resources and share with community",
                1.0,
                0.7,
            ),
            SpeciesKind::Builders => (
                &["creative", "industrious", "organized"],
                "Construct shelters and infrastructure",
                1.0,
                0.8,
            ),
            // Explorers cover ground twice as fast
            SpeciesKind::Explorers => (
                &["curious", "adventurous", "adaptable"],
                "Discover new areas and resources",
                2.0,
                0.5,
            ),
            SpeciesKind::Traders => (
                &["social", "diplomatic", "strategic"],
                "Exchange resources and form alliances",
                1.0,
                0.0,
            ),
        };

        SpeciesProfile {
            kind: self,
            traits: traits.iter().map(|t| t.to_string()).collect(),
            behavior: behavior.to_string(),
            step,
            action_threshold,
        }
    }
}

/// Resolved per-species parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesProfile {
    pub kind: SpeciesKind,
    pub traits: BTreeSet<String>,
    pub behavior: String,
    /// Tiles moved per axis by one Move action
    pub step: f32,
    /// A uniform draw must exceed this for the species' signature action
    /// to fire (Gather, Build, Explore). Traders ignore it and trade
    /// whenever a partner is nearby.
    pub action_threshold: f32,
}
