//! Core type definitions used throughout the codebase

use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for agents
///
/// Ids are plain strings so that externally supplied agents (and agents named
/// by the oracle) can be addressed without translation.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh id of the form `<prefix>-<uuid>`
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{}-{}", prefix, Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AgentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Simulation time in milliseconds since the simulation started
#[derive(
    Debug, Display, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[display(fmt = "{}ms", _0)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    pub fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, zero if `earlier` is in the future
    pub fn since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    pub fn advanced_by(&self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms))
    }
}

/// Tick counter
pub type Tick = u64;

/// 2D position in tile units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Nearest integer tile coordinate
    pub fn rounded(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self { x: self.x * rhs, y: self.y * rhs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_id_display() {
        let id = AgentId::new("Traders-1");
        assert_eq!(id.to_string(), "Traders-1");
        assert_eq!(id.as_str(), "Traders-1");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = AgentId::generate("Gatherers");
        let b = AgentId::generate("Gatherers");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("Gatherers-"));
    }

    #[test]
    fn test_timestamp_since_saturates() {
        let early = Timestamp(1000);
        let late = Timestamp(2500);
        assert_eq!(late.since(early), 1500);
        assert_eq!(early.since(late), 0);
    }

    #[test]
    fn test_vec2_rounded() {
        assert_eq!(Vec2::new(10.4, -3.6).rounded(), (10, -4));
        assert_eq!(Vec2::new(0.5, 2.49).rounded(), (1, 2));
    }
}
