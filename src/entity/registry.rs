//! Agent registry - id-addressed storage with stable insertion order

use ahash::AHashMap;

use crate::core::error::{Result, SimError};
use crate::core::types::AgentId;
use crate::entity::agent::{Agent, AgentPatch};

/// All agents of a simulation
///
/// Agents live in a `Vec` so iteration follows insertion order; the index map
/// gives O(1) lookup by id.
#[derive(Debug, Default, Clone)]
pub struct AgentRegistry {
    agents: Vec<Agent>,
    index: AHashMap<AgentId, usize>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new agent; fails if the id is taken
    pub fn add(&mut self, agent: Agent) -> Result<()> {
        if self.index.contains_key(&agent.id) {
            return Err(SimError::DuplicateId(agent.id));
        }
        self.index.insert(agent.id.clone(), self.agents.len());
        self.agents.push(agent);
        Ok(())
    }

    /// Remove an agent, returning it if it was present
    ///
    /// Unknown ids are a no-op.
    pub fn remove(&mut self, id: &AgentId) -> Option<Agent> {
        let idx = self.index.remove(id)?;
        let removed = self.agents.remove(idx);
        for agent in &self.agents[idx..] {
            if let Some(slot) = self.index.get_mut(&agent.id) {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    /// Merge `patch` into the agent with `id`
    pub fn patch(&mut self, id: &AgentId, patch: AgentPatch) -> Result<&Agent> {
        let idx = *self
            .index
            .get(id)
            .ok_or_else(|| SimError::NotFound(id.clone()))?;
        let agent = &mut self.agents[idx];
        patch.apply_to(agent);
        Ok(agent)
    }

    pub fn get(&self, id: &AgentId) -> Option<&Agent> {
        self.index.get(id).map(|&idx| &self.agents[idx])
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.index.contains_key(id)
    }

    /// Agents in insertion order
    pub fn list(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.iter()
    }

    /// Owned copy of the current agents, in insertion order
    pub fn snapshot(&self) -> Vec<Agent> {
        self.agents.clone()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Timestamp, Vec2};
    use crate::entity::agent::ActionStatus;
    use crate::entity::species::SpeciesKind;

    fn agent(id: &str) -> Agent {
        Agent::new(
            AgentId::new(id),
            id,
            &SpeciesKind::Traders.preset(),
            Vec2::new(0.0, 0.0),
            Timestamp::ZERO,
        )
    }

    fn ids(registry: &AgentRegistry) -> Vec<&str> {
        registry.list().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut registry = AgentRegistry::new();
        registry.add(agent("a")).unwrap();
        let err = registry.add(agent("a")).unwrap_err();
        assert!(matches!(err, SimError::DuplicateId(id) if id.as_str() == "a"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let mut registry = AgentRegistry::new();
        for id in ["c", "a", "b"] {
            registry.add(agent(id)).unwrap();
        }
        assert_eq!(ids(&registry), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_remove_is_idempotent_and_keeps_order() {
        let mut registry = AgentRegistry::new();
        for id in ["a", "b", "c", "d"] {
            registry.add(agent(id)).unwrap();
        }

        assert!(registry.remove(&AgentId::new("b")).is_some());
        assert!(registry.remove(&AgentId::new("b")).is_none());
        assert!(registry.remove(&AgentId::new("zzz")).is_none());

        assert_eq!(ids(&registry), vec!["a", "c", "d"]);
        // Index stays consistent after the shift
        assert_eq!(registry.get(&AgentId::new("d")).unwrap().id.as_str(), "d");
        registry.add(agent("b")).unwrap();
        assert_eq!(ids(&registry), vec!["a", "c", "d", "b"]);
    }

    #[test]
    fn test_patch_unknown_id_fails() {
        let mut registry = AgentRegistry::new();
        let err = registry
            .patch(&AgentId::new("ghost"), AgentPatch::new())
            .unwrap_err();
        assert!(matches!(err, SimError::NotFound(_)));
    }

    #[test]
    fn test_patch_merges_fields() {
        let mut registry = AgentRegistry::new();
        registry.add(agent("a")).unwrap();
        let patched = registry
            .patch(
                &AgentId::new("a"),
                AgentPatch::new()
                    .with_position(Vec2::new(3.0, 4.0))
                    .with_status(ActionStatus::Moving),
            )
            .unwrap();
        assert_eq!(patched.position, Vec2::new(3.0, 4.0));
        assert_eq!(patched.status, ActionStatus::Moving);
        assert_eq!(patched.name, "a");
    }
}
