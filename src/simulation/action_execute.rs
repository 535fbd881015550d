//! Action execution - turns a decision into an agent patch and events
//!
//! Pure: reads the agent, returns what should change. The scheduler writes
//! the patch back through the registry.

use crate::core::types::{Timestamp, Vec2};
use crate::decision::{ActionKind, Decision};
use crate::entity::agent::{Agent, AgentPatch};
use crate::simulation::event_log::{Event, EventKind};

/// Result of applying one decision
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub patch: AgentPatch,
    /// In emission order: the action, then speech
    pub events: Vec<Event>,
    /// False when the decision changed nothing about the agent
    pub changed: bool,
}

/// Move `from` toward `to` by at most `step` on each axis
pub fn step_toward(from: Vec2, to: Vec2, step: f32) -> Vec2 {
    let axis = |a: f32, b: f32| {
        let delta = b - a;
        a + delta.signum() * step.min(delta.abs())
    };
    // signum(0.0) is 1.0, min() keeps that harmless
    Vec2::new(axis(from.x, to.x), axis(from.y, to.y))
}

/// Apply `decision` to `agent`
///
/// `lastActionAt` is always set to `now`, even for a no-op.
pub fn apply_decision(agent: &Agent, decision: &Decision, step: f32, now: Timestamp) -> ActionOutcome {
    let mut patch = AgentPatch::new().with_last_action_at(now);
    let mut changed = true;

    match decision.action {
        ActionKind::Move => {
            let target = Vec2::new(
                decision.target.x.unwrap_or(agent.position.x),
                decision.target.y.unwrap_or(agent.position.y),
            );
            let next = step_toward(agent.position, target, step);
            if next == agent.position {
                changed = false;
            } else {
                patch = patch
                    .with_position(next)
                    .with_status(ActionKind::Move.status());
            }
        }
        ActionKind::Gather => {
            patch = patch.with_status(ActionKind::Gather.status());
            if let Some(resource) = decision.target.resource {
                let mut resources = agent.resources.clone();
                resources.push(resource);
                patch = patch.with_resources(resources);
            }
        }
        action => {
            patch = patch.with_status(action.status());
        }
    }

    let mut events = Vec::with_capacity(2);
    if changed {
        events.push(Event::new(now, EventKind::Action, decision.message.clone()));
    }
    if let Some(speech) = &decision.speech {
        events.push(Event::new(
            now,
            EventKind::Speech,
            format!("{} says: \"{}\"", agent.name, speech),
        ));
    }

    ActionOutcome {
        patch,
        events,
        changed,
    }
}

/// Outcome when the provider declined to act: only the cooldown advances
pub fn rest(now: Timestamp) -> ActionOutcome {
    ActionOutcome {
        patch: AgentPatch::new().with_last_action_at(now),
        events: Vec::new(),
        changed: false,
    }
}
