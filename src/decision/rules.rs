//! Rule table keyed on species
//!
//! Synchronous and infallible. Each species has one signature action gated
//! by a draw against its profile threshold:
//! - Gatherers gather a resource of their tile, or wander if it has none
//! - Builders build
//! - Explorers explore, otherwise wander
//! - Traders trade with the closest nearby agent, otherwise wander
//!
//! A failed gate for Gatherers or Builders means the agent rests this tick.

use std::sync::Mutex;

use ahash::AHashMap;
use async_trait::async_trait;

use crate::core::config::SimulationConfig;
use crate::core::error::DecisionError;
use crate::core::types::Vec2;
use crate::decision::dice::Dice;
use crate::decision::{ActionKind, Decision, DecisionProvider, DecisionTarget};
use crate::entity::agent::Agent;
use crate::entity::species::{SpeciesKind, SpeciesProfile};
use crate::simulation::perception::DecisionContext;

/// Farthest a wander target lies from the agent on either axis
const WANDER_RANGE: f32 = 5.0;

pub struct RuleBasedProvider {
    profiles: AHashMap<SpeciesKind, SpeciesProfile>,
    dice: Mutex<Dice>,
}

impl RuleBasedProvider {
    pub fn new(config: &SimulationConfig, dice: Dice) -> Self {
        let profiles = SpeciesKind::ALL
            .into_iter()
            .map(|kind| (kind, config.species_profile(kind)))
            .collect();
        Self {
            profiles,
            dice: Mutex::new(dice),
        }
    }

    /// Choose synchronously; the async trait method only wraps this
    pub fn choose(&self, agent: &Agent, context: &DecisionContext) -> Option<Decision> {
        let threshold = self
            .profiles
            .get(&agent.species)
            .map(|p| p.action_threshold)
            .unwrap_or_else(|| agent.species.preset().action_threshold);

        // A poisoned lock only means another decide panicked mid-draw
        let mut dice = self.dice.lock().unwrap_or_else(|e| e.into_inner());

        match agent.species {
            SpeciesKind::Gatherers => {
                if dice.roll() <= threshold {
                    return None;
                }
                match dice.pick(&context.surroundings.resources) {
                    Some(&resource) => Some(Decision::new(
                        ActionKind::Gather,
                        DecisionTarget::resource(resource),
                        format!("{} gathered {}", agent.name, resource),
                    )),
                    None => Some(wander(agent, &mut dice)),
                }
            }
            SpeciesKind::Builders => {
                if dice.roll() <= threshold {
                    return None;
                }
                Some(Decision::new(
                    ActionKind::Build,
                    DecisionTarget::position(agent.position),
                    format!(
                        "{} is building a shelter on the {}",
                        agent.name,
                        context.surroundings.biome_name()
                    ),
                ))
            }
            SpeciesKind::Explorers => {
                if dice.roll() > threshold {
                    Some(Decision::new(
                        ActionKind::Explore,
                        DecisionTarget::default(),
                        format!(
                            "{} is exploring the {}",
                            agent.name,
                            context.surroundings.biome_name()
                        ),
                    ))
                } else {
                    Some(wander(agent, &mut dice))
                }
            }
            SpeciesKind::Traders => match context.closest() {
                Some(partner) => Some(Decision::new(
                    ActionKind::Trade,
                    DecisionTarget::agent(partner.id.clone()),
                    format!("{} traded with {}", agent.name, partner.name),
                )),
                None => Some(wander(agent, &mut dice)),
            },
        }
    }
}

fn wander(agent: &Agent, dice: &mut Dice) -> Decision {
    let target = agent.position + Vec2::new(dice.offset(WANDER_RANGE), dice.offset(WANDER_RANGE));
    Decision::new(
        ActionKind::Move,
        DecisionTarget::position(target),
        format!("{} wanders", agent.name),
    )
}

#[async_trait]
impl DecisionProvider for RuleBasedProvider {
    fn name(&self) -> &str {
        "rules"
    }

    async fn decide(
        &self,
        agent: &Agent,
        context: &DecisionContext,
    ) -> Result<Option<Decision>, DecisionError> {
        Ok(self.choose(agent, context))
    }
}
