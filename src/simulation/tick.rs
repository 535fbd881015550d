//! Tick system - orchestrates simulation updates
//!
//! One tick: snapshot -> eligibility -> perception -> decide -> apply.
//!
//! Decision calls for all eligible agents are dispatched together and awaited
//! as a group; results are then applied one agent at a time in registry
//! order, so event order within a tick is deterministic for any provider.

use std::sync::Arc;

use ahash::AHashMap;
use futures::future::join_all;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task::block_in_place;
use tracing::{debug, warn};

use crate::core::config::SimulationConfig;
use crate::core::types::{Tick, Timestamp};
use crate::decision::{Decision, DecisionProvider};
use crate::entity::species::SpeciesKind;
use crate::simulation::action_execute::{apply_decision, rest};
use crate::simulation::clock::SimClock;
use crate::simulation::event_log::EventKind;
use crate::simulation::perception::{DecisionContext, Perceiver};
use crate::simulation::state::SimState;

/// Counts for one tick
///
/// Every dispatched agent lands in exactly one of `applied`, `rested` and
/// `failed`, except an agent removed while its decision was in flight,
/// which lands in none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: Tick,
    pub now: Timestamp,
    /// Agents whose provider was asked for a decision
    pub dispatched: usize,
    /// Agents whose decision changed something
    pub applied: usize,
    /// Agents that chose to do nothing, or whose decision was a no-op
    pub rested: usize,
    /// Provider failures; their fallback decision is not also counted as rested
    pub failed: usize,
    pub events_emitted: usize,
}

pub struct SimulationScheduler {
    config: SimulationConfig,
    provider: Arc<dyn DecisionProvider>,
    steps: AHashMap<SpeciesKind, f32>,
}

impl SimulationScheduler {
    pub fn new(config: SimulationConfig, provider: Arc<dyn DecisionProvider>) -> Self {
        let steps = SpeciesKind::ALL
            .into_iter()
            .map(|kind| (kind, config.species_profile(kind).step))
            .collect();
        Self {
            config,
            provider,
            steps,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    fn step_for(&self, kind: SpeciesKind) -> f32 {
        self.steps.get(&kind).copied().unwrap_or(1.0)
    }

    /// Run one tick at time `now`
    pub async fn tick(&self, state: &mut SimState, now: Timestamp) -> TickReport {
        state.current_tick += 1;
        let mut report = TickReport {
            tick: state.current_tick,
            now,
            ..TickReport::default()
        };

        // Agents added while this tick runs wait for the next one
        let snapshot = state.agents.snapshot();
        let eligible: Vec<usize> = snapshot
            .iter()
            .enumerate()
            .filter(|(_, agent)| agent.is_eligible(now, self.config.action_cooldown_ms))
            .map(|(idx, _)| idx)
            .collect();
        if eligible.is_empty() {
            debug!(tick = report.tick, "no eligible agents");
            return report;
        }

        let perceiver = Perceiver::new(&snapshot, self.config.nearby_radius);
        let contexts: Vec<DecisionContext> = eligible
            .iter()
            .map(|&idx| perceiver.perceive(idx, &state.world))
            .collect();

        let provider = self.provider.as_ref();
        let results = join_all(eligible.iter().zip(&contexts).map(|(&idx, context)| {
            let agent = &snapshot[idx];
            debug!(agent = %agent.id, provider = provider.name(), "dispatching decision");
            provider.decide(agent, context)
        }))
        .await;
        report.dispatched = eligible.len();

        for (&idx, result) in eligible.iter().zip(results) {
            let agent = &snapshot[idx];
            let step = self.step_for(agent.species);

            let failed = result.is_err();
            let outcome = match result {
                Ok(Some(decision)) => apply_decision(agent, &decision, step, now),
                Ok(None) => rest(now),
                Err(err) => {
                    warn!(agent = %agent.id, error = %err, "decision failed, using fallback");
                    state.events.push(
                        now,
                        EventKind::Error,
                        format!("{} could not decide: {}", agent.name, err),
                    );
                    report.events_emitted += 1;
                    apply_decision(agent, &Decision::fallback(agent), step, now)
                }
            };

            // Removal during the decide phase is the only way this fails
            if let Err(err) = state.agents.patch(&agent.id, outcome.patch) {
                warn!(agent = %agent.id, error = %err, "dropping decision for vanished agent");
                continue;
            }

            if failed {
                report.failed += 1;
            } else if outcome.changed {
                report.applied += 1;
            } else {
                report.rested += 1;
            }
            report.events_emitted += outcome.events.len();
            for event in outcome.events {
                state.events.append(event);
            }
        }

        debug!(
            tick = report.tick,
            dispatched = report.dispatched,
            applied = report.applied,
            rested = report.rested,
            failed = report.failed,
            "tick complete"
        );
        report
    }

    /// Tick until `max_ticks` have run, or forever when `None`
    ///
    /// Before each tick the world streams chunks around the population.
    /// `observer` sees the state after every tick.
    pub async fn run<F>(
        &self,
        state: &mut SimState,
        clock: &mut SimClock,
        max_ticks: Option<u64>,
        mut observer: F,
    ) -> Vec<TickReport>
    where
        F: FnMut(&SimState, &TickReport),
    {
        let mut reports = Vec::new();
        let mut ran = 0u64;
        while max_ticks.map_or(true, |max| ran < max) {
            let now = clock.next_tick().await;
            stream_world(state);
            let report = self.tick(state, now).await;
            observer(state, &report);
            // Unbounded runs would otherwise accumulate every report
            if max_ticks.is_some() {
                reports.push(report);
            }
            ran += 1;
        }
        reports
    }
}

/// Follow the population, off the async worker when the runtime allows it
///
/// Chunk generation is blocking CPU work. A multi-threaded runtime hands
/// the worker's other tasks to a new thread for its duration; a
/// current-thread runtime cannot, so there it runs inline.
fn stream_world(state: &mut SimState) -> usize {
    match Handle::try_current().map(|handle| handle.runtime_flavor()) {
        Ok(RuntimeFlavor::MultiThread) => block_in_place(|| state.follow_population()),
        _ => state.follow_population(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::DecisionError;
    use crate::core::types::{AgentId, Vec2};
    use crate::decision::{ActionKind, DecisionTarget};
    use crate::entity::agent::{ActionStatus, Agent};
    use async_trait::async_trait;

    /// Moves everyone one step east; fails for agents named in `fail_for`
    struct EastOrFail {
        fail_for: Vec<&'static str>,
    }

    #[async_trait]
    impl DecisionProvider for EastOrFail {
        fn name(&self) -> &str {
            "east"
        }

        async fn decide(
            &self,
            agent: &Agent,
            _context: &DecisionContext,
        ) -> Result<Option<Decision>, DecisionError> {
            if self.fail_for.contains(&agent.id.as_str()) {
                return Err(DecisionError::Unavailable("offline".into()));
            }
            let target = agent.position + Vec2::new(10.0, 0.0);
            Ok(Some(Decision::new(
                ActionKind::Move,
                DecisionTarget::position(target),
                format!("{} heads east", agent.name),
            )))
        }
    }

    fn state_with(ids: &[&str]) -> SimState {
        let mut state = SimState::new(&SimulationConfig::default()).unwrap();
        for (i, id) in ids.iter().enumerate() {
            state
                .agents
                .add(Agent::new(
                    AgentId::new(*id),
                    *id,
                    &SpeciesKind::Builders.preset(),
                    Vec2::new(i as f32 * 20.0, 0.0),
                    Timestamp::ZERO,
                ))
                .unwrap();
        }
        state
    }

    fn scheduler(fail_for: Vec<&'static str>) -> SimulationScheduler {
        SimulationScheduler::new(
            SimulationConfig::default(),
            Arc::new(EastOrFail { fail_for }),
        )
    }

    #[tokio::test]
    async fn test_cooling_agents_are_skipped() {
        let mut state = state_with(&["a"]);
        let report = scheduler(vec![]).tick(&mut state, Timestamp(1999)).await;
        assert_eq!(report.dispatched, 0);
        assert_eq!(state.current_tick, 1);
        assert!(state.events.is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let mut state = state_with(&["a", "b"]);
        let report = scheduler(vec!["a"]).tick(&mut state, Timestamp(2000)).await;

        assert_eq!(report.dispatched, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.applied, 1);
        assert_eq!(report.rested, 0);
        assert_eq!(report.applied + report.rested + report.failed, report.dispatched);

        let a = state.agents.get(&AgentId::new("a")).unwrap();
        assert_eq!(a.position, Vec2::new(0.0, 0.0));
        assert_eq!(a.status, ActionStatus::Idle);
        assert_eq!(a.last_action_at, Timestamp(2000));

        let b = state.agents.get(&AgentId::new("b")).unwrap();
        assert_eq!(b.position, Vec2::new(21.0, 0.0));
        assert_eq!(b.status, ActionStatus::Moving);

        // Newest first: b's action was appended after a's error
        let kinds: Vec<EventKind> = state.events.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::Action, EventKind::Error]);
    }

    #[tokio::test]
    async fn test_all_failures_count_once() {
        let mut state = state_with(&["a", "b", "c"]);
        let report = scheduler(vec!["a", "b", "c"]).tick(&mut state, Timestamp(2000)).await;

        assert_eq!(report.dispatched, 3);
        assert_eq!(report.failed, 3);
        assert_eq!(report.applied, 0);
        assert_eq!(report.rested, 0);
        assert_eq!(report.events_emitted, 3);
    }

    #[tokio::test]
    async fn test_run_with_stepped_clock_respects_cooldown() {
        let mut state = state_with(&["a"]);
        let mut clock = SimClock::stepped(Timestamp::ZERO, 1000);
        let mut seen = Vec::new();
        let reports = scheduler(vec![])
            .run(&mut state, &mut clock, Some(6), |_, r| seen.push(r.dispatched))
            .await;

        assert_eq!(reports.len(), 6);
        // Acts at 2000, 4000 and 6000
        assert_eq!(seen, vec![0, 1, 0, 1, 0, 1]);
        let a = state.agents.get(&AgentId::new("a")).unwrap();
        assert_eq!(a.position, Vec2::new(3.0, 0.0));
        assert_eq!(a.last_action_at, Timestamp(6000));
        assert!(state.world.cached_chunks() >= 25);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_run_on_multi_thread_runtime_streams_world() {
        let mut state = state_with(&["a", "b"]);
        let mut clock = SimClock::stepped(Timestamp::ZERO, 1000);
        let side = tokio::spawn(async { 7 });

        let reports = scheduler(vec![]).run(&mut state, &mut clock, Some(2), |_, _| {}).await;

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].applied, 2);
        assert!(state.world.cached_chunks() >= 25);
        assert_eq!(side.await.unwrap(), 7);
    }
}
