//! Integration tests for the oracle path
//!
//! A canned completion backend stands in for the HTTP service, so these
//! tests cover prompt building, reply validation, the fallback policy and
//! decree execution end to end.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use society_sim::command::DecreeExecutor;
use society_sim::core::config::SimulationConfig;
use society_sim::core::error::Result;
use society_sim::core::types::{AgentId, Timestamp, Vec2};
use society_sim::decision::OracleProvider;
use society_sim::entity::agent::{ActionStatus, Agent};
use society_sim::entity::species::SpeciesKind;
use society_sim::llm::client::CompletionBackend;
use society_sim::llm::context::WorldSummary;
use society_sim::llm::parser::request_decree;
use society_sim::simulation::{EventKind, SimState, SimulationScheduler};

/// Replies with `replies[i]` to the i-th call, cycling
struct Scripted {
    replies: Vec<&'static str>,
    calls: AtomicUsize,
}

impl Scripted {
    fn new(replies: Vec<&'static str>) -> Self {
        Self {
            replies,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CompletionBackend for Scripted {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.replies[n % self.replies.len()].to_string())
    }
}

fn add(state: &mut SimState, id: &str, x: f32, y: f32) {
    state
        .agents
        .add(Agent::new(
            AgentId::new(id),
            id,
            &SpeciesKind::Builders.preset(),
            Vec2::new(x, y),
            Timestamp::ZERO,
        ))
        .unwrap();
}

fn oracle_scheduler(config: &SimulationConfig, backend: Scripted) -> SimulationScheduler {
    SimulationScheduler::new(
        config.clone(),
        Arc::new(OracleProvider::new(backend, Duration::from_secs(5))),
    )
}

#[tokio::test]
async fn test_reply_without_action_falls_back() {
    let config = SimulationConfig::default();
    let mut state = SimState::new(&config).unwrap();
    add(&mut state, "X", 8.0, 8.0);

    let scheduler = oracle_scheduler(&config, Scripted::new(vec![r#"{"message": "pondering"}"#]));
    let report = scheduler.tick(&mut state, Timestamp(2000)).await;

    assert_eq!(report.failed, 1);
    let x = state.agents.get(&AgentId::new("X")).unwrap();
    assert_eq!(x.position, Vec2::new(8.0, 8.0));
    assert_eq!(x.status, ActionStatus::Idle);
    assert_eq!(x.last_action_at, Timestamp(2000));

    assert_eq!(state.events.len(), 1);
    assert_eq!(state.events.latest().unwrap().kind, EventKind::Error);
}

#[tokio::test]
async fn test_reply_without_target_falls_back() {
    let config = SimulationConfig::default();
    let mut state = SimState::new(&config).unwrap();
    add(&mut state, "Y", 4.0, 4.0);

    let scheduler = oracle_scheduler(
        &config,
        Scripted::new(vec![r#"{"message": "off I go", "action": "move"}"#]),
    );
    let report = scheduler.tick(&mut state, Timestamp(2000)).await;

    assert_eq!(report.failed, 1);
    assert_eq!(report.rested, 0);
    let y = state.agents.get(&AgentId::new("Y")).unwrap();
    assert_eq!(y.position, Vec2::new(4.0, 4.0));
    let error = state.events.latest().unwrap();
    assert_eq!(error.kind, EventKind::Error);
    assert!(error.message.contains("target"));
}

#[tokio::test]
async fn test_one_bad_reply_does_not_block_others() {
    let config = SimulationConfig::default();
    let mut state = SimState::new(&config).unwrap();
    add(&mut state, "first", 0.0, 0.0);
    add(&mut state, "second", 30.0, 0.0);

    let scheduler = oracle_scheduler(
        &config,
        Scripted::new(vec![
            "not json at all",
            r#"Here you go: {"message": "second builds", "action": "build", "target": {}, "speech": "Up it goes"}"#,
        ]),
    );
    let report = scheduler.tick(&mut state, Timestamp(2000)).await;
    assert_eq!(report.failed, 1);
    assert_eq!(report.applied, 1);

    let second = state.agents.get(&AgentId::new("second")).unwrap();
    assert_eq!(second.status, ActionStatus::Building);

    // Newest first: speech, action, then the first agent's error
    let kinds: Vec<EventKind> = state.events.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![EventKind::Speech, EventKind::Action, EventKind::Error]);
}

#[tokio::test]
async fn test_decree_spawns_agents_for_next_tick() {
    let config = SimulationConfig::default();
    let mut state = SimState::new(&config).unwrap();
    add(&mut state, "elder", 1.0, 1.0);

    let backend = Scripted::new(vec![
        r#"{"message": "New blood arrives", "actions": ["spawn Traders 2", "remove elder", "smite"], "priority": "high"}"#,
    ]);
    let summary = WorldSummary::from_state(&state);
    assert!(summary.summary().contains("Builders: 1"));

    let decree = request_decree(&backend, "bring traders", &summary).await.unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let result = DecreeExecutor::execute(&config, &mut state, &decree, Timestamp(1000), &mut rng);

    assert_eq!(result.spawned.len(), 2);
    assert_eq!(result.removed, vec![AgentId::new("elder")]);
    assert_eq!(result.unrecognized, vec!["smite".to_string()]);
    assert_eq!(state.agents.len(), 2);
    assert!(state.agents.list().all(|a| a.species == SpeciesKind::Traders));
    assert!(state.events.iter().all(|e| e.kind == EventKind::Info));
    // Decree message, two arrivals, one departure
    assert_eq!(state.events.len(), 4);
}
