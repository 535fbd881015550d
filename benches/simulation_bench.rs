use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use society_sim::core::config::SimulationConfig;
use society_sim::core::types::Timestamp;
use society_sim::decision::{Dice, RuleBasedProvider};
use society_sim::entity::species::SpeciesKind;
use society_sim::simulation::{spawn_population, SimState, SimulationScheduler, SpawnBounds};
use society_sim::world::{ChunkCoord, ChunkGenerator, WorldStreamer};

fn bench_chunk_generate(c: &mut Criterion) {
    let generator = ChunkGenerator::new(&SimulationConfig::default()).unwrap();
    let mut i = 0;
    c.bench_function("chunk_generate_16x16", |b| {
        b.iter(|| {
            i += 1;
            black_box(generator.generate(ChunkCoord::new(i, -i)))
        })
    });
}

fn bench_viewport_fill(c: &mut Criterion) {
    let config = SimulationConfig::default();
    c.bench_function("viewport_fill_25_chunks", |b| {
        b.iter(|| {
            let mut world = WorldStreamer::new(&config).unwrap();
            black_box(world.center_on(ChunkCoord::new(0, 0)))
        })
    });
}

fn bench_rule_tick(c: &mut Criterion) {
    let config = SimulationConfig::default();
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut state = SimState::new(&config).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    spawn_population(
        &config,
        &mut state.agents,
        &SpeciesKind::ALL.map(|kind| (kind, 20)),
        SpawnBounds::from_config(&config),
        &mut rng,
        Timestamp::ZERO,
    )
    .unwrap();
    state.follow_population();

    let scheduler = SimulationScheduler::new(
        config.clone(),
        Arc::new(RuleBasedProvider::new(&config, Dice::seeded(1))),
    );

    // Every tick lands a full cooldown after the last, so all 80 agents act
    let mut now = Timestamp::ZERO;
    c.bench_function("rule_tick_80_agents", |b| {
        b.iter(|| {
            now = now.advanced_by(config.action_cooldown_ms);
            black_box(rt.block_on(scheduler.tick(&mut state, now)))
        })
    });
}

criterion_group!(benches, bench_chunk_generate, bench_viewport_fill, bench_rule_tick);
criterion_main!(benches);
