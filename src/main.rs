//! Society Sim - Entry Point
//!
//! Spawns a population, then runs the tick loop headless and prints the
//! event log as it grows. The viewport follows the population centroid.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::runtime::Runtime;

use society_sim::command::DecreeExecutor;
use society_sim::core::config::SimulationConfig;
use society_sim::core::error::Result;
use society_sim::core::types::Timestamp;
use society_sim::decision::{DecisionProvider, Dice, OracleProvider, RuleBasedProvider};
use society_sim::entity::species::SpeciesKind;
use society_sim::llm::client::LlmClient;
use society_sim::llm::context::WorldSummary;
use society_sim::llm::parser::request_decree;
use society_sim::simulation::{
    spawn_population, SimClock, SimState, SimulationScheduler, SpawnBounds,
};

/// Headless agent society simulation
#[derive(Parser, Debug)]
#[command(name = "society-sim")]
#[command(about = "Run a chunk-streamed agent society and print its event log")]
struct Args {
    /// TOML configuration file; absent keys keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(long, default_value_t = 20)]
    ticks: u64,

    /// World and decision seed (overrides the config's world_seed)
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 3)]
    gatherers: usize,

    #[arg(long, default_value_t = 2)]
    builders: usize,

    #[arg(long, default_value_t = 2)]
    explorers: usize,

    #[arg(long, default_value_t = 2)]
    traders: usize,

    /// Ask the external oracle instead of the rule table (needs LLM_API_KEY)
    #[arg(long)]
    oracle: bool,

    /// Petition the oracle for a decree before the first tick
    #[arg(long)]
    decree: Option<String>,

    /// Step simulated time without sleeping between ticks
    #[arg(long)]
    fast: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "society_sim=info".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.world_seed = seed;
    }
    config.validate()?;

    let rt = Runtime::new()?;
    rt.block_on(run(args, config))
}

async fn run(args: Args, config: SimulationConfig) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.world_seed);
    let mut state = SimState::new(&config)?;

    let requests = [
        (SpeciesKind::Gatherers, args.gatherers),
        (SpeciesKind::Builders, args.builders),
        (SpeciesKind::Explorers, args.explorers),
        (SpeciesKind::Traders, args.traders),
    ];
    spawn_population(
        &config,
        &mut state.agents,
        &requests,
        SpawnBounds::from_config(&config),
        &mut rng,
        Timestamp::ZERO,
    )?;
    state.follow_population();

    // Needed for --oracle and --decree; either works without the other
    let client = if args.oracle || args.decree.is_some() {
        match LlmClient::from_env() {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!("{} - oracle features disabled", e);
                None
            }
        }
    } else {
        None
    };

    if let (Some(prompt), Some(client)) = (&args.decree, &client) {
        let summary = WorldSummary::from_state(&state);
        match request_decree(client, prompt, &summary).await {
            Ok(decree) => {
                let result =
                    DecreeExecutor::execute(&config, &mut state, &decree, Timestamp::ZERO, &mut rng);
                println!(
                    "Decree: {} (+{} / -{} agents)",
                    decree.message,
                    result.spawned.len(),
                    result.removed.len()
                );
                for line in &result.unrecognized {
                    println!("  ignored: {}", line);
                }
            }
            Err(e) => tracing::warn!("decree request failed: {}", e),
        }
    }

    let provider: Arc<dyn DecisionProvider> = match client {
        Some(client) if args.oracle => {
            Arc::new(OracleProvider::new(client, config.oracle_timeout()))
        }
        _ => Arc::new(RuleBasedProvider::new(
            &config,
            Dice::seeded(config.world_seed.wrapping_add(1)),
        )),
    };

    let mut clock = if args.fast {
        SimClock::stepped(Timestamp::ZERO, config.tick_interval_ms)
    } else {
        SimClock::real_time(config.tick_interval())
    };

    let scheduler = SimulationScheduler::new(config, provider);
    tracing::info!(
        provider = scheduler.provider_name(),
        agents = state.agents.len(),
        "simulation starting"
    );

    print_new_events(&state, 0);
    let mut printed = state.events.total_appended();
    scheduler
        .run(&mut state, &mut clock, Some(args.ticks), |state, report| {
            print_new_events(state, printed);
            printed = state.events.total_appended();
            if report.failed > 0 {
                println!("  ({} decision(s) failed this tick)", report.failed);
            }
        })
        .await;

    println!(
        "\nFinished {} ticks: {} agents, {} chunks streamed.",
        state.current_tick,
        state.agents.len(),
        state.world.cached_chunks()
    );
    for agent in state.agents.list() {
        println!(
            "  {:<14} {:<13} ({:>5.1}, {:>5.1}) {:?}",
            agent.name,
            agent.status.to_string(),
            agent.position.x,
            agent.position.y,
            agent.resources
        );
    }
    Ok(())
}

/// Print events appended since `seen`, oldest first
fn print_new_events(state: &SimState, seen: u64) {
    let fresh = (state.events.total_appended() - seen) as usize;
    let fresh: Vec<_> = state.events.iter().take(fresh).collect();
    for event in fresh.into_iter().rev() {
        println!("[{:>8}] {:<6} {}", event.timestamp.to_string(), event.kind.to_string(), event.message);
    }
}
