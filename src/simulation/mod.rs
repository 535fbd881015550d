//! Simulation loop: state, timing, perception, decision application

pub mod action_execute;
pub mod clock;
pub mod event_log;
pub mod perception;
pub mod population;
pub mod state;
pub mod tick;

pub use clock::SimClock;
pub use event_log::{Event, EventKind, EventLog};
pub use perception::{DecisionContext, NearbyAgent, Perceiver, Surroundings};
pub use population::{spawn_population, SpawnBounds, MAX_PER_SPECIES};
pub use state::SimState;
pub use tick::{SimulationScheduler, TickReport};
