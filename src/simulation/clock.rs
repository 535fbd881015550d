//! Tick timing
//!
//! Real time waits on a tokio interval; stepped time advances one interval
//! per tick without sleeping.

use std::time::Duration;

use tokio::time::{interval, Instant, Interval, MissedTickBehavior};

use crate::core::types::Timestamp;

pub enum SimClock {
    RealTime { interval: Interval, started: Instant },
    Stepped { now: Timestamp, step_ms: u64 },
}

impl SimClock {
    /// Wall-clock ticks every `period`
    ///
    /// Must be called inside a tokio runtime.
    pub fn real_time(period: Duration) -> Self {
        let mut interval = interval(period);
        // A slow oracle tick should not trigger a burst of catch-up ticks
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self::RealTime {
            interval,
            started: Instant::now(),
        }
    }

    /// Simulated ticks starting at `start`, `step_ms` apart
    pub fn stepped(start: Timestamp, step_ms: u64) -> Self {
        Self::Stepped {
            now: start,
            step_ms,
        }
    }

    /// Wait for the next tick boundary and return its timestamp
    pub async fn next_tick(&mut self) -> Timestamp {
        match self {
            SimClock::RealTime { interval, started } => {
                let at = interval.tick().await;
                let elapsed = at.saturating_duration_since(*started);
                Timestamp::from_millis(elapsed.as_millis() as u64)
            }
            SimClock::Stepped { now, step_ms } => {
                *now = now.advanced_by(*step_ms);
                *now
            }
        }
    }
}
