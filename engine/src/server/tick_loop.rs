// voxel_ballistics/engine/src/server/tick_loop.rs
use crate::core::constants::SLOW_TICK_SLACK_MS;
use crate::server::engine::ProjectileEngine;
use crate::world::WorldView;
use std::time::{Duration, Instant};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickLoopStats {
    pub ticks: u64,
    pub slow_ticks: u64,
    pub block_hits: u64,
    pub entity_hits: u64,
    pub busy_time: Duration,
    pub max_tick: Duration,
}

impl TickLoopStats {
    pub fn average_tick(&self) -> Duration {
        if self.ticks == 0 {
            Duration::ZERO
        } else {
            self.busy_time / self.ticks as u32
        }
    }
}

/// Drives `engine.tick()` at the configured tick rate until `max_ticks` have run.
///
/// Meant for a `current_thread` runtime, so every tick runs on the thread the stores are bound
/// to. On a multi-thread runtime the task may resume on another worker; each tick rebinds the
/// stores to whichever thread is running it.
pub async fn run_tick_loop<W: WorldView + ?Sized>(engine: &mut ProjectileEngine<W>, max_ticks: u64) -> TickLoopStats {
    let tick_duration = engine.config().tick_duration();
    let slow_threshold = tick_duration + Duration::from_millis(SLOW_TICK_SLACK_MS);
    let mut tick_timer = interval(tick_duration);
    tick_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut stats = TickLoopStats::default();

    info!("Tick loop started: {:?} per tick, {} ticks", tick_duration, max_ticks);

    while stats.ticks < max_ticks {
        tick_timer.tick().await;
        let tick_start = Instant::now();

        engine.bind_to_current_thread();
        for (_, update) in engine.tick() {
            stats.block_hits += update.hit_blocks.len() as u64;
            stats.entity_hits += update.hit_entities.len() as u64;
        }

        let elapsed = tick_start.elapsed();
        stats.ticks += 1;
        stats.busy_time += elapsed;
        stats.max_tick = stats.max_tick.max(elapsed);
        if elapsed > slow_threshold {
            stats.slow_ticks += 1;
            warn!("Tick {} took too long: {:?}", engine.tick_count(), elapsed);
        }
    }

    info!(
        "Tick loop finished: {} ticks, avg {:?}, max {:?}, {} slow",
        stats.ticks,
        stats.average_tick(),
        stats.max_tick,
        stats.slow_ticks
    );
    stats
}
