// voxel_ballistics/engine/src/operational/monitoring/metrics.rs
use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Duration;

pub const HITBOX_INDEX_SECONDS: &str = "projectile_hitbox_index_seconds";
pub const UPDATE_SECONDS: &str = "projectile_update_seconds";
pub const PROJECTILES_ACTIVE: &str = "projectiles_active";
pub const BLOCK_HITS_TOTAL: &str = "projectile_block_hits_total";
pub const ENTITY_HITS_TOTAL: &str = "projectile_entity_hits_total";
pub const RETIRED_TOTAL: &str = "projectiles_retired_total";
pub const INGRESS_DRAINED_TOTAL: &str = "projectiles_ingress_drained_total";

// The host installs the recorder; without one every call here is a no-op.
pub fn describe_metrics() {
    describe_histogram!(HITBOX_INDEX_SECONDS, Unit::Seconds, "Ingress drain, integration and hitbox index build time per store tick");
    describe_histogram!(UPDATE_SECONDS, Unit::Seconds, "Raytrace and compaction time per store tick");
    describe_gauge!(PROJECTILES_ACTIVE, "Live projectiles after the last update, per world");
    describe_counter!(BLOCK_HITS_TOTAL, "Projectiles stopped by a block");
    describe_counter!(ENTITY_HITS_TOTAL, "Projectiles stopped by an entity hitbox");
    describe_counter!(RETIRED_TOTAL, "Projectiles retired for any reason");
    describe_counter!(INGRESS_DRAINED_TOTAL, "Projectiles moved from the ingress queue into a store");
}

/// One store tick's worth of counters, recorded under a `world` label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreTickMetrics {
    pub active: usize,
    pub drained: usize,
    pub block_hits: usize,
    pub entity_hits: usize,
    pub retired: usize,
}

pub fn record_store_tick(world: u64, tick: &StoreTickMetrics, hitbox_index: Duration, update: Duration) {
    let world = world.to_string();
    histogram!(HITBOX_INDEX_SECONDS, "world" => world.clone()).record(hitbox_index.as_secs_f64());
    histogram!(UPDATE_SECONDS, "world" => world.clone()).record(update.as_secs_f64());
    gauge!(PROJECTILES_ACTIVE, "world" => world.clone()).set(tick.active as f64);
    counter!(BLOCK_HITS_TOTAL, "world" => world.clone()).increment(tick.block_hits as u64);
    counter!(ENTITY_HITS_TOTAL, "world" => world.clone()).increment(tick.entity_hits as u64);
    counter!(RETIRED_TOTAL, "world" => world.clone()).increment(tick.retired as u64);
    counter!(INGRESS_DRAINED_TOTAL, "world" => world).increment(tick.drained as u64);
}

// Logging setup
pub fn init_logging() -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voxel_ballistics_core=info,warn".into()),
        )
        .with(fmt::layer())
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    Ok(())
}
