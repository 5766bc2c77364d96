// voxel_ballistics/engine/src/main.rs
use voxel_ballistics_core::concurrent::hitbox_index::SpatialHitboxIndex;
use voxel_ballistics_core::core::config::EngineConfig;
use voxel_ballistics_core::core::types::{BlockPos, BlockRef, ChunkCoord, EntityId, EntityKind, Material, Vec3};
use voxel_ballistics_core::entities::weapon::WeaponProfile;
use voxel_ballistics_core::operational::monitoring::metrics::init_logging;
use voxel_ballistics_core::server::engine::ProjectileEngine;
use voxel_ballistics_core::server::tick_loop::run_tick_loop;
use voxel_ballistics_core::systems::benchmark::BenchmarkSpawner;
use voxel_ballistics_core::world::voxel_world::VoxelWorld;

use anyhow::Context;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::info;

const BENCH_WORLD: u64 = 1;
const SHOOTER: EntityId = 1;
const DEFAULT_PROJECTILES: usize = 2000;
const DEFAULT_TICKS: u64 = 200;

struct BenchArgs {
    config: EngineConfig,
    projectiles: usize,
    ticks: u64,
}

// ballistics-bench [config.yaml] [projectiles] [ticks]
fn parse_args() -> anyhow::Result<BenchArgs> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) if path != "-" => EngineConfig::from_yaml_file(&path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        _ => EngineConfig::default(),
    };
    let projectiles = match args.next() {
        Some(n) => n.parse().with_context(|| format!("Invalid projectile count: {}", n))?,
        None => DEFAULT_PROJECTILES,
    };
    let ticks = match args.next() {
        Some(n) => n.parse().with_context(|| format!("Invalid tick count: {}", n))?,
        None => DEFAULT_TICKS,
    };
    Ok(BenchArgs { config, projectiles, ticks })
}

// Flat stone floor with a ring of pillars and a crowd of zombies around the shooter.
fn build_demo_world() -> VoxelWorld {
    let world = VoxelWorld::new();
    world.load_area(ChunkCoord::new(-8, -8), ChunkCoord::new(7, 7));
    world.fill(BlockPos::new(-128, 60, -128), BlockPos::new(127, 63, 127), Material::STONE);

    for i in 0..32 {
        let angle = i as f32 / 32.0 * std::f32::consts::TAU;
        let (x, z) = ((angle.cos() * 48.0) as i32, (angle.sin() * 48.0) as i32);
        world.fill(BlockPos::new(x, 64, z), BlockPos::new(x + 1, 72, z + 1), Material::STONE);
    }

    world.spawn_entity(SHOOTER, EntityKind::Player, Vec3::new(0.5, 64.0, 0.5));
    let mut next_id = 100;
    for ring in 1..=4 {
        for i in 0..16 {
            let angle = i as f32 / 16.0 * std::f32::consts::TAU;
            let r = ring as f32 * 10.0;
            world.spawn_entity(next_id, EntityKind::Zombie, Vec3::new(angle.cos() * r, 64.0, angle.sin() * r));
            next_id += 1;
        }
    }
    world
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {:?}", e);
        return Err(e);
    }

    let args = parse_args()?;
    let block_hits = Arc::new(AtomicU64::new(0));
    let entity_hits = Arc::new(AtomicU64::new(0));
    let block_counter = Arc::clone(&block_hits);
    let entity_counter = Arc::clone(&entity_hits);

    let weapon = Arc::new(
        WeaponProfile::new("bench-rifle")
            .with_hit_block_handler(move |_: &SpatialHitboxIndex, _: &WeaponProfile, _: Vec3, _: BlockRef, _: EntityId| {
                block_counter.fetch_add(1, AtomicOrdering::Relaxed);
            })
            .with_hit_entity_handler(
                move |_: &SpatialHitboxIndex, _: &WeaponProfile, _: Vec3, _: EntityId, _: EntityId, _: f64| {
                    entity_counter.fetch_add(1, AtomicOrdering::Relaxed);
                },
            ),
    );

    let mut engine = ProjectileEngine::new(args.config).context("Failed to create projectile engine")?;
    let world = Arc::new(build_demo_world());
    info!(
        "Demo world ready: {} columns, {} blocks, {} entities",
        world.loaded_chunk_count(),
        world.block_count(),
        world.entity_count()
    );
    engine.add_world(BENCH_WORLD, Arc::clone(&world));
    engine.add_benchmark_spawner(BenchmarkSpawner::new(
        BENCH_WORLD,
        SHOOTER,
        Vec3::new(0.5, 65.6, 0.5),
        args.projectiles,
        Arc::clone(&weapon),
    ));

    // Off-thread producer: exercises the ingress path alongside the spawner.
    let ingress = engine.ingress(BENCH_WORLD)?;
    let stop = Arc::new(AtomicBool::new(false));
    let producer_stop = Arc::clone(&stop);
    let producer_weapon = Arc::clone(&weapon);
    let tick_duration = engine.config().tick_duration();
    let producer = thread::spawn(move || {
        let mut sent = 0u64;
        while !producer_stop.load(AtomicOrdering::Relaxed) {
            let direction = Vec3::new((sent % 7) as f32 - 3.0, 0.2, (sent % 5) as f32 - 2.0);
            ingress.add_projectile(producer_weapon.create_projectile(SHOOTER, Vec3::new(0.5, 65.6, 0.5), direction));
            sent += 1;
            thread::sleep(tick_duration / 4);
        }
        sent
    });

    let stats = run_tick_loop(&mut engine, args.ticks).await;

    stop.store(true, AtomicOrdering::Relaxed);
    let sent = producer.join().map_err(|_| anyhow::anyhow!("Ingress producer thread panicked"))?;

    let store = engine.store(BENCH_WORLD).context("Benchmark world disappeared")?;
    info!(
        "Benchmark done: {} ticks, avg {:?}, max {:?}, {} slow, {} block hits, {} entity hits, {} sent via ingress, {} live",
        stats.ticks,
        stats.average_tick(),
        stats.max_tick,
        stats.slow_ticks,
        block_hits.load(AtomicOrdering::Relaxed),
        entity_hits.load(AtomicOrdering::Relaxed),
        sent,
        store.size()
    );
    if let Some(timings) = store.timings() {
        let avg = timings.average();
        let max = timings.max();
        info!(
            "Store timings over last {} ticks: hitbox index avg {:?} / max {:?}, update avg {:?} / max {:?}",
            timings.len(),
            avg.hitbox_index,
            max.hitbox_index,
            avg.projectile_update,
            max.projectile_update
        );
    }
    if stats.average_tick() > Duration::ZERO {
        let throughput = args.projectiles as f64 / stats.average_tick().as_secs_f64();
        info!("~{:.0} projectile updates per second", throughput);
    }
    Ok(())
}
