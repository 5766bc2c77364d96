// voxel_ballistics/engine/tests/integration/engine_tick.rs

use voxel_ballistics_core::concurrent::hitbox_index::SpatialHitboxIndex;
use voxel_ballistics_core::core::config::EngineConfig;
use voxel_ballistics_core::core::types::{BlockPos, BlockRef, ChunkCoord, EntityId, EntityKind, Material, Vec3};
use voxel_ballistics_core::entities::weapon::WeaponProfile;
use voxel_ballistics_core::server::engine::ProjectileEngine;
use voxel_ballistics_core::systems::benchmark::BenchmarkSpawner;
use voxel_ballistics_core::world::voxel_world::VoxelWorld;

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

#[derive(Debug, Default)]
struct HitLog {
    blocks: Vec<(BlockPos, EntityId)>,
    entities: Vec<(EntityId, EntityId, f64)>,
}

fn logging_weapon(log: &Arc<Mutex<HitLog>>) -> Arc<WeaponProfile> {
    let block_log = Arc::clone(log);
    let entity_log = Arc::clone(log);
    Arc::new(
        WeaponProfile {
            projectile_velocity: 2.0,
            projectile_gravity: 0.0,
            projectile_damage: 10.0,
            projectile_damage_min: 2.0,
            projectile_damage_drop_distance: 40.0,
            ..WeaponProfile::new("logger")
        }
        .with_hit_block_handler(
            move |_: &SpatialHitboxIndex, _: &WeaponProfile, _: Vec3, block: BlockRef, source: EntityId| {
                block_log.lock().blocks.push((block.pos, source));
            },
        )
        .with_hit_entity_handler(
            move |index: &SpatialHitboxIndex, _: &WeaponProfile, _: Vec3, target: EntityId, source: EntityId, d: f64| {
                assert!(!index.is_empty());
                entity_log.lock().entities.push((target, source, d));
            },
        ),
    )
}

fn demo_world() -> VoxelWorld {
    let world = VoxelWorld::new();
    world.load_area(ChunkCoord::new(-2, -2), ChunkCoord::new(2, 2));
    world.set_block(BlockPos::new(6, 64, 0), Material::STONE);
    world.spawn_entity(50, EntityKind::Skeleton, Vec3::new(0.5, 64.0, 6.5));
    world
}

#[test]
fn hits_are_routed_to_weapon_handlers() {
    let log = Arc::new(Mutex::new(HitLog::default()));
    let weapon = logging_weapon(&log);
    let mut engine = ProjectileEngine::new(EngineConfig::default()).unwrap();
    engine.add_world(1, Arc::new(demo_world()));

    assert!(engine.add_projectile(1, weapon.create_projectile(10, Vec3::new(0.5, 64.5, 0.5), Vec3::UNIT_X)));
    assert!(engine.add_projectile(1, weapon.create_projectile(11, Vec3::new(0.5, 65.0, 0.5), Vec3::new(0.0, 0.0, 1.0))));

    for _ in 0..5 {
        engine.tick();
    }

    let log = log.lock();
    assert_eq!(log.blocks, vec![(BlockPos::new(6, 64, 0), 10)]);
    assert_eq!(log.entities.len(), 1);
    let (target, source, distance) = log.entities[0];
    assert_eq!((target, source), (50, 11));
    assert!((distance - 5.7).abs() < 1e-4);
    assert!((weapon.damage_at_distance(distance) - 8.86).abs() < 1e-3);
    assert_eq!(engine.total_projectiles(), 0);
    assert_eq!(engine.tick_count(), 5);
}

#[test]
fn visited_columns_are_indexed_per_world() {
    let mut engine = ProjectileEngine::new(EngineConfig::default()).unwrap();
    engine.add_world(1, Arc::new(demo_world()));
    engine.add_world(2, Arc::new(demo_world()));

    let visited = HashMap::from([(2, vec![ChunkCoord::new(0, 0)])]);
    let updates = engine.tick_with_visited(&visited);

    assert_eq!(updates.iter().map(|(id, _)| *id).collect::<Vec<_>>(), vec![1, 2]);
    assert!(updates[0].1.hitboxes.is_empty());
    assert_eq!(updates[1].1.hitboxes.len(), 1);
}

#[test]
fn spawner_keeps_store_full() {
    let mut engine = ProjectileEngine::new(EngineConfig::default()).unwrap();
    let world = VoxelWorld::new();
    world.load_area(ChunkCoord::new(-4, -4), ChunkCoord::new(4, 4));
    engine.add_world(3, Arc::new(world));
    engine.add_benchmark_spawner(
        BenchmarkSpawner::new(3, 1, Vec3::new(0.5, 100.0, 0.5), 30, Arc::new(WeaponProfile::default())).with_seed(5),
    );

    engine.tick();
    assert_eq!(engine.store(3).map(|s| s.size()), Some(30));
    for _ in 0..10 {
        engine.tick();
        assert!(engine.total_projectiles() <= 30);
    }
    assert!(engine.store(3).and_then(|s| s.timings()).map_or(false, |t| t.len() == 11));

    // spawner goes away with its world
    assert!(engine.remove_world(3).is_some());
    assert!(engine.tick().is_empty());
}

#[test]
fn engine_ingress_accepts_projectiles_from_worker_threads() {
    let mut engine = ProjectileEngine::new(EngineConfig::default()).unwrap();
    engine.add_world(1, Arc::new(demo_world()));
    engine.tick();

    let ingress = engine.ingress(1).unwrap();
    let weapon = Arc::new(WeaponProfile { projectile_velocity: 0.5, ..WeaponProfile::default() });
    let worker = thread::spawn(move || {
        for i in 0..10 {
            ingress.add_projectile(weapon.create_projectile(i, Vec3::new(-10.5, 90.0, -10.5), Vec3::new(-1.0, 0.0, 0.0)));
        }
    });
    worker.join().unwrap();

    assert_eq!(engine.store(1).map(|s| s.pending_ingress()), Some(10));
    engine.tick();
    assert_eq!(engine.total_projectiles(), 10);
}
