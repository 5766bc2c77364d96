// voxel_ballistics/engine/tests/performance/tick_stress.rs

use std::sync::Arc;
use std::time::Instant;
use metrics::histogram;
use voxel_ballistics_core::core::config::EngineConfig;
use voxel_ballistics_core::core::types::{BlockPos, ChunkCoord, EntityKind, Material, Vec3};
use voxel_ballistics_core::entities::weapon::WeaponProfile;
use voxel_ballistics_core::server::engine::ProjectileEngine;
use voxel_ballistics_core::systems::benchmark::BenchmarkSpawner;
use voxel_ballistics_core::world::voxel_world::VoxelWorld;

const PROJECTILES: usize = 5_000;

fn setup_stress_world() -> VoxelWorld {
    let world = VoxelWorld::new();
    world.load_area(ChunkCoord::new(-6, -6), ChunkCoord::new(5, 5));
    world.fill(BlockPos::new(-96, 60, -96), BlockPos::new(95, 63, 95), Material::STONE);
    for i in 0..200u64 {
        let angle = i as f32 * 0.61;
        let r = 4.0 + (i % 40) as f32 * 2.0;
        world.spawn_entity(1_000 + i, EntityKind::Zombie, Vec3::new(angle.cos() * r, 64.0, angle.sin() * r));
    }
    world
}

#[test]
fn stress_test_projectile_tick() {
    let mut engine = ProjectileEngine::new(EngineConfig::default()).unwrap();
    engine.add_world(1, Arc::new(setup_stress_world()));
    engine.add_benchmark_spawner(
        BenchmarkSpawner::new(1, 1, Vec3::new(0.5, 65.6, 0.5), PROJECTILES, Arc::new(WeaponProfile::default()))
            .with_seed(2024),
    );

    let mut hits = 0;
    for _ in 0..300 {
        let start = Instant::now();
        for (_, update) in engine.tick() {
            hits += update.hit_count();
        }
        histogram!("projectile_tick_duration_ms").record(start.elapsed().as_secs_f64() * 1000.0);
        assert!(engine.total_projectiles() <= PROJECTILES);
    }
    assert!(hits > 0);
}
