// voxel_ballistics/engine/tests/integration/projectile_store.rs

use voxel_ballistics_core::core::config::EngineConfig;
use voxel_ballistics_core::core::types::{BlockPos, ChunkCoord, ChunkCoord3D, EntityKind, Material, Vec3};
use voxel_ballistics_core::entities::hitbox::HitboxSize;
use voxel_ballistics_core::entities::projectile::Projectile;
use voxel_ballistics_core::entities::weapon::WeaponProfile;
use voxel_ballistics_core::systems::benchmark::BenchmarkSpawner;
use voxel_ballistics_core::systems::hit_events::ProjectileSystemUpdate;
use voxel_ballistics_core::systems::projectile_store::ProjectileStore;
use voxel_ballistics_core::world::material::MaterialCollisionTable;
use voxel_ballistics_core::world::voxel_world::VoxelWorld;

use std::sync::Arc;
use std::thread;

fn loaded_world(min: i32, max: i32) -> VoxelWorld {
    let world = VoxelWorld::new();
    world.load_area(ChunkCoord::new(min, min), ChunkCoord::new(max, max));
    world
}

fn store_for(world: VoxelWorld) -> ProjectileStore<VoxelWorld> {
    ProjectileStore::with_config(1, Arc::new(world), EngineConfig::default())
}

#[allow(clippy::too_many_arguments)]
fn projectile(source: u64, position: Vec3, direction: Vec3, speed: f32, gravity: f32, lifetime: u32, max_distance: f32) -> Projectile {
    Projectile::new(Arc::new(WeaponProfile::default()), source, position, direction, speed, gravity, lifetime, max_distance)
}

#[test]
fn projectile_hits_block_five_blocks_away() {
    let world = loaded_world(0, 0);
    world.set_block(BlockPos::new(5, 0, 0), Material::STONE);
    let mut store = store_for(world);
    store.add_projectile(projectile(1, Vec3::ZERO, Vec3::UNIT_X, 1.0, 0.0, 400, 10.0));

    let mut block_hits = Vec::new();
    for _ in 0..5 {
        let update = store.update();
        assert!(update.hit_entities.is_empty());
        block_hits.extend(update.hit_blocks);
    }

    assert_eq!(block_hits.len(), 1);
    let hit = &block_hits[0];
    assert_eq!(hit.block.pos, BlockPos::new(5, 0, 0));
    assert_eq!(hit.block.material, Material::STONE);
    assert_eq!(hit.source, 1);
    assert!((hit.location.x - 5.0).abs() < 1e-4);
    assert_eq!(store.size(), 0);
}

#[test]
fn distance_limit_retires_projectile() {
    let mut store = store_for(loaded_world(-1, 1));
    store.add_projectile(projectile(1, Vec3::new(0.5, 40.5, 0.5), Vec3::UNIT_X, 1.0, 0.0, 400, 1.5));

    store.update();
    assert_eq!(store.size(), 1);
    store.update();
    assert_eq!(store.size(), 0);
}

#[test]
fn last_lifetime_tick_retires_projectile() {
    let mut store = store_for(loaded_world(-1, 1));
    let mut p = projectile(1, Vec3::new(0.5, 40.5, 0.5), Vec3::UNIT_X, 0.1, 0.0, 10, 100.0);
    p.lifetime = 9;
    store.add_projectile(p);
    let update = store.update();
    assert_eq!(update.hit_count(), 0);
    assert!(store.is_empty());
}

fn arena() -> VoxelWorld {
    let world = loaded_world(-3, 3);
    world.fill(BlockPos::new(-48, 60, -48), BlockPos::new(47, 63, 47), Material::STONE);
    world.fill(BlockPos::new(20, 64, -20), BlockPos::new(21, 70, 20), Material::STONE);
    for i in 0..12 {
        let angle = i as f32 / 12.0 * std::f32::consts::TAU;
        world.spawn_entity(100 + i, EntityKind::Zombie, Vec3::new(angle.cos() * 9.0, 64.0, angle.sin() * 9.0));
    }
    world
}

fn outcome(update: &ProjectileSystemUpdate) -> (Vec<(i32, i32, i32)>, Vec<u64>) {
    let mut blocks: Vec<_> = update.hit_blocks.iter().map(|h| (h.block.pos.x, h.block.pos.y, h.block.pos.z)).collect();
    let mut entities: Vec<_> = update.hit_entities.iter().map(|h| h.entity).collect();
    blocks.sort_unstable();
    entities.sort_unstable();
    (blocks, entities)
}

#[test]
fn identical_snapshots_produce_identical_outcomes() {
    let weapon = Arc::new(WeaponProfile { projectile_velocity: 2.0, ..WeaponProfile::new("det") });
    let mut spawner = BenchmarkSpawner::new(1, 1, Vec3::new(0.5, 65.0, 0.5), 200, weapon).with_seed(11);
    let projectiles: Vec<Projectile> = (0..200).map(|_| spawner.random_projectile()).collect();

    let mut a = store_for(arena());
    let mut b = store_for(arena());
    a.add_projectiles(projectiles.iter().cloned());
    b.add_projectiles(projectiles.into_iter().rev());

    let mut total_hits = 0;
    for _ in 0..15 {
        let ua = a.update();
        let ub = b.update();
        assert_eq!(outcome(&ua), outcome(&ub));
        assert_eq!(a.size(), b.size());
        total_hits += ua.hit_count();
    }
    assert!(total_hits > 0);
}

#[test]
fn projectiles_from_other_threads_arrive_next_update() {
    let mut store = store_for(loaded_world(-2, 2));
    let handle = store.ingress();

    let producers: Vec<_> = (0..4)
        .map(|t| {
            let handle = handle.clone();
            thread::spawn(move || {
                for i in 0..25 {
                    handle.add_projectile(projectile(t * 100 + i, Vec3::new(0.5, 90.5, 0.5), Vec3::UNIT_X, 0.5, 0.0, 400, 100.0));
                }
            })
        })
        .collect();
    for p in producers {
        p.join().unwrap();
    }

    assert_eq!(store.size(), 0);
    assert_eq!(store.pending_ingress(), 100);
    store.update();
    assert_eq!(store.size(), 100);
    assert_eq!(store.pending_ingress(), 0);
}

#[test]
fn add_routes_by_calling_thread() {
    let mut store = store_for(loaded_world(-2, 2));
    let make = || projectile(1, Vec3::new(0.5, 90.5, 0.5), Vec3::UNIT_X, 0.5, 0.0, 400, 100.0);

    // unbound: direct
    store.add_projectile(make());
    assert_eq!(store.size(), 1);
    store.update();

    thread::scope(|s| {
        s.spawn(|| store.add_projectile(make()));
    });
    assert_eq!(store.size(), 1);
    assert_eq!(store.pending_ingress(), 1);

    store.add_projectile(make());
    assert_eq!(store.size(), 2);

    store.update();
    assert_eq!(store.size(), 3);
}

#[test]
fn entity_straddling_chunk_corner_is_indexed_and_hit() {
    let world = loaded_world(-1, 2);
    world.spawn_entity(42, EntityKind::Zombie, Vec3::new(16.1, 64.0, 16.1));
    let mut store = store_for(world);
    store.add_projectile(projectile(1, Vec3::new(15.0, 65.0, 15.0), Vec3::new(1.0, 0.0, 1.0), 3.0, 0.0, 400, 100.0));

    let update = store.update();
    for bucket in [
        ChunkCoord3D::new(0, 4, 0),
        ChunkCoord3D::new(1, 4, 0),
        ChunkCoord3D::new(0, 4, 1),
        ChunkCoord3D::new(1, 4, 1),
    ] {
        assert!(update.hitboxes.contains_entity(&bucket, 42), "bucket {:?} missing entity", bucket);
    }
    assert_eq!(update.hit_entities.len(), 1);
    assert_eq!(update.hit_entities[0].entity, 42);
    assert!(store.is_empty());
}

#[test]
fn custom_hitbox_makes_untargetable_kind_hittable() {
    let world = loaded_world(-1, 1);
    world.spawn_entity(7, EntityKind::ArmorStand, Vec3::new(4.5, 64.0, 0.5));
    let mut store = store_for(world);
    let fire = || projectile(1, Vec3::new(0.5, 65.0, 0.5), Vec3::UNIT_X, 6.0, 0.0, 400, 100.0);

    store.add_projectile(fire());
    assert!(store.update().hit_entities.is_empty());
    store.update();

    store.custom_hitboxes().add_hitbox(7, HitboxSize::new(0.5, 0.5, 2.0, 0.0));
    let mut fresh = store_for_shared(&store);
    fresh.add_projectile(fire());
    let update = fresh.update();
    assert_eq!(update.hit_entities.len(), 1);
    assert_eq!(update.hit_entities[0].entity, 7);

    assert!(store.custom_hitboxes().remove_hitbox(7).is_some());
    fresh.add_projectile(fire());
    assert!(fresh.update().hit_entities.is_empty());
}

// second store over the same world and registry
fn store_for_shared(store: &ProjectileStore<VoxelWorld>) -> ProjectileStore<VoxelWorld> {
    let config = EngineConfig::default();
    let materials = Arc::new(MaterialCollisionTable::from_config(&config));
    ProjectileStore::new(2, Arc::clone(store.world()), Arc::new(config), materials, Arc::clone(store.custom_hitboxes()))
}

#[test]
fn extra_visited_columns_join_the_hitbox_index() {
    let world = loaded_world(0, 5);
    world.spawn_entity(9, EntityKind::Villager, Vec3::new(85.0, 64.0, 85.0));
    let mut store = store_for(world);

    assert!(store.update().hitboxes.is_empty());
    let update = store.update_with_visited(&[ChunkCoord::new(5, 5), ChunkCoord::new(40, 40)]);
    assert_eq!(update.hitboxes.len(), 1);
    assert_eq!(update.hitboxes.query_radius(Vec3::new(85.0, 65.0, 85.0), 1.0)[0].entity, 9);
}

#[test]
fn gravity_bends_path_into_floor() {
    let world = loaded_world(-2, 2);
    world.fill(BlockPos::new(-32, 60, -32), BlockPos::new(31, 63, 31), Material::STONE);
    let mut store = store_for(world);
    store.add_projectile(projectile(1, Vec3::new(0.5, 70.0, 0.5), Vec3::UNIT_X, 1.0, 0.2, 400, 100.0));

    let mut floor_hit = None;
    for _ in 0..20 {
        if let Some(hit) = store.update().hit_blocks.into_iter().next() {
            floor_hit = Some(hit);
            break;
        }
    }
    let hit = floor_hit.expect("projectile should land on the floor");
    assert_eq!(hit.block.pos.y, 63);
    assert!((hit.location.y - 64.0).abs() < 1e-3);
    assert!(store.is_empty());
}
