// voxel_ballistics/engine/tests/integration/raytrace.rs

use voxel_ballistics_core::concurrent::hitbox_index::SpatialHitboxIndex;
use voxel_ballistics_core::core::config::EngineConfig;
use voxel_ballistics_core::core::types::{BlockPos, ChunkCoord, EntityKind, Material, Vec3};
use voxel_ballistics_core::entities::hitbox::Hitbox;
use voxel_ballistics_core::systems::physics::raytrace::{RayQuery, RaytraceResult, VoxelRaytracer};
use voxel_ballistics_core::world::hitbox_registry::CustomHitboxRegistry;
use voxel_ballistics_core::world::material::{FineCollisionTester, MaterialCollisionTable};
use voxel_ballistics_core::world::voxel_world::VoxelWorld;

use std::sync::Arc;

struct TestScene {
    world: VoxelWorld,
    materials: MaterialCollisionTable,
    config: EngineConfig,
}

impl TestScene {
    fn new() -> Self {
        let world = VoxelWorld::new();
        world.load_area(ChunkCoord::new(-2, -2), ChunkCoord::new(2, 2));
        let config = EngineConfig::default();
        TestScene { world, materials: MaterialCollisionTable::from_config(&config), config }
    }

    fn trace(&self, query: &RayQuery, index: &SpatialHitboxIndex) -> RaytraceResult {
        VoxelRaytracer::new(&self.world, &self.materials, &self.config).trace(query, index)
    }

    fn index_from_world(&self) -> SpatialHitboxIndex {
        let columns: Vec<ChunkCoord> = (-2..=2).flat_map(|x| (-2..=2).map(move |z| ChunkCoord::new(x, z))).collect();
        SpatialHitboxIndex::build_from_world(&self.world, &columns, &self.config, &CustomHitboxRegistry::new())
    }
}

#[test]
fn nearer_entity_wins_over_block() {
    let scene = TestScene::new();
    scene.world.set_block(BlockPos::new(5, 64, 0), Material::STONE);
    let mut index = SpatialHitboxIndex::new();
    index.insert(Hitbox::new(Vec3::new(3.0, 64.0, 0.0), Vec3::new(3.6, 66.0, 1.0), 7));

    let query = RayQuery::new(Vec3::new(0.0, 64.5, 0.5), Vec3::UNIT_X, 4.0, 1);
    assert_eq!(
        scene.trace(&query, &index),
        RaytraceResult::EntityHit { distance: 3.0, location: Vec3::new(3.0, 64.5, 0.5), entity: 7 }
    );
}

#[test]
fn nearer_block_wins_over_entity() {
    let scene = TestScene::new();
    scene.world.set_block(BlockPos::new(5, 64, 0), Material::STONE);
    let mut index = SpatialHitboxIndex::new();
    index.insert(Hitbox::new(Vec3::new(6.0, 64.0, 0.0), Vec3::new(6.6, 66.0, 1.0), 7));

    let query = RayQuery::new(Vec3::new(0.0, 64.5, 0.5), Vec3::UNIT_X, 7.0, 1);
    match scene.trace(&query, &index) {
        RaytraceResult::BlockHit { distance, block, .. } => {
            assert_eq!(distance, 5.0);
            assert_eq!(block.pos, BlockPos::new(5, 64, 0));
        }
        other => panic!("expected block hit, got {:?}", other),
    }
}

#[test]
fn shooter_mount_and_riders_are_never_hit() {
    let scene = TestScene::new();
    scene.world.spawn_entity(1, EntityKind::Player, Vec3::new(2.5, 64.0, 0.5));
    scene.world.spawn_entity(2, EntityKind::Animal, Vec3::new(3.5, 64.0, 0.5));
    scene.world.spawn_entity(3, EntityKind::Zombie, Vec3::new(4.5, 64.0, 0.5));
    assert!(scene.world.mount(1, 2));
    assert!(scene.world.mount(3, 1));
    let index = scene.index_from_world();
    assert_eq!(index.len(), 3);

    let query = RayQuery::new(Vec3::new(0.5, 65.0, 0.5), Vec3::UNIT_X, 6.0, 1);
    assert!(!scene.trace(&query, &index).is_hit());

    // an unrelated zombie behind them is still hit
    scene.world.spawn_entity(4, EntityKind::Zombie, Vec3::new(5.5, 64.0, 0.5));
    let index = scene.index_from_world();
    match scene.trace(&query, &index) {
        RaytraceResult::EntityHit { entity, distance, .. } => {
            assert_eq!(entity, 4);
            assert!((distance - 4.7).abs() < 1e-5);
        }
        other => panic!("expected entity hit, got {:?}", other),
    }
}

#[test]
fn diagonal_ray_through_voxel_corner_does_not_tunnel() {
    let scene = TestScene::new();
    scene.world.set_block(BlockPos::new(1, 1, 0), Material::STONE);
    let dir = Vec3::new(1.0, 1.0, 0.0).try_normalize().unwrap();

    let query = RayQuery::new(Vec3::new(0.5, 0.5, 0.5), dir, 2.0, 1);
    match scene.trace(&query, &SpatialHitboxIndex::new()) {
        RaytraceResult::BlockHit { block, distance, .. } => {
            assert_eq!(block.pos, BlockPos::new(1, 1, 0));
            assert!((distance - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
        }
        other => panic!("expected corner block hit, got {:?}", other),
    }
}

#[test]
fn ray_leaving_loaded_area_is_out_of_bounds() {
    let scene = TestScene::new();
    let query = RayQuery::new(Vec3::new(-28.5, 70.0, 0.5), Vec3::new(-1.0, 0.0, 0.0), 4.0, 1);
    match scene.trace(&query, &SpatialHitboxIndex::new()) {
        RaytraceResult::NoHit { travelled, out_of_bounds } => {
            assert!(out_of_bounds);
            assert_eq!(travelled, 3.5);
        }
        other => panic!("expected out of bounds, got {:?}", other),
    }
}

#[test]
fn glass_and_fences_use_their_own_shapes() {
    let scene = TestScene::new();
    scene.world.set_block(BlockPos::new(2, 64, 0), Material::FENCE);
    scene.world.set_block(BlockPos::new(4, 64, 0), Material::GLASS);

    // passes beside the fence post, stops at the glass face
    let beside = RayQuery::new(Vec3::new(0.5, 64.5, 0.1), Vec3::UNIT_X, 4.0, 1);
    let hit = scene.trace(&beside, &SpatialHitboxIndex::new());
    assert_eq!(hit.distance(), Some(3.5));

    let through_post = RayQuery::new(Vec3::new(0.5, 64.5, 0.5), Vec3::UNIT_X, 4.0, 1);
    let hit = scene.trace(&through_post, &SpatialHitboxIndex::new());
    assert_eq!(hit.distance(), Some(1.875));
}

// Block that only collides in its western half.
struct WestHalf;

impl FineCollisionTester for WestHalf {
    fn hit_distance(&self, block: BlockPos, start: Vec3, dir: Vec3, length: f32) -> Option<f32> {
        let local_x = start.x - block.x as f32;
        if local_x < 0.5 && dir.x > 0.0 {
            Some(0.0)
        } else if dir.x < 0.0 {
            let d = (local_x - 0.5) / -dir.x;
            (d <= length).then_some(d)
        } else {
            None
        }
    }
}

#[test]
fn custom_fine_tester_is_consulted() {
    let mut scene = TestScene::new();
    let custom = Material(300);
    scene.materials.register(custom, Arc::new(WestHalf));
    scene.world.set_block(BlockPos::new(3, 64, 0), custom);

    let eastbound = RayQuery::new(Vec3::new(0.5, 64.5, 0.5), Vec3::UNIT_X, 4.0, 1);
    assert_eq!(scene.trace(&eastbound, &SpatialHitboxIndex::new()).distance(), Some(2.5));

    let westbound = RayQuery::new(Vec3::new(6.5, 64.5, 0.5), Vec3::new(-1.0, 0.0, 0.0), 4.0, 1);
    assert_eq!(scene.trace(&westbound, &SpatialHitboxIndex::new()).distance(), Some(3.0));
}
