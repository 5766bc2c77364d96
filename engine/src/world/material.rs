// voxel_ballistics/engine/src/world/material.rs
use crate::core::config::EngineConfig;
use crate::core::types::{BlockPos, Material, Vec3};
use crate::entities::hitbox::{inverse_direction, ray_aabb_distance};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use std::sync::Arc;
use tracing::debug;

/// Material-specific narrow-phase test run for every non-air voxel a ray crosses.
pub trait FineCollisionTester: Send + Sync {
    /// Distance along the segment `start + dir * [0, length]` at which the ray first touches
    /// solid geometry inside `block`, or `None` when it passes through.
    fn hit_distance(&self, block: BlockPos, start: Vec3, dir: Vec3, length: f32) -> Option<f32>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionShape {
    Passthrough,
    Solid,
    BottomSlab,
    TopSlab,
    Post,
    Carpet,
}

impl CollisionShape {
    pub fn tester(self) -> Arc<dyn FineCollisionTester> {
        match self {
            CollisionShape::Passthrough => Arc::new(PassthroughCollision),
            CollisionShape::Solid => Arc::new(SolidCollision),
            CollisionShape::BottomSlab => Arc::new(PartialBlockCollision::bottom_slab()),
            CollisionShape::TopSlab => Arc::new(PartialBlockCollision::top_slab()),
            CollisionShape::Post => Arc::new(PartialBlockCollision::post()),
            CollisionShape::Carpet => Arc::new(PartialBlockCollision::carpet()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCollision;

impl FineCollisionTester for PassthroughCollision {
    fn hit_distance(&self, _block: BlockPos, _start: Vec3, _dir: Vec3, _length: f32) -> Option<f32> {
        None
    }
}

/// Full cube: any ray entering the voxel hits at its entry point.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolidCollision;

impl FineCollisionTester for SolidCollision {
    fn hit_distance(&self, _block: BlockPos, _start: Vec3, _dir: Vec3, _length: f32) -> Option<f32> {
        Some(0.0)
    }
}

/// Voxel made of one or more boxes in block-local `[0, 1]^3` space.
#[derive(Debug, Clone)]
pub struct PartialBlockCollision {
    boxes: SmallVec<[(Vec3, Vec3); 2]>,
}

impl PartialBlockCollision {
    pub fn new(boxes: impl IntoIterator<Item = (Vec3, Vec3)>) -> Self {
        PartialBlockCollision {
            boxes: boxes.into_iter().map(|(a, b)| (a.min(b), a.max(b))).collect(),
        }
    }

    pub fn bottom_slab() -> Self {
        PartialBlockCollision { boxes: smallvec![(Vec3::ZERO, Vec3::new(1.0, 0.5, 1.0))] }
    }

    pub fn top_slab() -> Self {
        PartialBlockCollision { boxes: smallvec![(Vec3::new(0.0, 0.5, 0.0), Vec3::new(1.0, 1.0, 1.0))] }
    }

    // fence / wall post
    pub fn post() -> Self {
        PartialBlockCollision { boxes: smallvec![(Vec3::new(0.375, 0.0, 0.375), Vec3::new(0.625, 1.0, 0.625))] }
    }

    pub fn carpet() -> Self {
        PartialBlockCollision { boxes: smallvec![(Vec3::ZERO, Vec3::new(1.0, 0.0625, 1.0))] }
    }
}

impl FineCollisionTester for PartialBlockCollision {
    fn hit_distance(&self, block: BlockPos, start: Vec3, dir: Vec3, length: f32) -> Option<f32> {
        let local = start - block.min_corner();
        let inv_dir = inverse_direction(dir);
        self.boxes
            .iter()
            .filter_map(|(min, max)| ray_aabb_distance(local, inv_dir, *min, *max))
            .filter(|d| *d <= length)
            .min_by(|a, b| a.total_cmp(b))
    }
}

/// Material -> fine tester lookup. Unregistered non-air materials collide as full cubes.
pub struct MaterialCollisionTable {
    testers: AHashMap<Material, Arc<dyn FineCollisionTester>>,
    fallback: Arc<dyn FineCollisionTester>,
    passthrough: Arc<dyn FineCollisionTester>,
}

impl MaterialCollisionTable {
    pub fn new() -> Self {
        MaterialCollisionTable {
            testers: AHashMap::new(),
            fallback: Arc::new(SolidCollision),
            passthrough: Arc::new(PassthroughCollision),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        let mut table = Self::new();
        for (&id, &shape) in &config.material_collision {
            table.register_shape(Material(id), shape);
        }
        debug!("Material collision table built with {} overrides", table.len());
        table
    }

    pub fn register(&mut self, material: Material, tester: Arc<dyn FineCollisionTester>) {
        self.testers.insert(material, tester);
    }

    pub fn register_shape(&mut self, material: Material, shape: CollisionShape) {
        self.register(material, shape.tester());
    }

    #[inline]
    pub fn tester(&self, material: Material) -> &dyn FineCollisionTester {
        if material.is_air() {
            return self.passthrough.as_ref();
        }
        self.testers.get(&material).unwrap_or(&self.fallback).as_ref()
    }

    pub fn len(&self) -> usize {
        self.testers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.testers.is_empty()
    }
}

impl Default for MaterialCollisionTable {
    fn default() -> Self {
        Self::new()
    }
}
