// voxel_ballistics/engine/src/concurrent/hitbox_index.rs

use crate::core::config::EngineConfig;
use crate::core::types::{ChunkCoord, ChunkCoord3D, EntityId, EntitySnapshot, Vec3};
use crate::entities::hitbox::Hitbox;
use crate::world::hitbox_registry::CustomHitboxRegistry;
use crate::world::WorldView;
use ahash::{AHashMap, AHashSet};
use tracing::{debug, trace};

/// Per-tick map from 3D chunk bucket to the hitboxes overlapping it. A hitbox spanning several
/// buckets is stored in each of them. Built once per tick and then only read.
#[derive(Debug, Clone, Default)]
pub struct SpatialHitboxIndex {
    buckets: AHashMap<ChunkCoord3D, Vec<Hitbox>>,
    hitbox_count: usize,
}

impl SpatialHitboxIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gathers hitboxes of every targetable entity standing in `columns`. Each column is
    /// enumerated once. Custom registry sizes win over per-kind defaults.
    pub fn build_from_world<W: WorldView + ?Sized>(
        world: &W,
        columns: &[ChunkCoord],
        config: &EngineConfig,
        custom_hitboxes: &CustomHitboxRegistry,
    ) -> Self {
        let mut index = SpatialHitboxIndex::new();
        let mut scratch: Vec<EntitySnapshot> = Vec::new();

        for &column in columns {
            scratch.clear();
            world.entities_in_chunk(column, &mut scratch);
            for entity in &scratch {
                let size = custom_hitboxes
                    .get(entity.id)
                    .or_else(|| config.entity_hitbox(entity.kind));
                if let Some(size) = size {
                    index.insert(Hitbox::from_entity(entity, size));
                }
            }
        }

        debug!(
            "Hitbox index built from {} columns: {} hitboxes in {} buckets",
            columns.len(),
            index.hitbox_count,
            index.buckets.len()
        );
        index
    }

    /// Adds `hitbox` to every bucket its bounds overlap.
    pub fn insert(&mut self, hitbox: Hitbox) {
        let (lo, hi) = hitbox.bucket_range();
        for cx in lo.x..=hi.x {
            for cy in lo.y..=hi.y {
                for cz in lo.z..=hi.z {
                    self.buckets.entry(ChunkCoord3D::new(cx, cy, cz)).or_default().push(hitbox);
                }
            }
        }
        self.hitbox_count += 1;
        trace!("Hitbox for entity {} indexed into buckets {:?}..={:?}", hitbox.entity, lo, hi);
    }

    #[inline]
    pub fn get(&self, bucket: &ChunkCoord3D) -> &[Hitbox] {
        self.buckets.get(bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_entity(&self, bucket: &ChunkCoord3D, entity: EntityId) -> bool {
        self.get(bucket).iter().any(|hb| hb.entity == entity)
    }

    pub fn buckets(&self) -> impl Iterator<Item = (&ChunkCoord3D, &[Hitbox])> {
        self.buckets.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Hitboxes intersecting the box `min..max`, one per entity.
    pub fn query_aabb(&self, min: Vec3, max: Vec3) -> Vec<Hitbox> {
        let query = Hitbox::new(min, max, 0);
        let (lo, hi) = query.bucket_range();
        let mut seen = AHashSet::new();
        let mut found = Vec::new();
        for cx in lo.x..=hi.x {
            for cy in lo.y..=hi.y {
                for cz in lo.z..=hi.z {
                    for hb in self.get(&ChunkCoord3D::new(cx, cy, cz)) {
                        if hb.intersects_aabb(query.min, query.max) && seen.insert(hb.entity) {
                            found.push(*hb);
                        }
                    }
                }
            }
        }
        found
    }

    /// Hitboxes within `radius` (box distance) of a point.
    pub fn query_radius(&self, center: Vec3, radius: f32) -> Vec<Hitbox> {
        let r = Vec3::new(radius, radius, radius);
        self.query_aabb(center - r, center + r)
    }

    /// Number of distinct hitboxes inserted.
    pub fn len(&self) -> usize {
        self.hitbox_count
    }

    pub fn is_empty(&self) -> bool {
        self.hitbox_count == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn stats(&self) -> HitboxIndexStats {
        let max_hitboxes_per_bucket = self.buckets.values().map(Vec::len).max().unwrap_or(0);
        let total_entries = self.buckets.values().map(Vec::len).sum();
        HitboxIndexStats {
            hitboxes: self.hitbox_count,
            buckets: self.buckets.len(),
            total_entries,
            max_hitboxes_per_bucket,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitboxIndexStats {
    pub hitboxes: usize,
    pub buckets: usize,
    // hitboxes counted once per bucket they occupy
    pub total_entries: usize,
    pub max_hitboxes_per_bucket: usize,
}
