// voxel_ballistics/engine/src/systems/hit_events.rs
use crate::concurrent::hitbox_index::SpatialHitboxIndex;
use crate::core::types::{BlockRef, EntityId, Vec3};
use crate::entities::weapon::WeaponProfile;
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct ProjectileHitBlock {
    pub block: BlockRef,
    pub location: Vec3,
    pub source: EntityId,
    pub weapon: Arc<WeaponProfile>,
}

#[derive(Debug, Clone)]
pub struct ProjectileHitEntity {
    pub entity: EntityId,
    pub location: Vec3,
    pub source: EntityId,
    pub weapon: Arc<WeaponProfile>,
    // total flight distance at impact, used for damage fall-off
    pub distance: f64,
}

impl ProjectileHitEntity {
    pub fn damage(&self) -> f64 {
        self.weapon.damage_at_distance(self.distance)
    }
}

/// Everything one store update produced. The hitbox index is handed on so co-scheduled systems
/// (explosions, thrown items) can reuse this tick's entity lookups.
#[derive(Debug, Default)]
pub struct ProjectileSystemUpdate {
    pub hitboxes: SpatialHitboxIndex,
    pub hit_blocks: Vec<ProjectileHitBlock>,
    pub hit_entities: Vec<ProjectileHitEntity>,
}

impl ProjectileSystemUpdate {
    pub fn new(
        hitboxes: SpatialHitboxIndex,
        hit_blocks: Vec<ProjectileHitBlock>,
        hit_entities: Vec<ProjectileHitEntity>,
    ) -> Self {
        ProjectileSystemUpdate { hitboxes, hit_blocks, hit_entities }
    }

    pub fn hit_count(&self) -> usize {
        self.hit_blocks.len() + self.hit_entities.len()
    }

    /// Routes every hit to its weapon's handlers, block hits first. Returns the number of
    /// handler calls made.
    pub fn dispatch_hits(&self) -> usize {
        for hit in &self.hit_blocks {
            trace!("Dispatching block hit {:?} from {} ({})", hit.block.pos, hit.source, hit.weapon.name);
            hit.weapon
                .hit_block_handler
                .on_hit_block(&self.hitboxes, &hit.weapon, hit.location, hit.block, hit.source);
        }
        for hit in &self.hit_entities {
            trace!("Dispatching entity hit {} from {} ({})", hit.entity, hit.source, hit.weapon.name);
            hit.weapon.hit_entity_handler.on_hit_entity(
                &self.hitboxes,
                &hit.weapon,
                hit.location,
                hit.entity,
                hit.source,
                hit.distance,
            );
        }
        self.hit_count()
    }
}
