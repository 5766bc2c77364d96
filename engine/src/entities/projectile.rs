// voxel_ballistics/engine/src/entities/projectile.rs
use crate::core::types::{EntityId, Vec3};
use crate::entities::weapon::WeaponProfile;
use std::sync::Arc;
use tracing::debug;

/// A live projectile. Owned by exactly one `ProjectileStore`; never persisted.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub weapon: Arc<WeaponProfile>,
    // shooter, excluded from hits together with its mount and riders
    pub source: EntityId,
    pub position: Vec3,
    // always unit length
    pub direction: Vec3,
    pub velocity: Vec3,
    pub speed: f32,
    pub gravity: f32,
    pub lifetime: u32,
    pub max_lifetime: u32,
    pub distance: f32,
    pub max_distance: f32,

    // per-tick scratch written by the integration step
    pub next_position: Vec3,
    pub distance_to_next: f32,
}

impl Projectile {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        weapon: Arc<WeaponProfile>,
        source: EntityId,
        position: Vec3,
        direction: Vec3,
        speed: f32,
        gravity: f32,
        max_lifetime: u32,
        max_distance: f32,
    ) -> Self {
        let direction = direction.try_normalize().unwrap_or_else(|| {
            debug!("Projectile from source {} created with zero direction, defaulting to +X", source);
            Vec3::UNIT_X
        });
        let speed = speed.max(0.0);
        let gravity = gravity.max(0.0);

        Projectile {
            weapon,
            source,
            position,
            direction,
            velocity: direction * speed,
            speed,
            gravity,
            lifetime: 0,
            max_lifetime,
            distance: 0.0,
            max_distance,
            next_position: position,
            distance_to_next: 0.0,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.lifetime >= self.max_lifetime || self.distance >= self.max_distance
    }

    /// Account for one processed tick.
    pub(crate) fn finish_tick(&mut self) {
        self.lifetime += 1;
        self.distance += self.distance_to_next;
    }

    pub(crate) fn move_to_next(&mut self) {
        self.position = self.next_position;
    }
}
