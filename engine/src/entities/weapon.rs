// voxel_ballistics/engine/src/entities/weapon.rs
use crate::concurrent::hitbox_index::SpatialHitboxIndex;
use crate::core::constants::{
    DEFAULT_PROJECTILE_DAMAGE, DEFAULT_PROJECTILE_GRAVITY, DEFAULT_PROJECTILE_LIFETIME,
    DEFAULT_PROJECTILE_MAX_DISTANCE, DEFAULT_PROJECTILE_VELOCITY,
};
use crate::core::types::{BlockRef, EntityId, Vec3};
use crate::entities::projectile::Projectile;
use std::fmt;
use std::sync::Arc;

/// Called once per block hit after the tick's raytrace has resolved.
pub trait HitBlockHandler: Send + Sync {
    fn on_hit_block(
        &self,
        hitboxes: &SpatialHitboxIndex,
        weapon: &WeaponProfile,
        location: Vec3,
        block: BlockRef,
        source: EntityId,
    );
}

/// Called once per entity hit. `distance` is the projectile's total travelled distance at impact.
pub trait HitEntityHandler: Send + Sync {
    fn on_hit_entity(
        &self,
        hitboxes: &SpatialHitboxIndex,
        weapon: &WeaponProfile,
        location: Vec3,
        target: EntityId,
        source: EntityId,
        distance: f64,
    );
}

impl<F> HitBlockHandler for F
where
    F: Fn(&SpatialHitboxIndex, &WeaponProfile, Vec3, BlockRef, EntityId) + Send + Sync,
{
    fn on_hit_block(&self, hitboxes: &SpatialHitboxIndex, weapon: &WeaponProfile, location: Vec3, block: BlockRef, source: EntityId) {
        self(hitboxes, weapon, location, block, source)
    }
}

impl<F> HitEntityHandler for F
where
    F: Fn(&SpatialHitboxIndex, &WeaponProfile, Vec3, EntityId, EntityId, f64) + Send + Sync,
{
    fn on_hit_entity(
        &self,
        hitboxes: &SpatialHitboxIndex,
        weapon: &WeaponProfile,
        location: Vec3,
        target: EntityId,
        source: EntityId,
        distance: f64,
    ) {
        self(hitboxes, weapon, location, target, source, distance)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoBlockHitHandler;

impl HitBlockHandler for NoBlockHitHandler {
    fn on_hit_block(&self, _: &SpatialHitboxIndex, _: &WeaponProfile, _: Vec3, _: BlockRef, _: EntityId) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoEntityHitHandler;

impl HitEntityHandler for NoEntityHitHandler {
    fn on_hit_entity(&self, _: &SpatialHitboxIndex, _: &WeaponProfile, _: Vec3, _: EntityId, _: EntityId, _: f64) {}
}

/// Immutable projectile parameters shared by every projectile a weapon fires.
#[derive(Clone)]
pub struct WeaponProfile {
    pub name: String,
    // blocks/tick
    pub projectile_velocity: f32,
    // blocks/tick^2
    pub projectile_gravity: f32,
    // ticks
    pub projectile_lifetime: u32,
    // blocks
    pub projectile_max_distance: f32,
    pub projectile_damage: f64,
    pub projectile_damage_min: f64,
    pub projectile_damage_drop_distance: f64,
    pub hit_block_handler: Arc<dyn HitBlockHandler>,
    pub hit_entity_handler: Arc<dyn HitEntityHandler>,
}

impl fmt::Debug for WeaponProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeaponProfile")
            .field("name", &self.name)
            .field("projectile_velocity", &self.projectile_velocity)
            .field("projectile_gravity", &self.projectile_gravity)
            .field("projectile_lifetime", &self.projectile_lifetime)
            .field("projectile_max_distance", &self.projectile_max_distance)
            .field("projectile_damage", &self.projectile_damage)
            .finish_non_exhaustive()
    }
}

impl Default for WeaponProfile {
    fn default() -> Self {
        WeaponProfile {
            name: "default".to_string(),
            projectile_velocity: DEFAULT_PROJECTILE_VELOCITY,
            projectile_gravity: DEFAULT_PROJECTILE_GRAVITY,
            projectile_lifetime: DEFAULT_PROJECTILE_LIFETIME,
            projectile_max_distance: DEFAULT_PROJECTILE_MAX_DISTANCE,
            projectile_damage: DEFAULT_PROJECTILE_DAMAGE,
            projectile_damage_min: DEFAULT_PROJECTILE_DAMAGE,
            projectile_damage_drop_distance: 0.0,
            hit_block_handler: Arc::new(NoBlockHitHandler),
            hit_entity_handler: Arc::new(NoEntityHitHandler),
        }
    }
}

impl WeaponProfile {
    pub fn new(name: impl Into<String>) -> Self {
        WeaponProfile { name: name.into(), ..Default::default() }
    }

    pub fn with_hit_block_handler(mut self, handler: impl HitBlockHandler + 'static) -> Self {
        self.hit_block_handler = Arc::new(handler);
        self
    }

    pub fn with_hit_entity_handler(mut self, handler: impl HitEntityHandler + 'static) -> Self {
        self.hit_entity_handler = Arc::new(handler);
        self
    }

    /// Damage after linear fall-off, floored at `projectile_damage_min`.
    pub fn damage_at_distance(&self, distance: f64) -> f64 {
        if self.projectile_damage_drop_distance > 0.0 {
            let per_block = (self.projectile_damage - self.projectile_damage_min) / self.projectile_damage_drop_distance;
            (self.projectile_damage - distance * per_block).max(self.projectile_damage_min)
        } else {
            self.projectile_damage
        }
    }

    pub fn create_projectile(self: &Arc<Self>, source: EntityId, position: Vec3, direction: Vec3) -> Projectile {
        Projectile::new(
            Arc::clone(self),
            source,
            position,
            direction,
            self.projectile_velocity,
            self.projectile_gravity,
            self.projectile_lifetime,
            self.projectile_max_distance,
        )
    }
}
