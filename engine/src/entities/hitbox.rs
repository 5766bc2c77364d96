// voxel_ballistics/engine/src/entities/hitbox.rs
use crate::core::constants::CHUNK_SHIFT;
use crate::core::types::{ChunkCoord3D, EntityId, EntitySnapshot, Vec3};
use serde::{Deserialize, Serialize};

/// Hitbox dimensions relative to an entity's feet position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitboxSize {
    pub x_half: f32,
    pub z_half: f32,
    pub y_height: f32,
    #[serde(default)]
    pub y_offset: f32,
}

impl HitboxSize {
    pub const fn new(x_half: f32, z_half: f32, y_height: f32, y_offset: f32) -> Self {
        HitboxSize { x_half, z_half, y_height, y_offset }
    }

    pub fn validate(&self, max_extent: f32) -> Result<(), String> {
        let dims = [("x", self.x_half * 2.0), ("z", self.z_half * 2.0), ("y", self.y_height)];
        for (axis, extent) in dims {
            if !(extent >= 0.0 && extent.is_finite()) {
                return Err(format!("{} extent must be finite and non-negative, got {}", axis, extent));
            }
            if extent > max_extent {
                return Err(format!("{} extent {} exceeds maximum {}", axis, extent, max_extent));
            }
        }
        if !self.y_offset.is_finite() {
            return Err("y_offset must be finite".into());
        }
        Ok(())
    }
}

/// World-space AABB of a targetable entity. Only valid for the tick it was built in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub min: Vec3,
    pub max: Vec3,
    pub entity: EntityId,
}

impl Hitbox {
    pub fn new(min: Vec3, max: Vec3, entity: EntityId) -> Self {
        Hitbox { min: min.min(max), max: min.max(max), entity }
    }

    pub fn from_entity(entity: &EntitySnapshot, size: HitboxSize) -> Self {
        let p = entity.position;
        let y_min = p.y + size.y_offset;
        Hitbox {
            min: Vec3::new(p.x - size.x_half, y_min, p.z - size.z_half),
            max: Vec3::new(p.x + size.x_half, y_min + size.y_height, p.z + size.z_half),
            entity: entity.id,
        }
    }

    /// Distance along the ray to the first intersection, 0 if the origin is inside.
    #[inline]
    pub fn intersects_ray(&self, origin: Vec3, inv_dir: Vec3) -> Option<f32> {
        ray_aabb_distance(origin, inv_dir, self.min, self.max)
    }

    #[inline]
    pub fn intersects_aabb(&self, min: Vec3, max: Vec3) -> bool {
        self.min.x <= max.x && self.max.x >= min.x
            && self.min.y <= max.y && self.max.y >= min.y
            && self.min.z <= max.z && self.max.z >= min.z
    }

    /// Inclusive range of 3D buckets the box overlaps.
    pub fn bucket_range(&self) -> (ChunkCoord3D, ChunkCoord3D) {
        let lo = |v: f32| (v.floor() as i32) >> CHUNK_SHIFT;
        (
            ChunkCoord3D::new(lo(self.min.x), lo(self.min.y), lo(self.min.z)),
            ChunkCoord3D::new(lo(self.max.x), lo(self.max.y), lo(self.max.z)),
        )
    }
}

/// Per-axis `1/d`, with `f32::MAX` standing in for zero components so they never cross a slab.
#[inline]
pub fn inverse_direction(dir: Vec3) -> Vec3 {
    let inv = |d: f32| if d != 0.0 { 1.0 / d } else { f32::MAX };
    Vec3::new(inv(dir.x), inv(dir.y), inv(dir.z))
}

/// Slab test. Returns the entry distance (clamped to 0) when the ray meets the box ahead of the origin.
#[inline]
pub fn ray_aabb_distance(origin: Vec3, inv_dir: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let tx1 = (min.x - origin.x) * inv_dir.x;
    let tx2 = (max.x - origin.x) * inv_dir.x;
    let mut t_min = tx1.min(tx2);
    let mut t_max = tx1.max(tx2);

    let ty1 = (min.y - origin.y) * inv_dir.y;
    let ty2 = (max.y - origin.y) * inv_dir.y;
    t_min = t_min.max(ty1.min(ty2));
    t_max = t_max.min(ty1.max(ty2));

    let tz1 = (min.z - origin.z) * inv_dir.z;
    let tz2 = (max.z - origin.z) * inv_dir.z;
    t_min = t_min.max(tz1.min(tz2));
    t_max = t_max.min(tz1.max(tz2));

    if t_max < 0.0 || t_min > t_max {
        None
    } else {
        Some(t_min.max(0.0))
    }
}
