// voxel_ballistics/engine/src/core/types.rs
use crate::core::constants::CHUNK_SHIFT;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

pub type EntityId = u64;
pub type WorldId = u64;

// --- Basic Geometric Types ---
#[derive(Clone, Debug, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UNIT_X: Vec3 = Vec3 { x: 1.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self { Vec3 { x, y, z } }
    pub fn zero() -> Self { Self::ZERO }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Unit vector in the same direction, or `None` for a zero (or non-finite) vector.
    #[inline]
    pub fn try_normalize(self) -> Option<Vec3> {
        if !(self.x.is_finite() && self.y.is_finite() && self.z.is_finite()) {
            return None;
        }
        // divide by the largest component first so tiny vectors never square into subnormals
        let scale = self.x.abs().max(self.y.abs()).max(self.z.abs());
        if scale <= 0.0 {
            return None;
        }
        let scaled = Vec3::new(self.x / scale, self.y / scale, self.z / scale);
        let len = scaled.length();
        Some(Vec3::new(scaled.x / len, scaled.y / len, scaled.z / len))
    }

    #[inline]
    pub fn min(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    #[inline]
    pub fn max(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 { Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z) }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 { Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z) }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f32) -> Vec3 { Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs) }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 { Vec3::new(-self.x, -self.y, -self.z) }
}

// --- Grid coordinates ---

/// Integer voxel coordinate.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self { BlockPos { x, y, z } }

    /// Voxel containing a world-space point.
    #[inline]
    pub fn containing(p: Vec3) -> Self {
        BlockPos::new(p.x.floor() as i32, p.y.floor() as i32, p.z.floor() as i32)
    }

    #[inline]
    pub fn min_corner(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    #[inline]
    pub fn chunk(self) -> ChunkCoord {
        ChunkCoord::new(self.x >> CHUNK_SHIFT, self.z >> CHUNK_SHIFT)
    }

    #[inline]
    pub fn bucket(self) -> ChunkCoord3D {
        ChunkCoord3D::new(self.x >> CHUNK_SHIFT, self.y >> CHUNK_SHIFT, self.z >> CHUNK_SHIFT)
    }
}

/// Horizontal chunk column (16x16 blocks, unbounded height).
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, z: i32) -> Self { ChunkCoord { x, z } }

    #[inline]
    pub fn containing(p: Vec3) -> Self {
        BlockPos::containing(p).chunk()
    }
}

/// Chunk column plus 16-block vertical slice. Key of the hitbox index.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ChunkCoord3D {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkCoord3D {
    pub const fn new(x: i32, y: i32, z: i32) -> Self { ChunkCoord3D { x, y, z } }

    #[inline]
    pub fn containing(p: Vec3) -> Self {
        BlockPos::containing(p).bucket()
    }

    #[inline]
    pub fn column(self) -> ChunkCoord {
        ChunkCoord::new(self.x, self.z)
    }
}

// --- Voxel materials ---

/// Voxel material id. `Material::AIR` is the only empty material.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Material(pub u16);

impl Material {
    pub const AIR: Material = Material(0);
    pub const STONE: Material = Material(1);
    pub const GLASS: Material = Material(20);
    pub const BOTTOM_SLAB: Material = Material(44);
    pub const TOP_SLAB: Material = Material(45);
    pub const FENCE: Material = Material(85);
    pub const CARPET: Material = Material(171);

    #[inline]
    pub fn is_air(self) -> bool {
        self == Material::AIR
    }
}

/// A voxel that stopped a projectile.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash)]
pub struct BlockRef {
    pub pos: BlockPos,
    pub material: Material,
}

// --- World entities ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Player,
    Zombie,
    Skeleton,
    Creeper,
    Villager,
    Animal,
    ArmorStand,
    Boat,
    Minecart,
    ItemDrop,
    Other,
}

impl Default for EntityKind {
    fn default() -> Self {
        EntityKind::Other
    }
}

/// Read-only view of a world entity handed out by a `WorldView`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Vec3,
}
