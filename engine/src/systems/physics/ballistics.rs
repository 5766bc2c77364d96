// voxel_ballistics/engine/src/systems/physics/ballistics.rs
use crate::core::constants::CHUNK_SHIFT;
use crate::core::types::{ChunkCoord, Vec3};
use crate::entities::projectile::Projectile;
use crate::world::WorldView;
use ahash::AHashSet;

/// Advances `projectile` by one tick of semi-implicit Euler and fills its per-tick scratch
/// (`next_position`, `distance_to_next`, `direction`). Position itself is not moved; the store
/// does that only for survivors.
///
/// Gravity is taken off the vertical velocity, then once more from the vertical step:
/// `y_next = y + vel_y - gravity`. Consecutive ticks reproduce the host's arc exactly only with
/// this form, so it is kept as is.
#[inline]
pub fn integrate(projectile: &mut Projectile) {
    projectile.velocity.y -= projectile.gravity;

    let p = projectile.position;
    let v = projectile.velocity;
    let next = Vec3::new(p.x + v.x, p.y + v.y - projectile.gravity, p.z + v.z);
    let displacement = next - p;

    match displacement.try_normalize() {
        Some(direction) => {
            projectile.direction = direction;
            projectile.distance_to_next = displacement.length();
        }
        // no motion this tick, keep the old heading
        None => projectile.distance_to_next = 0.0,
    }
    projectile.next_position = next;
}

/// Inclusive range of chunk columns covered by the horizontal sweep `from -> to` padded by
/// `margin` blocks on every side.
#[inline]
pub fn swept_column_range(from: Vec3, to: Vec3, margin: f32) -> (ChunkCoord, ChunkCoord) {
    let lo = |a: f32, b: f32| ((a.min(b) - margin).floor() as i32) >> CHUNK_SHIFT;
    let hi = |a: f32, b: f32| ((a.max(b) + margin).ceil() as i32) >> CHUNK_SHIFT;
    (
        ChunkCoord::new(lo(from.x, to.x), lo(from.z, to.z)),
        ChunkCoord::new(hi(from.x, to.x), hi(from.z, to.z)),
    )
}

/// Union of loaded chunk columns touched this tick, in first-seen order.
#[derive(Debug, Default, Clone)]
pub struct ColumnSet {
    loaded: Vec<ChunkCoord>,
    // every column already considered, loaded or not
    seen: AHashSet<ChunkCoord>,
}

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `column` if loaded and not already present. Returns true when it was added.
    pub fn insert_if_loaded<W: WorldView + ?Sized>(&mut self, world: &W, column: ChunkCoord) -> bool {
        if !self.seen.insert(column) {
            return false;
        }
        if world.is_chunk_loaded(column) {
            self.loaded.push(column);
            true
        } else {
            false
        }
    }

    pub fn add_sweep<W: WorldView + ?Sized>(&mut self, world: &W, from: Vec3, to: Vec3, margin: f32) {
        let (lo, hi) = swept_column_range(from, to, margin);
        for cx in lo.x..=hi.x {
            for cz in lo.z..=hi.z {
                self.insert_if_loaded(world, ChunkCoord::new(cx, cz));
            }
        }
    }

    pub fn as_slice(&self) -> &[ChunkCoord] {
        &self.loaded
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }

    pub fn clear(&mut self) {
        self.loaded.clear();
        self.seen.clear();
    }
}
