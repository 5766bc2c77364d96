// voxel_ballistics/engine/src/world/mod.rs
pub mod hitbox_registry;
pub mod material;
pub mod voxel_world;

use crate::core::types::{BlockPos, ChunkCoord, EntityId, EntitySnapshot, Material};
use smallvec::SmallVec;

/// Read-only world queries the projectile systems need. Implemented by the host world.
pub trait WorldView: Send + Sync {
    fn is_chunk_loaded(&self, chunk: ChunkCoord) -> bool;

    /// Material at `pos`. Only called for positions inside loaded chunk columns.
    fn material_at(&self, pos: BlockPos) -> Material;

    /// Appends every entity whose position lies in `chunk` to `out`.
    fn entities_in_chunk(&self, chunk: ChunkCoord, out: &mut Vec<EntitySnapshot>);

    fn entity(&self, id: EntityId) -> Option<EntitySnapshot>;

    /// Entity `id` is riding, if any.
    fn mount_of(&self, id: EntityId) -> Option<EntityId>;

    /// Entities riding `id`.
    fn riders_of(&self, id: EntityId) -> SmallVec<[EntityId; 2]>;
}
