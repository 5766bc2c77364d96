// voxel_ballistics/engine/src/world/voxel_world.rs
use crate::core::types::{BlockPos, ChunkCoord, EntityId, EntityKind, EntitySnapshot, Material, Vec3};
use crate::world::WorldView;
use ahash::{AHashMap, AHashSet};
use parking_lot::RwLock;
use smallvec::SmallVec;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct WorldEntity {
    snapshot: EntitySnapshot,
    mount: Option<EntityId>,
    riders: SmallVec<[EntityId; 2]>,
}

#[derive(Debug, Default)]
struct EntityTable {
    by_id: AHashMap<EntityId, WorldEntity>,
    by_chunk: AHashMap<ChunkCoord, Vec<EntityId>>,
}

impl EntityTable {
    fn unlink_chunk(&mut self, id: EntityId, chunk: ChunkCoord) {
        if let Some(ids) = self.by_chunk.get_mut(&chunk) {
            ids.retain(|e| *e != id);
            if ids.is_empty() {
                self.by_chunk.remove(&chunk);
            }
        }
    }

    fn detach_from_mount(&mut self, rider: EntityId) {
        let mount = self.by_id.get_mut(&rider).and_then(|e| e.mount.take());
        if let Some(vehicle) = mount.and_then(|m| self.by_id.get_mut(&m)) {
            vehicle.riders.retain(|r| *r != rider);
        }
    }
}

/// In-memory voxel world: sparse blocks, explicit loaded chunk columns and a chunk-bucketed
/// entity table. Used by the benchmark binary and tests; hosts usually implement `WorldView`
/// over their own storage.
#[derive(Debug, Default)]
pub struct VoxelWorld {
    loaded_chunks: RwLock<AHashSet<ChunkCoord>>,
    blocks: RwLock<AHashMap<BlockPos, Material>>,
    entities: RwLock<EntityTable>,
}

impl VoxelWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_chunk(&self, chunk: ChunkCoord) {
        self.loaded_chunks.write().insert(chunk);
    }

    pub fn unload_chunk(&self, chunk: ChunkCoord) {
        self.loaded_chunks.write().remove(&chunk);
    }

    /// Loads every column in the inclusive range `min..=max`.
    pub fn load_area(&self, min: ChunkCoord, max: ChunkCoord) {
        let mut loaded = self.loaded_chunks.write();
        for cx in min.x..=max.x {
            for cz in min.z..=max.z {
                loaded.insert(ChunkCoord::new(cx, cz));
            }
        }
        debug!("Loaded chunk area {:?}..={:?} ({} columns total)", min, max, loaded.len());
    }

    pub fn loaded_chunk_count(&self) -> usize {
        self.loaded_chunks.read().len()
    }

    pub fn set_block(&self, pos: BlockPos, material: Material) {
        let mut blocks = self.blocks.write();
        if material.is_air() {
            blocks.remove(&pos);
        } else {
            blocks.insert(pos, material);
        }
    }

    /// Fills the inclusive box `a..=b` with `material`.
    pub fn fill(&self, a: BlockPos, b: BlockPos, material: Material) {
        let mut blocks = self.blocks.write();
        for x in a.x.min(b.x)..=a.x.max(b.x) {
            for y in a.y.min(b.y)..=a.y.max(b.y) {
                for z in a.z.min(b.z)..=a.z.max(b.z) {
                    let pos = BlockPos::new(x, y, z);
                    if material.is_air() {
                        blocks.remove(&pos);
                    } else {
                        blocks.insert(pos, material);
                    }
                }
            }
        }
    }

    pub fn block_count(&self) -> usize {
        self.blocks.read().len()
    }

    pub fn spawn_entity(&self, id: EntityId, kind: EntityKind, position: Vec3) {
        let mut table = self.entities.write();
        if let Some(old) = table.by_id.get(&id).map(|e| e.snapshot.position) {
            warn!("Entity {} spawned twice, replacing previous instance", id);
            table.unlink_chunk(id, ChunkCoord::containing(old));
        }
        table.by_id.insert(
            id,
            WorldEntity {
                snapshot: EntitySnapshot { id, kind, position },
                mount: None,
                riders: SmallVec::new(),
            },
        );
        table.by_chunk.entry(ChunkCoord::containing(position)).or_default().push(id);
    }

    pub fn move_entity(&self, id: EntityId, position: Vec3) -> bool {
        let mut table = self.entities.write();
        let old = match table.by_id.get_mut(&id) {
            Some(entity) => std::mem::replace(&mut entity.snapshot.position, position),
            None => return false,
        };
        let (old_chunk, new_chunk) = (ChunkCoord::containing(old), ChunkCoord::containing(position));
        if old_chunk != new_chunk {
            table.unlink_chunk(id, old_chunk);
            table.by_chunk.entry(new_chunk).or_default().push(id);
        }
        true
    }

    pub fn remove_entity(&self, id: EntityId) -> bool {
        let mut table = self.entities.write();
        table.detach_from_mount(id);
        let Some(entity) = table.by_id.remove(&id) else {
            return false;
        };
        for rider in &entity.riders {
            if let Some(r) = table.by_id.get_mut(rider) {
                r.mount = None;
            }
        }
        table.unlink_chunk(id, ChunkCoord::containing(entity.snapshot.position));
        true
    }

    /// Seats `rider` on `vehicle`. Returns false if either entity is missing or they are the same.
    pub fn mount(&self, rider: EntityId, vehicle: EntityId) -> bool {
        let mut table = self.entities.write();
        if rider == vehicle || !table.by_id.contains_key(&rider) || !table.by_id.contains_key(&vehicle) {
            return false;
        }
        table.detach_from_mount(rider);
        if let Some(r) = table.by_id.get_mut(&rider) {
            r.mount = Some(vehicle);
        }
        if let Some(v) = table.by_id.get_mut(&vehicle) {
            v.riders.push(rider);
        }
        true
    }

    pub fn dismount(&self, rider: EntityId) {
        self.entities.write().detach_from_mount(rider);
    }

    pub fn entity_count(&self) -> usize {
        self.entities.read().by_id.len()
    }
}

impl WorldView for VoxelWorld {
    #[inline]
    fn is_chunk_loaded(&self, chunk: ChunkCoord) -> bool {
        self.loaded_chunks.read().contains(&chunk)
    }

    #[inline]
    fn material_at(&self, pos: BlockPos) -> Material {
        self.blocks.read().get(&pos).copied().unwrap_or(Material::AIR)
    }

    fn entities_in_chunk(&self, chunk: ChunkCoord, out: &mut Vec<EntitySnapshot>) {
        let table = self.entities.read();
        if let Some(ids) = table.by_chunk.get(&chunk) {
            out.extend(ids.iter().filter_map(|id| table.by_id.get(id).map(|e| e.snapshot)));
        }
    }

    fn entity(&self, id: EntityId) -> Option<EntitySnapshot> {
        self.entities.read().by_id.get(&id).map(|e| e.snapshot)
    }

    fn mount_of(&self, id: EntityId) -> Option<EntityId> {
        self.entities.read().by_id.get(&id).and_then(|e| e.mount)
    }

    fn riders_of(&self, id: EntityId) -> SmallVec<[EntityId; 2]> {
        self.entities
            .read()
            .by_id
            .get(&id)
            .map(|e| e.riders.clone())
            .unwrap_or_default()
    }
}
