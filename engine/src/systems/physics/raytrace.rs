// voxel_ballistics/engine/src/systems/physics/raytrace.rs
use crate::concurrent::hitbox_index::SpatialHitboxIndex;
use crate::core::config::EngineConfig;
use crate::core::constants::EXPECTED_BUCKETS_PER_RAY;
use crate::core::types::{BlockPos, BlockRef, ChunkCoord3D, EntityId, Vec3};
use crate::entities::hitbox::inverse_direction;
use crate::entities::projectile::Projectile;
use crate::world::material::MaterialCollisionTable;
use crate::world::WorldView;
use smallvec::{smallvec, SmallVec};
use tracing::trace;

/// One projectile's ray for the current tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayQuery {
    pub origin: Vec3,
    // must be unit length
    pub direction: Vec3,
    // distance to the integrated next position; entity hits must fall inside it
    pub segment_length: f32,
    // distance already flown before this tick
    pub travelled: f32,
    pub max_distance: f32,
    pub source: EntityId,
}

impl RayQuery {
    pub fn new(origin: Vec3, direction: Vec3, segment_length: f32, source: EntityId) -> Self {
        RayQuery {
            origin,
            direction,
            segment_length,
            travelled: 0.0,
            max_distance: f32::MAX,
            source,
        }
    }

    pub fn from_projectile(projectile: &Projectile) -> Self {
        RayQuery {
            origin: projectile.position,
            direction: projectile.direction,
            segment_length: projectile.distance_to_next,
            travelled: projectile.distance,
            max_distance: projectile.max_distance,
            source: projectile.source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RaytraceResult {
    NoHit { travelled: f32, out_of_bounds: bool },
    BlockHit { distance: f32, location: Vec3, block: BlockRef },
    EntityHit { distance: f32, location: Vec3, entity: EntityId },
}

impl RaytraceResult {
    pub fn is_hit(&self) -> bool {
        !matches!(self, RaytraceResult::NoHit { .. })
    }

    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, RaytraceResult::NoHit { out_of_bounds: true, .. })
    }

    /// Distance along the ray to the hit, `None` for a miss.
    pub fn distance(&self) -> Option<f32> {
        match *self {
            RaytraceResult::NoHit { .. } => None,
            RaytraceResult::BlockHit { distance, .. } | RaytraceResult::EntityHit { distance, .. } => Some(distance),
        }
    }

    pub fn location(&self) -> Option<Vec3> {
        match *self {
            RaytraceResult::NoHit { .. } => None,
            RaytraceResult::BlockHit { location, .. } | RaytraceResult::EntityHit { location, .. } => Some(location),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct BlockHit {
    distance: f32,
    location: Vec3,
    block: BlockRef,
}

#[derive(Debug)]
struct BlockTraversal {
    hit: Option<BlockHit>,
    travelled: f32,
    out_of_bounds: bool,
    buckets: SmallVec<[ChunkCoord3D; EXPECTED_BUCKETS_PER_RAY]>,
}

/// Grid traversal (Amanatides & Woo) over the voxel world, plus a hitbox pass over every 3D
/// bucket the traversal crossed. Holds only borrows; build one per tick and share it across
/// projectiles.
pub struct VoxelRaytracer<'a, W: WorldView + ?Sized> {
    world: &'a W,
    materials: &'a MaterialCollisionTable,
    continuity_margin: f32,
    max_distance_margin: f32,
}

impl<'a, W: WorldView + ?Sized> VoxelRaytracer<'a, W> {
    pub fn new(world: &'a W, materials: &'a MaterialCollisionTable, config: &EngineConfig) -> Self {
        VoxelRaytracer {
            world,
            materials,
            continuity_margin: config.raytrace_continuity_margin,
            max_distance_margin: config.max_distance_margin,
        }
    }

    /// Closest of block hit and entity hit along `query`. Ties go to the block.
    pub fn trace(&self, query: &RayQuery, hitboxes: &SpatialHitboxIndex) -> RaytraceResult {
        let traversal = self.traverse_blocks(query);
        let entity_hit = self.closest_entity(query, hitboxes, &traversal.buckets);

        match (traversal.hit, entity_hit) {
            (Some(block), Some((entity, distance))) if distance < block.distance => {
                trace!("Projectile from {} hit entity {} at {:.3} ahead of block {:?}", query.source, entity, distance, block.block.pos);
                RaytraceResult::EntityHit {
                    distance,
                    location: query.origin + query.direction * distance,
                    entity,
                }
            }
            (Some(block), _) => {
                trace!("Projectile from {} hit block {:?} at {:.3}", query.source, block.block.pos, block.distance);
                RaytraceResult::BlockHit { distance: block.distance, location: block.location, block: block.block }
            }
            (None, Some((entity, distance))) => {
                trace!("Projectile from {} hit entity {} at {:.3}", query.source, entity, distance);
                RaytraceResult::EntityHit {
                    distance,
                    location: query.origin + query.direction * distance,
                    entity,
                }
            }
            (None, None) => RaytraceResult::NoHit {
                travelled: traversal.travelled,
                out_of_bounds: traversal.out_of_bounds,
            },
        }
    }

    fn traverse_blocks(&self, query: &RayQuery) -> BlockTraversal {
        let origin = query.origin;
        let dir = query.direction;
        let mut block = BlockPos::containing(origin);

        if !self.world.is_chunk_loaded(block.chunk()) {
            return BlockTraversal { hit: None, travelled: 0.0, out_of_bounds: true, buckets: SmallVec::new() };
        }

        let step = [axis_step(dir.x), axis_step(dir.y), axis_step(dir.z)];
        let t_delta = [axis_delta(dir.x), axis_delta(dir.y), axis_delta(dir.z)];
        let mut t_max = [
            first_crossing(origin.x, block.x, dir.x),
            first_crossing(origin.y, block.y, dir.y),
            first_crossing(origin.z, block.z, dir.z),
        ];

        // a ray that does not move this tick crosses nothing
        let budget = if query.segment_length > 0.0 { query.segment_length + self.continuity_margin } else { 0.0 };
        let max_total = query.max_distance + self.max_distance_margin;
        let mut buckets: SmallVec<[ChunkCoord3D; EXPECTED_BUCKETS_PER_RAY]> = smallvec![block.bucket()];
        // distance at which the ray enters `block`
        let mut t = 0.0f32;

        while t < budget && query.travelled + t < max_total {
            let material = self.world.material_at(block);
            if !material.is_air() {
                let t_exit = t_max[0].min(t_max[1]).min(t_max[2]);
                let entry = origin + dir * t;
                if let Some(sub) = self.materials.tester(material).hit_distance(block, entry, dir, t_exit - t) {
                    let distance = t + sub;
                    return BlockTraversal {
                        hit: Some(BlockHit {
                            distance,
                            location: origin + dir * distance,
                            block: BlockRef { pos: block, material },
                        }),
                        travelled: distance,
                        out_of_bounds: false,
                        buckets,
                    };
                }
            }

            let axis = next_axis(&t_max);
            t = t_max[axis];
            t_max[axis] += t_delta[axis];
            let previous_column = block.chunk();
            match axis {
                0 => block.x += step[0],
                1 => block.y += step[1],
                _ => block.z += step[2],
            }

            let column = block.chunk();
            if column != previous_column && !self.world.is_chunk_loaded(column) {
                return BlockTraversal { hit: None, travelled: t, out_of_bounds: true, buckets };
            }
            let bucket = block.bucket();
            if !buckets.contains(&bucket) {
                buckets.push(bucket);
            }
        }

        BlockTraversal { hit: None, travelled: t, out_of_bounds: false, buckets }
    }

    fn closest_entity(
        &self,
        query: &RayQuery,
        hitboxes: &SpatialHitboxIndex,
        buckets: &[ChunkCoord3D],
    ) -> Option<(EntityId, f32)> {
        let mut excluded: Option<SmallVec<[EntityId; 4]>> = None;
        let inv_dir = inverse_direction(query.direction);
        let mut closest: Option<(EntityId, f32)> = None;

        for bucket in buckets {
            for hitbox in hitboxes.get(bucket) {
                let Some(distance) = hitbox.intersects_ray(query.origin, inv_dir) else {
                    continue;
                };
                if distance >= query.segment_length {
                    continue;
                }
                if closest.is_some_and(|(_, best)| best <= distance) {
                    continue;
                }
                let skip = excluded.get_or_insert_with(|| self.excluded_entities(query.source));
                if skip.contains(&hitbox.entity) {
                    continue;
                }
                closest = Some((hitbox.entity, distance));
            }
        }
        closest
    }

    // shooter, the entity it rides and everything riding it
    fn excluded_entities(&self, source: EntityId) -> SmallVec<[EntityId; 4]> {
        let mut excluded: SmallVec<[EntityId; 4]> = smallvec![source];
        if let Some(mount) = self.world.mount_of(source) {
            excluded.push(mount);
        }
        excluded.extend(self.world.riders_of(source));
        excluded
    }
}

#[inline]
fn axis_step(d: f32) -> i32 {
    if d >= 0.0 { 1 } else { -1 }
}

#[inline]
fn axis_delta(d: f32) -> f32 {
    if d != 0.0 { (1.0 / d).abs() } else { f32::MAX }
}

// parametric distance from `origin` to the first voxel boundary crossed on this axis
#[inline]
fn first_crossing(origin: f32, block: i32, d: f32) -> f32 {
    if d > 0.0 {
        ((block + 1) as f32 - origin) / d
    } else if d < 0.0 {
        (block as f32 - origin) / d
    } else {
        f32::MAX
    }
}

#[inline]
fn next_axis(t_max: &[f32; 3]) -> usize {
    if t_max[0] < t_max[1] {
        if t_max[0] < t_max[2] { 0 } else { 2 }
    } else if t_max[1] < t_max[2] {
        1
    } else {
        2
    }
}
