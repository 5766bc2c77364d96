// voxel_ballistics/engine/src/systems/projectile_store.rs
use crate::concurrent::hitbox_index::SpatialHitboxIndex;
use crate::concurrent::ingress_queue::{IngressQueue, ProjectileIngress};
use crate::core::config::EngineConfig;
use crate::core::types::{ChunkCoord, WorldId};
use crate::entities::projectile::Projectile;
use crate::operational::monitoring::metrics::{record_store_tick, StoreTickMetrics};
use crate::operational::monitoring::timings::{DebugTimings, TickTiming};
use crate::systems::hit_events::{ProjectileHitBlock, ProjectileHitEntity, ProjectileSystemUpdate};
use crate::systems::physics::ballistics::{integrate, ColumnSet};
use crate::systems::physics::raytrace::{RayQuery, RaytraceResult, VoxelRaytracer};
use crate::world::hitbox_registry::CustomHitboxRegistry;
use crate::world::material::MaterialCollisionTable;
use crate::world::WorldView;
use std::mem;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::Instant;
use tracing::{debug, trace};

/// Live projectiles of one world, advanced once per tick by `update()`.
///
/// The store binds to the thread that first runs `update()`. Projectiles added on that thread
/// (or before binding) go straight into the active set; anything else goes through the ingress
/// queue and is picked up at the start of the next update. A host that moves its tick onto a
/// different thread calls `bind_to_current_thread` from the new one.
pub struct ProjectileStore<W: WorldView + ?Sized> {
    world_id: WorldId,
    world: Arc<W>,
    config: Arc<EngineConfig>,
    materials: Arc<MaterialCollisionTable>,
    custom_hitboxes: Arc<CustomHitboxRegistry>,

    // double buffer: survivors of `active` are moved into `staging`, then the two swap
    active: Vec<Projectile>,
    staging: Vec<Projectile>,
    ingress: IngressQueue,
    owner_thread: Option<ThreadId>,

    columns: ColumnSet,
    timings: Option<DebugTimings>,
}

impl<W: WorldView + ?Sized> ProjectileStore<W> {
    pub fn new(
        world_id: WorldId,
        world: Arc<W>,
        config: Arc<EngineConfig>,
        materials: Arc<MaterialCollisionTable>,
        custom_hitboxes: Arc<CustomHitboxRegistry>,
    ) -> Self {
        let capacity = config.initial_projectile_capacity;
        let timings = config.debug_timings.then(|| DebugTimings::new(config.timings_history));
        debug!("Projectile store for world {} created (capacity {})", world_id, capacity);
        ProjectileStore {
            world_id,
            world,
            config,
            materials,
            custom_hitboxes,
            active: Vec::with_capacity(capacity),
            staging: Vec::with_capacity(capacity),
            ingress: IngressQueue::new(),
            owner_thread: None,
            columns: ColumnSet::new(),
            timings,
        }
    }

    /// Store with its own material table and an empty custom hitbox registry.
    pub fn with_config(world_id: WorldId, world: Arc<W>, config: EngineConfig) -> Self {
        let materials = Arc::new(MaterialCollisionTable::from_config(&config));
        Self::new(world_id, world, Arc::new(config), materials, Arc::new(CustomHitboxRegistry::new()))
    }

    fn on_owner_thread(&self) -> bool {
        self.owner_thread.map_or(true, |owner| owner == thread::current().id())
    }

    /// Makes the calling thread the simulation thread for direct adds.
    pub fn bind_to_current_thread(&mut self) {
        let current = thread::current().id();
        if self.owner_thread.replace(current).is_some_and(|previous| previous != current) {
            debug!("World {} projectile store rebound to {:?}", self.world_id, current);
        }
    }

    pub fn add_projectile(&mut self, projectile: Projectile) {
        if self.on_owner_thread() {
            self.active.push(projectile);
        } else {
            self.ingress.push(projectile);
        }
    }

    pub fn add_projectiles(&mut self, projectiles: impl IntoIterator<Item = Projectile>) {
        if self.on_owner_thread() {
            self.active.extend(projectiles);
        } else {
            for projectile in projectiles {
                self.ingress.push(projectile);
            }
        }
    }

    /// Producer handle for threads that cannot borrow the store.
    pub fn ingress(&self) -> ProjectileIngress {
        self.ingress.handle()
    }

    pub fn update(&mut self) -> ProjectileSystemUpdate {
        self.update_with_visited(&[])
    }

    /// Runs one tick. `extra_columns` are chunk columns other systems need in this tick's hitbox
    /// index even when no projectile sweeps them; unloaded ones are skipped.
    pub fn update_with_visited(&mut self, extra_columns: &[ChunkCoord]) -> ProjectileSystemUpdate {
        let index_started = Instant::now();
        if self.owner_thread.is_none() {
            self.owner_thread = Some(thread::current().id());
        }

        let drained = self.ingress.drain_into(&mut self.active);

        let margin = self.config.hitbox_chunk_margin;
        self.columns.clear();
        for projectile in self.active.iter_mut() {
            integrate(projectile);
            self.columns.add_sweep(&*self.world, projectile.position, projectile.next_position, margin);
        }
        for &column in extra_columns {
            self.columns.insert_if_loaded(&*self.world, column);
        }

        let hitboxes = SpatialHitboxIndex::build_from_world(
            &*self.world,
            self.columns.as_slice(),
            &self.config,
            &self.custom_hitboxes,
        );
        let index_elapsed = index_started.elapsed();

        let update_started = Instant::now();
        let tracer = VoxelRaytracer::new(&*self.world, &self.materials, &self.config);
        let processed = self.active.len();
        let mut hit_blocks = Vec::new();
        let mut hit_entities = Vec::new();
        let mut retired = 0usize;
        self.staging.clear();

        while let Some(mut projectile) = self.active.pop() {
            let result = tracer.trace(&RayQuery::from_projectile(&projectile), &hitboxes);
            let travelled_before = projectile.distance;
            projectile.finish_tick();

            match result {
                RaytraceResult::BlockHit { location, block, .. } => {
                    hit_blocks.push(ProjectileHitBlock {
                        block,
                        location,
                        source: projectile.source,
                        weapon: projectile.weapon,
                    });
                    retired += 1;
                }
                RaytraceResult::EntityHit { distance, location, entity } => {
                    hit_entities.push(ProjectileHitEntity {
                        entity,
                        location,
                        source: projectile.source,
                        weapon: projectile.weapon,
                        distance: f64::from(travelled_before + distance),
                    });
                    retired += 1;
                }
                RaytraceResult::NoHit { out_of_bounds: true, .. } => {
                    trace!("Projectile from {} left loaded chunks at {:?}", projectile.source, projectile.position);
                    retired += 1;
                }
                RaytraceResult::NoHit { .. } if projectile.is_expired() => {
                    retired += 1;
                }
                RaytraceResult::NoHit { .. } => {
                    projectile.move_to_next();
                    self.staging.push(projectile);
                }
            }
        }

        debug_assert!(self.active.is_empty());
        debug_assert_eq!(processed, self.staging.len() + retired);
        mem::swap(&mut self.active, &mut self.staging);
        let update_elapsed = update_started.elapsed();

        let tick = StoreTickMetrics {
            active: self.active.len(),
            drained,
            block_hits: hit_blocks.len(),
            entity_hits: hit_entities.len(),
            retired,
        };
        record_store_tick(self.world_id, &tick, index_elapsed, update_elapsed);
        if let Some(timings) = self.timings.as_mut() {
            timings.record(TickTiming { hitbox_index: index_elapsed, projectile_update: update_elapsed });
        }
        if processed > 0 {
            debug!(
                "World {} projectile tick: {} processed ({} from ingress), {} block hits, {} entity hits, {} retired, {} active, {} hitboxes over {} columns in {:?}+{:?}",
                self.world_id,
                processed,
                drained,
                tick.block_hits,
                tick.entity_hits,
                retired,
                tick.active,
                hitboxes.len(),
                self.columns.len(),
                index_elapsed,
                update_elapsed
            );
        }

        ProjectileSystemUpdate::new(hitboxes, hit_blocks, hit_entities)
    }

    /// Live projectiles. Ingress entries are not counted until drained.
    pub fn size(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn pending_ingress(&self) -> usize {
        self.ingress.len()
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.active
    }

    pub fn world_id(&self) -> WorldId {
        self.world_id
    }

    pub fn world(&self) -> &Arc<W> {
        &self.world
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn custom_hitboxes(&self) -> &Arc<CustomHitboxRegistry> {
        &self.custom_hitboxes
    }

    /// `None` when debug timings are disabled in the config.
    pub fn timings(&self) -> Option<&DebugTimings> {
        self.timings.as_ref()
    }
}
