// voxel_ballistics/engine/src/server/engine.rs
use crate::concurrent::ingress_queue::ProjectileIngress;
use crate::core::config::EngineConfig;
use crate::core::constants::STATUS_LOG_INTERVAL_TICKS;
use crate::core::error::{EngineError, EngineResult};
use crate::core::types::{ChunkCoord, WorldId};
use crate::entities::projectile::Projectile;
use crate::operational::monitoring::metrics::describe_metrics;
use crate::systems::benchmark::BenchmarkSpawner;
use crate::systems::hit_events::ProjectileSystemUpdate;
use crate::systems::projectile_store::ProjectileStore;
use crate::world::hitbox_registry::CustomHitboxRegistry;
use crate::world::material::MaterialCollisionTable;
use crate::world::WorldView;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Owns one projectile store per world and runs them all once per tick.
pub struct ProjectileEngine<W: WorldView + ?Sized> {
    config: Arc<EngineConfig>,
    materials: Arc<MaterialCollisionTable>,
    custom_hitboxes: Arc<CustomHitboxRegistry>,
    stores: BTreeMap<WorldId, ProjectileStore<W>>,
    spawners: Vec<BenchmarkSpawner>,
    tick_count: u64,
}

impl<W: WorldView + ?Sized> ProjectileEngine<W> {
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        let materials = MaterialCollisionTable::from_config(&config);
        Self::with_materials(config, materials)
    }

    /// Engine using a caller-built material table (e.g. with custom `FineCollisionTester`s).
    pub fn with_materials(config: EngineConfig, materials: MaterialCollisionTable) -> EngineResult<Self> {
        config.validate()?;
        describe_metrics();
        info!(
            "Projectile engine initialised: tick_rate={}, {} material overrides",
            config.tick_rate,
            materials.len()
        );
        Ok(ProjectileEngine {
            config: Arc::new(config),
            materials: Arc::new(materials),
            custom_hitboxes: Arc::new(CustomHitboxRegistry::new()),
            stores: BTreeMap::new(),
            spawners: Vec::new(),
            tick_count: 0,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registry shared by every world; safe to update from any thread.
    pub fn custom_hitboxes(&self) -> &Arc<CustomHitboxRegistry> {
        &self.custom_hitboxes
    }

    /// Returns false (and leaves the existing store alone) if `id` is already registered.
    pub fn add_world(&mut self, id: WorldId, world: Arc<W>) -> bool {
        if self.stores.contains_key(&id) {
            warn!("World {} already has a projectile store", id);
            return false;
        }
        let store = ProjectileStore::new(
            id,
            world,
            Arc::clone(&self.config),
            Arc::clone(&self.materials),
            Arc::clone(&self.custom_hitboxes),
        );
        self.stores.insert(id, store);
        info!("World {} registered with projectile engine", id);
        true
    }

    pub fn remove_world(&mut self, id: WorldId) -> Option<ProjectileStore<W>> {
        let removed = self.stores.remove(&id);
        if let Some(store) = &removed {
            info!("World {} removed, dropping {} live projectiles", id, store.size());
            self.spawners.retain(|s| s.world != id);
        }
        removed
    }

    pub fn store(&self, id: WorldId) -> Option<&ProjectileStore<W>> {
        self.stores.get(&id)
    }

    pub fn store_mut(&mut self, id: WorldId) -> Option<&mut ProjectileStore<W>> {
        self.stores.get_mut(&id)
    }

    pub fn world_ids(&self) -> impl Iterator<Item = WorldId> + '_ {
        self.stores.keys().copied()
    }

    pub fn ingress(&self, world: WorldId) -> EngineResult<ProjectileIngress> {
        self.stores
            .get(&world)
            .map(ProjectileStore::ingress)
            .ok_or_else(|| EngineError::NotFound(format!("no projectile store for world {}", world)))
    }

    /// Returns false if the world is unknown; the projectile is dropped in that case.
    pub fn add_projectile(&mut self, world: WorldId, projectile: Projectile) -> bool {
        match self.stores.get_mut(&world) {
            Some(store) => {
                store.add_projectile(projectile);
                true
            }
            None => {
                debug!("Dropping projectile for unknown world {}", world);
                false
            }
        }
    }

    /// Rebinds every store to the calling thread; see `ProjectileStore::bind_to_current_thread`.
    pub fn bind_to_current_thread(&mut self) {
        for store in self.stores.values_mut() {
            store.bind_to_current_thread();
        }
    }

    pub fn add_benchmark_spawner(&mut self, spawner: BenchmarkSpawner) {
        info!(
            "Benchmark spawner added: world {}, {} projectiles from {:?}",
            spawner.world, spawner.target_count, spawner.origin
        );
        self.spawners.push(spawner);
    }

    pub fn tick(&mut self) -> Vec<(WorldId, ProjectileSystemUpdate)> {
        self.tick_with_visited(&HashMap::new())
    }

    /// Runs every store once, in world id order, dispatching each world's hits to the weapon
    /// handlers before moving on. `visited` adds extra chunk columns per world to that world's
    /// hitbox index.
    pub fn tick_with_visited(
        &mut self,
        visited: &HashMap<WorldId, Vec<ChunkCoord>>,
    ) -> Vec<(WorldId, ProjectileSystemUpdate)> {
        for spawner in &mut self.spawners {
            match self.stores.get_mut(&spawner.world) {
                Some(store) => {
                    spawner.spawn_into(store);
                }
                None => warn!("Benchmark spawner targets unknown world {}", spawner.world),
            }
        }

        let mut updates = Vec::with_capacity(self.stores.len());
        for (&id, store) in self.stores.iter_mut() {
            let extra = visited.get(&id).map(Vec::as_slice).unwrap_or(&[]);
            let update = store.update_with_visited(extra);
            update.dispatch_hits();
            updates.push((id, update));
        }

        self.tick_count += 1;
        if self.tick_count % STATUS_LOG_INTERVAL_TICKS == 0 {
            info!(
                "Projectile engine tick {}: {} worlds, {} live projectiles",
                self.tick_count,
                self.stores.len(),
                self.total_projectiles()
            );
        }
        updates
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn total_projectiles(&self) -> usize {
        self.stores.values().map(ProjectileStore::size).sum()
    }
}
