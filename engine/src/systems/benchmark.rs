// voxel_ballistics/engine/src/systems/benchmark.rs
use crate::core::types::{EntityId, Vec3, WorldId};
use crate::entities::projectile::Projectile;
use crate::entities::weapon::WeaponProfile;
use crate::systems::projectile_store::ProjectileStore;
use crate::world::WorldView;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::trace;

/// Keeps a store topped up with synthetic projectiles fired in random directions from a
/// fixed origin. Used for load testing the per-tick update.
#[derive(Debug)]
pub struct BenchmarkSpawner {
    pub world: WorldId,
    pub source: EntityId,
    pub origin: Vec3,
    pub target_count: usize,
    pub weapon: Arc<WeaponProfile>,
    rng: StdRng,
}

impl BenchmarkSpawner {
    pub fn new(world: WorldId, source: EntityId, origin: Vec3, target_count: usize, weapon: Arc<WeaponProfile>) -> Self {
        BenchmarkSpawner { world, source, origin, target_count, weapon, rng: StdRng::from_entropy() }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn random_projectile(&mut self) -> Projectile {
        let direction = Vec3::new(
            self.rng.gen_range(-1.0..1.0),
            self.rng.gen_range(-0.1..0.5),
            self.rng.gen_range(-1.0..1.0),
        );
        self.weapon.create_projectile(self.source, self.origin, direction)
    }

    /// Adds projectiles until the store holds `target_count`. Returns how many were spawned.
    pub fn spawn_into<W: WorldView + ?Sized>(&mut self, store: &mut ProjectileStore<W>) -> usize {
        let missing = self.target_count.saturating_sub(store.size());
        if missing > 0 {
            let batch: Vec<Projectile> = (0..missing).map(|_| self.random_projectile()).collect();
            store.add_projectiles(batch);
            trace!("Benchmark spawner topped up world {} with {} projectiles", self.world, missing);
        }
        missing
    }
}
