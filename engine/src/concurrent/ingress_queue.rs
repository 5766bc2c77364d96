// voxel_ballistics/engine/src/concurrent/ingress_queue.rs
use crate::entities::projectile::Projectile;
use crossbeam_queue::SegQueue;
use std::sync::Arc;

// Lock-free multi-producer queue of projectiles created off the simulation thread.
// Drained once per tick, at the start of the store update.
#[derive(Debug, Default)]
pub struct IngressQueue {
    queue: Arc<SegQueue<Projectile>>,
}

impl IngressQueue {
    pub fn new() -> Self {
        IngressQueue { queue: Arc::new(SegQueue::new()) }
    }

    pub fn push(&self, projectile: Projectile) {
        self.queue.push(projectile);
    }

    /// Cloneable producer handle sharing this queue.
    pub fn handle(&self) -> ProjectileIngress {
        ProjectileIngress { queue: Arc::clone(&self.queue) }
    }

    /// Moves everything currently queued onto the end of `out`, oldest first.
    pub fn drain_into(&self, out: &mut Vec<Projectile>) -> usize {
        let mut count = 0;
        while let Some(projectile) = self.queue.pop() {
            out.push(projectile);
            count += 1;
        }
        count
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Send + Sync handle for submitting projectiles from any thread. Projectiles pushed here become
/// visible at the next store update.
#[derive(Debug, Clone)]
pub struct ProjectileIngress {
    queue: Arc<SegQueue<Projectile>>,
}

impl ProjectileIngress {
    pub fn add_projectile(&self, projectile: Projectile) {
        self.queue.push(projectile);
    }

    pub fn add_projectiles(&self, projectiles: impl IntoIterator<Item = Projectile>) {
        for projectile in projectiles {
            self.queue.push(projectile);
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}
