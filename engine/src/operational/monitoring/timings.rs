// voxel_ballistics/engine/src/operational/monitoring/timings.rs
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickTiming {
    // drain + integrate + hitbox index build
    pub hitbox_index: Duration,
    // raytrace + compaction
    pub projectile_update: Duration,
}

impl TickTiming {
    pub fn total(&self) -> Duration {
        self.hitbox_index + self.projectile_update
    }
}

/// Rolling per-store history of the last `capacity` tick timings.
#[derive(Debug, Clone)]
pub struct DebugTimings {
    history: VecDeque<TickTiming>,
    capacity: usize,
}

impl DebugTimings {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        DebugTimings { history: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn record(&mut self, timing: TickTiming) {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(timing);
    }

    pub fn last(&self) -> Option<TickTiming> {
        self.history.back().copied()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TickTiming> {
        self.history.iter()
    }

    pub fn average(&self) -> TickTiming {
        if self.history.is_empty() {
            return TickTiming::default();
        }
        let n = self.history.len() as u32;
        let (index_sum, update_sum) = self
            .history
            .iter()
            .fold((Duration::ZERO, Duration::ZERO), |(a, b), t| (a + t.hitbox_index, b + t.projectile_update));
        TickTiming { hitbox_index: index_sum / n, projectile_update: update_sum / n }
    }

    /// Per-component maxima; the two fields may come from different ticks.
    pub fn max(&self) -> TickTiming {
        self.history.iter().fold(TickTiming::default(), |acc, t| TickTiming {
            hitbox_index: acc.hitbox_index.max(t.hitbox_index),
            projectile_update: acc.projectile_update.max(t.projectile_update),
        })
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

impl Default for DebugTimings {
    fn default() -> Self {
        Self::new(crate::core::constants::DEBUG_TIMINGS_HISTORY)
    }
}
