// voxel_ballistics/engine/src/world/hitbox_registry.rs
use crate::core::types::EntityId;
use crate::entities::hitbox::HitboxSize;
use dashmap::DashMap;
use tracing::trace;

/// Per-entity hitbox overrides (custom models, vehicles). Takes precedence over the
/// per-kind defaults and makes the entity targetable regardless of its kind.
/// Safe to mutate from any thread.
#[derive(Debug, Default)]
pub struct CustomHitboxRegistry {
    sizes: DashMap<EntityId, HitboxSize>,
}

impl CustomHitboxRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_hitbox(&self, entity: EntityId, size: HitboxSize) {
        trace!("Custom hitbox registered for entity {}: {:?}", entity, size);
        self.sizes.insert(entity, size);
    }

    pub fn remove_hitbox(&self, entity: EntityId) -> Option<HitboxSize> {
        self.sizes.remove(&entity).map(|(_, size)| size)
    }

    #[inline]
    pub fn get(&self, entity: EntityId) -> Option<HitboxSize> {
        self.sizes.get(&entity).map(|entry| *entry.value())
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}
