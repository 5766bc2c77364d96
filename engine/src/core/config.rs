// voxel_ballistics/engine/src/core/config.rs
use crate::core::constants::{
    DEBUG_TIMINGS_HISTORY, DEFAULT_TICK_RATE, HITBOX_CHUNK_MARGIN, INITIAL_PROJECTILE_CAPACITY,
    MAX_DISTANCE_MARGIN, MAX_HITBOX_EXTENT, RAYTRACE_CONTINUITY_MARGIN,
};
use crate::core::error::{EngineError, EngineResult};
use crate::core::types::{EntityKind, Material};
use crate::entities::hitbox::HitboxSize;
use crate::world::material::CollisionShape;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Default hitbox for an entity kind and whether projectiles may hit it at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityHitboxConfig {
    pub targetable: bool,
    pub size: HitboxSize,
}

impl EntityHitboxConfig {
    const fn new(targetable: bool, x_half: f32, z_half: f32, y_height: f32) -> Self {
        EntityHitboxConfig {
            targetable,
            size: HitboxSize { x_half, z_half, y_height, y_offset: 0.0 },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tick_rate: u64,
    pub initial_projectile_capacity: usize,
    pub hitbox_chunk_margin: f32,
    pub raytrace_continuity_margin: f32,
    pub max_distance_margin: f32,
    pub debug_timings: bool,
    pub timings_history: usize,
    pub entity_hitboxes: HashMap<EntityKind, EntityHitboxConfig>,
    // Keyed by raw material id; anything non-air and unlisted collides as a full cube.
    pub material_collision: HashMap<u16, CollisionShape>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let entity_hitboxes = HashMap::from([
            (EntityKind::Player, EntityHitboxConfig::new(true, 0.3, 0.3, 1.8)),
            (EntityKind::Zombie, EntityHitboxConfig::new(true, 0.3, 0.3, 1.95)),
            (EntityKind::Skeleton, EntityHitboxConfig::new(true, 0.3, 0.3, 1.99)),
            (EntityKind::Creeper, EntityHitboxConfig::new(true, 0.3, 0.3, 1.7)),
            (EntityKind::Villager, EntityHitboxConfig::new(true, 0.3, 0.3, 1.95)),
            (EntityKind::Animal, EntityHitboxConfig::new(true, 0.45, 0.45, 1.4)),
            (EntityKind::ArmorStand, EntityHitboxConfig::new(false, 0.25, 0.25, 1.975)),
            (EntityKind::Boat, EntityHitboxConfig::new(false, 0.7, 0.7, 0.5625)),
            (EntityKind::Minecart, EntityHitboxConfig::new(false, 0.49, 0.49, 0.7)),
            (EntityKind::ItemDrop, EntityHitboxConfig::new(false, 0.125, 0.125, 0.25)),
            (EntityKind::Other, EntityHitboxConfig::new(false, 0.5, 0.5, 1.0)),
        ]);

        let material_collision = HashMap::from([
            (Material::GLASS.0, CollisionShape::Solid),
            (Material::BOTTOM_SLAB.0, CollisionShape::BottomSlab),
            (Material::TOP_SLAB.0, CollisionShape::TopSlab),
            (Material::FENCE.0, CollisionShape::Post),
            (Material::CARPET.0, CollisionShape::Carpet),
        ]);

        EngineConfig {
            tick_rate: DEFAULT_TICK_RATE,
            initial_projectile_capacity: INITIAL_PROJECTILE_CAPACITY,
            hitbox_chunk_margin: HITBOX_CHUNK_MARGIN,
            raytrace_continuity_margin: RAYTRACE_CONTINUITY_MARGIN,
            max_distance_margin: MAX_DISTANCE_MARGIN,
            debug_timings: true,
            timings_history: DEBUG_TIMINGS_HISTORY,
            entity_hitboxes,
            material_collision,
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(source: &str) -> EngineResult<Self> {
        let config: EngineConfig = serde_yaml::from_str(source)?;
        config.validate()?;
        debug!(
            "Parsed engine config: tick_rate={}, {} entity hitbox entries, {} material overrides",
            config.tick_rate,
            config.entity_hitboxes.len(),
            config.material_collision.len()
        );
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&source)?;
        info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.tick_rate == 0 {
            return Err(EngineError::ConfigError("tick_rate must be greater than zero".into()));
        }
        if self.timings_history == 0 {
            return Err(EngineError::ConfigError("timings_history must be greater than zero".into()));
        }
        for (name, value) in [
            ("hitbox_chunk_margin", self.hitbox_chunk_margin),
            ("raytrace_continuity_margin", self.raytrace_continuity_margin),
            ("max_distance_margin", self.max_distance_margin),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(EngineError::ConfigError(format!("{} must be a finite non-negative number, got {}", name, value)));
            }
        }
        for (kind, entry) in &self.entity_hitboxes {
            entry
                .size
                .validate(MAX_HITBOX_EXTENT)
                .map_err(|reason| EngineError::ConfigError(format!("hitbox for {:?}: {}", kind, reason)))?;
        }
        Ok(())
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::from_millis(1000 / self.tick_rate.max(1))
    }

    /// Default hitbox for `kind`, or `None` when the kind is not targetable.
    pub fn entity_hitbox(&self, kind: EntityKind) -> Option<HitboxSize> {
        self.entity_hitboxes
            .get(&kind)
            .filter(|entry| entry.targetable)
            .map(|entry| entry.size)
    }
}
