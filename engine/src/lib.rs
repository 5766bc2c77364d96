// voxel_ballistics/engine/src/lib.rs

pub mod core;
pub mod concurrent;
pub mod entities;
pub mod world;
pub mod server;
pub mod operational;
pub mod systems;

pub use crate::core::config::EngineConfig;
pub use crate::core::error::{EngineError, EngineResult};
pub use crate::server::engine::ProjectileEngine;
pub use crate::systems::projectile_store::ProjectileStore;
