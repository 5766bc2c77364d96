// voxel_ballistics/engine/src/systems/mod.rs
pub mod benchmark;
pub mod hit_events;
pub mod physics;
pub mod projectile_store;
