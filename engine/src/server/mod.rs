// voxel_ballistics/engine/src/server/mod.rs
pub mod engine;
pub mod tick_loop;
