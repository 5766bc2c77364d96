// voxel_ballistics/engine/src/systems/physics/mod.rs
pub mod ballistics;
pub mod raytrace;
