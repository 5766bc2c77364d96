// voxel_ballistics/engine/src/operational/mod.rs
pub mod monitoring;
