// voxel_ballistics/engine/src/operational/monitoring/mod.rs
pub mod metrics;
pub mod timings;
