// voxel_ballistics/engine/src/concurrent/mod.rs
pub mod hitbox_index;
pub mod ingress_queue;
