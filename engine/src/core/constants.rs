// voxel_ballistics/engine/src/core/constants.rs
use std::time::Duration;

pub const DEFAULT_TICK_RATE: u64 = 20;
pub const TICK_DURATION_MS: u64 = 1000 / DEFAULT_TICK_RATE;
pub const TICK_DURATION: Duration = Duration::from_millis(TICK_DURATION_MS);

// Chunk geometry
pub const CHUNK_SHIFT: i32 = 4;
pub const CHUNK_SIZE: i32 = 1 << CHUNK_SHIFT;

// Broad-phase constants
// Pad on each swept region so hitboxes centred in a neighbouring column are still gathered.
pub const HITBOX_CHUNK_MARGIN: f32 = 8.0;
// Largest hitbox extent on any axis the margin above covers.
pub const MAX_HITBOX_EXTENT: f32 = 16.0;
// Buckets a ray typically crosses in one tick (up to ~64 blocks).
pub const EXPECTED_BUCKETS_PER_RAY: usize = 4;

// Raytrace constants
// Extra traversal past the next point so consecutive ticks overlap and diagonal gaps are not skipped.
pub const RAYTRACE_CONTINUITY_MARGIN: f32 = 2.0;
pub const MAX_DISTANCE_MARGIN: f32 = 1.0;

// Store constants
pub const INITIAL_PROJECTILE_CAPACITY: usize = 2000;

// Weapon profile defaults (blocks/tick, blocks/tick^2, ticks, blocks)
pub const DEFAULT_PROJECTILE_VELOCITY: f32 = 16.0;
pub const DEFAULT_PROJECTILE_GRAVITY: f32 = 0.025;
pub const DEFAULT_PROJECTILE_LIFETIME: u32 = 400;
pub const DEFAULT_PROJECTILE_MAX_DISTANCE: f32 = 128.0;
pub const DEFAULT_PROJECTILE_DAMAGE: f64 = 4.0;

// Performance
pub const DEBUG_TIMINGS_HISTORY: usize = 200;
pub const SLOW_TICK_SLACK_MS: u64 = 5;
pub const STATUS_LOG_INTERVAL_TICKS: u64 = 100;
