pub mod hitbox;
pub mod projectile;
pub mod weapon;
