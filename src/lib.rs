//! Last Stand - a wave-based top-down arena survival game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, combat, waves, economy)
//! - `tuning`: Data-driven game balance
//! - `highscores`: Leaderboard of finished runs
//! - `error`: Configuration, shop and storage errors

pub mod error;
pub mod highscores;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, ShopError, StorageError};
pub use highscores::HighScores;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Simulation rate (ticks per second)
    pub const TICK_RATE: u64 = 60;

    /// Inset applied to rectangular obstacles so bodies sliding along a
    /// wall seam don't register as overlapping
    pub const OBSTACLE_INSET: f32 = 1.0;
    /// Extra reach for circle-vs-rectangle tests so edge contact counts
    pub const CIRCLE_CONTACT_BUFFER: f32 = 1.0;

    /// Side length of the player-spawn safe zone kept clear of buildings
    pub const SAFE_ZONE_SIZE: f32 = 200.0;

    /// Explosion radius for explosive shots and boss missiles
    pub const EXPLOSION_RADIUS: f32 = 50.0;
    /// Visual lifetime of an explosion effect (ms)
    pub const EXPLOSION_EFFECT_MS: u64 = 300;
    /// How far a bullet is pushed along its velocity after hitting an
    /// enemy (multiples of its per-tick velocity)
    pub const PIERCE_ADVANCE: f32 = 5.0;

    /// Player bullet size
    pub const BULLET_SIZE: f32 = 10.0;
    /// Enemy bullet size and speed
    pub const ENEMY_BULLET_SIZE: f32 = 8.0;
    pub const ENEMY_BULLET_SPEED: f32 = 7.0;

    /// Boss missile
    pub const MISSILE_SIZE: f32 = 16.0;
    pub const MISSILE_SPEED: f32 = 3.0;
    pub const MISSILE_TURN_RATE: f32 = 0.05;
    /// Damage a missile explosion deals to enemies caught in it
    pub const MISSILE_ENEMY_DAMAGE: i32 = 2;

    /// Swarm flocking
    pub const SWARM_GROUP_SIZE: usize = 5;
    pub const SWARM_SEPARATION_DISTANCE: f32 = 30.0;
    pub const SWARM_COHESION_WEIGHT: f32 = 0.02;
    pub const SWARM_SEPARATION_WEIGHT: f32 = 0.05;
    pub const SWARM_ALIGNMENT_WEIGHT: f32 = 0.1;
    /// Spread of a swarm group around its spawn point
    pub const SWARM_SPAWN_SPREAD: f32 = 40.0;

    /// Pickup size and collection radius
    pub const PICKUP_SIZE: f32 = 15.0;
    pub const PICKUP_RADIUS: f32 = 15.0;

    /// Number of upgrade choices offered per level-up
    pub const UPGRADE_CHOICES: usize = 3;
    /// Boss contact can only hurt the player once per this window (ms)
    pub const BOSS_CONTACT_COOLDOWN_MS: u64 = 1000;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector pointing along `angle`
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of the vector from `from` to `to`
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    delta.y.atan2(delta.x)
}

/// Convert a tick count to simulation milliseconds
#[inline]
pub fn ticks_to_ms(ticks: u64) -> u64 {
    ticks * 1000 / consts::TICK_RATE
}
