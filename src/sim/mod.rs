//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (60 Hz, time in simulation milliseconds)
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod boss;
pub mod director;
pub mod economy;
pub mod enemy;
pub mod geometry;
pub mod obstacle;
pub mod player;
pub mod projectile;
pub mod state;
pub mod tick;
pub mod upgrade;

pub use autopilot::{auto_purchase, autopilot};
pub use director::{WaveDirector, spawn_interval};
pub use economy::{Action, CurrencyPickup, purchase};
pub use enemy::{ActorState, Archetype, Enemy};
pub use geometry::{Circle, Rect};
pub use obstacle::{Obstacle, ObstacleField};
pub use player::Player;
pub use projectile::{EnemyBullet, Missile, PlayerBullet};
pub use state::{GameEvent, GamePhase, RunSummary, SimContext, Snapshot, World};
pub use tick::{TickInput, tick};
pub use upgrade::{AbilityEffect, Upgrade};
