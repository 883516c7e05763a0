//! Boss behavior
//!
//! The boss seeks slowly, charges and dashes when the player gets close,
//! fires a homing missile on a fixed cadence and periodically summons
//! shooters. All three run independently of each other.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::{DashProfile, DashState, EnemyAction};
use crate::consts::BOSS_CONTACT_COOLDOWN_MS;

pub const BOSS_DASH: DashProfile = DashProfile {
    trigger_range: 200.0,
    charge_ms: 800,
    cooldown_ms: 3000,
    speed_multiplier: 100.0,
    // A single movement step
    dash_ms: 1,
};

pub const BOSS_MISSILE_COOLDOWN_MS: u64 = 3000;
pub const BOSS_SUMMON_COOLDOWN_MS: u64 = 25_000;
pub const BOSS_SUMMON_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossBrain {
    pub dash: DashState,
    pub last_missile: u64,
    pub last_summon: u64,
    /// Last time touching the player did damage
    pub last_contact: Option<u64>,
}

impl BossBrain {
    pub fn new(now: u64) -> Self {
        Self {
            dash: DashState::new(now),
            last_missile: now,
            last_summon: now,
            last_contact: None,
        }
    }

    /// Advance all boss timers; returns this tick's movement
    pub fn step(
        &mut self,
        now: u64,
        pos: Vec2,
        target: Vec2,
        base_speed: f32,
        actions: &mut Vec<EnemyAction>,
    ) -> Vec2 {
        let was_charging = self.dash.is_charging();
        let movement = self.dash.step(&BOSS_DASH, now, pos, target, base_speed);
        if !was_charging && self.dash.is_charging() {
            log::debug!("Boss charging at t={now}");
        }

        if now.saturating_sub(self.last_missile) >= BOSS_MISSILE_COOLDOWN_MS {
            actions.push(EnemyAction::FireMissile { from: pos });
            self.last_missile = now;
        }

        if now.saturating_sub(self.last_summon) >= BOSS_SUMMON_COOLDOWN_MS {
            actions.push(EnemyAction::SummonShooters {
                count: BOSS_SUMMON_COUNT,
            });
            self.last_summon = now;
        }

        movement
    }

    /// Contact damage from the boss is rate limited; returns true when
    /// this contact should hurt
    pub fn try_contact(&mut self, now: u64) -> bool {
        let ready = self
            .last_contact
            .is_none_or(|t| now.saturating_sub(t) >= BOSS_CONTACT_COOLDOWN_MS);
        if ready {
            self.last_contact = Some(now);
        }
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::DashPhase;

    #[test]
    fn test_boss_fires_missile_every_cooldown() {
        let mut brain = BossBrain::new(0);
        let mut actions = Vec::new();
        let far = Vec2::new(1000.0, 0.0);

        brain.step(2999, Vec2::ZERO, far, 0.75, &mut actions);
        assert!(actions.is_empty());
        brain.step(3000, Vec2::ZERO, far, 0.75, &mut actions);
        assert_eq!(actions, vec![EnemyAction::FireMissile { from: Vec2::ZERO }]);
        brain.step(3500, Vec2::ZERO, far, 0.75, &mut actions);
        assert_eq!(actions.len(), 1);
    }

    #[test]
    fn test_boss_summons_shooters() {
        let mut brain = BossBrain::new(0);
        let mut actions = Vec::new();
        brain.step(25_000, Vec2::ZERO, Vec2::new(1000.0, 0.0), 0.75, &mut actions);
        assert!(actions.contains(&EnemyAction::SummonShooters { count: 3 }));
    }

    #[test]
    fn test_boss_dash_is_a_single_fast_step() {
        let mut brain = BossBrain::new(0);
        let mut actions = Vec::new();
        let target = Vec2::new(150.0, 0.0);

        let m = brain.step(3000, Vec2::ZERO, target, 0.75, &mut actions);
        assert_eq!(m, Vec2::ZERO);
        assert!(brain.dash.is_charging());

        let m = brain.step(3800, Vec2::ZERO, target, 0.75, &mut actions);
        assert!((m.x - 75.0).abs() < 1e-4);

        let m = brain.step(3817, Vec2::ZERO, target, 0.75, &mut actions);
        assert_eq!(brain.dash.phase, DashPhase::Seeking);
        assert!((m.x - 0.75).abs() < 1e-4);
    }

    #[test]
    fn test_boss_contact_rate_limited() {
        let mut brain = BossBrain::new(0);
        assert!(brain.try_contact(100));
        assert!(!brain.try_contact(500));
        assert!(brain.try_contact(1100));
    }
}
