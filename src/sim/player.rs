//! The player character
//!
//! Movement, shooting, leveling and the three shop-unlocked active
//! abilities. Every trigger is polled each tick and gated only by its own
//! cooldown, so holding a key keeps firing as cooldowns expire.

use std::collections::BTreeSet;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::economy::Action;
use super::enemy::Enemy;
use super::geometry::Rect;
use super::projectile::{CombatReport, Kill, PlayerBullet};
use super::state::SimContext;
use super::upgrade::{Upgrade, apply_effect, roll_offer};
use crate::tuning::{AbilityTuning, Tuning};
use crate::{angle_between, direction};

/// Stacking passive modifiers from upgrades
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Permanent speed bonus (0.2 = 20% faster)
    pub speed_bonus: f32,
    /// Extra bullets queued after each shot
    pub bonus_bullets: u32,
    pub pierce: i32,
    pub ricochet: u32,
    /// Fire delay is divided by this
    pub fire_rate: f32,
    /// Speed bonus while adrenaline is active
    pub adrenaline: f32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            speed_bonus: 0.0,
            bonus_bullets: 0,
            pierce: 0,
            ricochet: 0,
            fire_rate: 1.0,
            adrenaline: 0.0,
        }
    }
}

/// An active sword swing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwordSwing {
    pub started: u64,
    /// Facing, updated each tick to follow the aim point
    pub angle: f32,
    /// Enemies already struck by this swing
    pub struck: Vec<u32>,
}

impl SwordSwing {
    /// Hilt and tip of the blade for a player centered at `center`
    pub fn blade(&self, center: Vec2, abilities: &AbilityTuning) -> (Vec2, Vec2) {
        let dir = direction(self.angle);
        let hilt = center + dir * abilities.sword_offset;
        (hilt, hilt + dir * abilities.sword_length)
    }
}

/// Dash impulse; overrides normal movement until it expires
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashImpulse {
    pub until: u64,
    pub velocity: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Rect,
    pub health: i32,
    pub xp: u32,
    pub level: u32,
    pub xp_threshold: u32,
    pub currency: u32,
    pub stats: PlayerStats,
    /// Active abilities bought in the shop
    pub actions: BTreeSet<Action>,
    /// Last normalized movement direction
    pub facing: Vec2,

    pub last_shot: Option<u64>,
    pub last_explosive: Option<u64>,
    pub last_sword: Option<u64>,
    pub last_dash: Option<u64>,
    pub sword: Option<SwordSwing>,
    pub dash: Option<DashImpulse>,
    pub adrenaline_until: Option<u64>,

    /// Level-ups not yet resolved with an upgrade pick
    pub pending_level_ups: u32,
    /// Upgrades currently on offer (empty when no choice is pending)
    pub offer: Vec<Upgrade>,
}

fn ready(last: Option<u64>, now: u64, cooldown_ms: u64) -> bool {
    last.is_none_or(|t| now.saturating_sub(t) >= cooldown_ms)
}

impl Player {
    pub fn new(center: Vec2, tuning: &Tuning) -> Self {
        let p = &tuning.player;
        Self {
            body: Rect::centered(center, p.size, p.size),
            health: p.health,
            xp: 0,
            level: 1,
            xp_threshold: p.xp_threshold.max(1),
            currency: 0,
            stats: PlayerStats::default(),
            actions: BTreeSet::new(),
            facing: Vec2::X,
            last_shot: None,
            last_explosive: None,
            last_sword: None,
            last_dash: None,
            sword: None,
            dash: None,
            adrenaline_until: None,
            pending_level_ups: 0,
            offer: Vec::new(),
        }
    }

    pub fn center(&self) -> Vec2 {
        self.body.center()
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Returns true if this damage killed the player
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.is_dead() {
            return false;
        }
        self.health -= amount;
        self.is_dead()
    }

    pub fn has_action(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }

    /// Returns false if the action was already unlocked
    pub fn unlock(&mut self, action: Action) -> bool {
        self.actions.insert(action)
    }

    pub fn adrenaline_active(&self, now: u64) -> bool {
        self.adrenaline_until.is_some_and(|until| now < until)
    }

    /// Movement per tick along each pressed axis
    pub fn speed(&self, now: u64, tuning: &Tuning) -> f32 {
        let adrenaline = if self.adrenaline_active(now) {
            self.stats.adrenaline
        } else {
            0.0
        };
        tuning.player.speed * (1.0 + self.stats.speed_bonus) * (1.0 + adrenaline)
    }

    /// Move along `input` (each axis -1, 0 or 1). Diagonals are not
    /// normalized. An active dash replaces input movement.
    pub fn update_movement(&mut self, ctx: &SimContext, input: Vec2) {
        if input != Vec2::ZERO {
            self.facing = input.normalize();
        }

        let delta = match self.dash {
            Some(dash) if ctx.now < dash.until => dash.velocity,
            _ => {
                self.dash = None;
                input * self.speed(ctx.now, ctx.tuning)
            }
        };

        ctx.obstacles.slide(&mut self.body, delta);
        self.body.clamp_within(&ctx.bounds, ctx.tuning.arena.border);
    }

    /// Fire toward `aim` if the fire delay has elapsed. Bonus bullets are
    /// queued at staggered times and carry the stats in effect right now.
    pub fn try_shoot(&mut self, aim: Vec2, now: u64, tuning: &Tuning) -> Vec<PlayerBullet> {
        let fire_delay = (tuning.player.fire_delay_ms as f32 / self.stats.fire_rate) as u64;
        if !ready(self.last_shot, now, fire_delay) {
            return Vec::new();
        }
        self.last_shot = Some(now);

        let origin = self.center();
        let angle = angle_between(origin, aim);
        let stagger = tuning.player.bonus_bullet_stagger_ms;
        (0..=self.stats.bonus_bullets as u64)
            .map(|i| {
                PlayerBullet::new(origin, angle, tuning.player.bullet_speed, now + i * stagger)
                    .with_pierce(self.stats.pierce)
                    .with_ricochet(self.stats.ricochet)
            })
            .collect()
    }

    pub fn try_explosive_shot(&mut self, aim: Vec2, now: u64, tuning: &Tuning) -> Option<PlayerBullet> {
        if !self.has_action(Action::ExplosiveShot)
            || !ready(self.last_explosive, now, tuning.abilities.explosive_cooldown_ms)
        {
            return None;
        }
        self.last_explosive = Some(now);
        let origin = self.center();
        let bullet = PlayerBullet::new(origin, angle_between(origin, aim), tuning.player.bullet_speed, now)
            .with_pierce(self.stats.pierce)
            .with_ricochet(self.stats.ricochet)
            .explosive();
        Some(bullet)
    }

    /// Start a sword swing facing `aim`
    pub fn try_sword(&mut self, aim: Vec2, now: u64, tuning: &Tuning) -> bool {
        if !self.has_action(Action::SwordAttack)
            || !ready(self.last_sword, now, tuning.abilities.sword_cooldown_ms)
        {
            return false;
        }
        self.last_sword = Some(now);
        self.sword = Some(SwordSwing {
            started: now,
            angle: angle_between(self.center(), aim),
            struck: Vec::new(),
        });
        true
    }

    /// Re-aim an active swing and strike every enemy within half a blade
    /// length of the blade midpoint. Each enemy is struck once per swing.
    pub fn update_sword(
        &mut self,
        aim: Vec2,
        enemies: &mut [Enemy],
        now: u64,
        tuning: &Tuning,
        report: &mut CombatReport,
    ) {
        let center = self.center();
        let Some(swing) = self.sword.as_mut() else {
            return;
        };
        if now.saturating_sub(swing.started) >= tuning.abilities.sword_duration_ms {
            self.sword = None;
            return;
        }

        swing.angle = angle_between(center, aim);
        let (hilt, tip) = swing.blade(center, &tuning.abilities);
        let midpoint = (hilt + tip) / 2.0;
        let reach = tuning.abilities.sword_length / 2.0;

        for enemy in enemies.iter_mut() {
            if enemy.is_dying() || swing.struck.contains(&enemy.id) {
                continue;
            }
            if enemy.center().distance(midpoint) >= reach {
                continue;
            }
            swing.struck.push(enemy.id);
            if enemy.take_damage(1, now) {
                report.kills.push(Kill::of(enemy));
            }
        }
    }

    /// Dash along the current input, or the last facing when standing still
    pub fn try_dash(&mut self, input: Vec2, now: u64, tuning: &Tuning) -> bool {
        if !self.has_action(Action::Dash) || !ready(self.last_dash, now, tuning.abilities.dash_cooldown_ms) {
            return false;
        }
        let heading = if input == Vec2::ZERO {
            self.facing
        } else {
            input.normalize()
        };
        self.last_dash = Some(now);
        self.dash = Some(DashImpulse {
            until: now + tuning.abilities.dash_duration_ms,
            velocity: heading * tuning.abilities.dash_speed,
        });
        true
    }

    pub fn is_dashing(&self, now: u64) -> bool {
        self.dash.is_some_and(|d| now < d.until)
    }

    /// A kill refreshes the adrenaline window when the player owns it
    pub fn on_kill(&mut self, now: u64, tuning: &Tuning) {
        if self.stats.adrenaline > 0.0 {
            self.adrenaline_until = Some(now + tuning.abilities.adrenaline_window_ms);
        }
    }

    /// Add XP, leveling as many times as the total allows. Leftover XP
    /// carries into the next level. Returns the number of level-ups.
    pub fn gain_xp(&mut self, amount: u32, tuning: &Tuning) -> u32 {
        self.xp += amount;
        let mut levels = 0;
        while self.xp >= self.xp_threshold {
            self.xp -= self.xp_threshold;
            self.level += 1;
            self.xp_threshold =
                ((self.xp_threshold as f64 * tuning.player.xp_growth as f64) as u32).max(1);
            self.pending_level_ups += 1;
            levels += 1;
            log::info!("Level up! Now level {} (next at {} XP)", self.level, self.xp_threshold);
        }
        levels
    }

    /// A level-up is waiting and nothing is on offer yet
    pub fn needs_offer(&self) -> bool {
        self.pending_level_ups > 0 && self.offer.is_empty()
    }

    pub fn present_offer(&mut self, rng: &mut impl Rng) -> &[Upgrade] {
        self.offer = roll_offer(rng);
        &self.offer
    }

    /// Take the upgrade at 1-based `choice`. Anything outside the offer is
    /// ignored and the offer stays open.
    pub fn choose_upgrade(&mut self, choice: u8) -> Option<Upgrade> {
        let index = usize::from(choice).checked_sub(1)?;
        let upgrade = *self.offer.get(index)?;
        apply_effect(self, upgrade.effect());
        self.offer.clear();
        self.pending_level_ups = self.pending_level_ups.saturating_sub(1);
        log::info!("Chose upgrade: {}", upgrade.name());
        Some(upgrade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::Archetype;
    use crate::sim::obstacle::{Obstacle, ObstacleField};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn ctx<'a>(now: u64, obstacles: &'a ObstacleField, tuning: &'a Tuning) -> SimContext<'a> {
        SimContext {
            now,
            obstacles,
            bounds: Rect::new(0.0, 0.0, 2400.0, 1800.0),
            tuning,
        }
    }

    fn player() -> Player {
        Player::new(Vec2::new(1200.0, 900.0), &Tuning::default())
    }

    #[test]
    fn test_diagonal_movement_is_not_normalized() {
        let tuning = Tuning::default();
        let obstacles = ObstacleField::default();
        let mut player = player();
        player.update_movement(&ctx(0, &obstacles, &tuning), Vec2::new(1.0, 1.0));
        assert_eq!(player.center(), Vec2::new(1205.0, 905.0));
    }

    #[test]
    fn test_movement_clamped_to_border() {
        let tuning = Tuning::default();
        let obstacles = ObstacleField::default();
        let mut player = Player::new(Vec2::new(32.0, 900.0), &tuning);
        player.update_movement(&ctx(0, &obstacles, &tuning), Vec2::new(-1.0, 0.0));
        assert_eq!(player.body.x, 10.0);
    }

    #[test]
    fn test_speed_stacks_bonus_and_adrenaline() {
        let tuning = Tuning::default();
        let mut player = player();
        player.stats.speed_bonus = 0.2;
        player.stats.adrenaline = 0.5;
        assert!((player.speed(0, &tuning) - 6.0).abs() < 1e-5);

        player.on_kill(1000, &tuning);
        assert!((player.speed(2000, &tuning) - 9.0).abs() < 1e-5);
        assert!((player.speed(6000, &tuning) - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_adrenaline_refreshes_without_stacking_duration() {
        let tuning = Tuning::default();
        let mut player = player();
        player.stats.adrenaline = 0.25;
        player.on_kill(1000, &tuning);
        player.on_kill(3000, &tuning);
        assert_eq!(player.adrenaline_until, Some(8000));
    }

    #[test]
    fn test_shoot_respects_fire_delay() {
        let tuning = Tuning::default();
        let mut player = player();
        let aim = Vec2::new(2000.0, 900.0);
        assert_eq!(player.try_shoot(aim, 0, &tuning).len(), 1);
        assert!(player.try_shoot(aim, 200, &tuning).is_empty());
        assert_eq!(player.try_shoot(aim, 250, &tuning).len(), 1);

        player.stats.fire_rate = 2.0;
        assert_eq!(player.try_shoot(aim, 375, &tuning).len(), 1);
    }

    #[test]
    fn test_bonus_bullets_queued_with_current_stats() {
        let tuning = Tuning::default();
        let mut player = player();
        player.stats.bonus_bullets = 2;
        player.stats.pierce = 1;
        player.stats.ricochet = 3;

        let bullets = player.try_shoot(Vec2::new(2000.0, 900.0), 1000, &tuning);
        let times: Vec<u64> = bullets.iter().map(|b| b.fire_at).collect();
        assert_eq!(times, vec![1000, 1050, 1100]);
        assert!(bullets.iter().all(|b| b.pierce == 1 && b.ricochet == 3));
        assert!(bullets.iter().all(|b| b.velocity.x > 0.0 && !b.explosive));
    }

    #[test]
    fn test_abilities_require_unlock() {
        let tuning = Tuning::default();
        let mut player = player();
        let aim = Vec2::new(2000.0, 900.0);
        assert!(player.try_explosive_shot(aim, 0, &tuning).is_none());
        assert!(!player.try_sword(aim, 0, &tuning));
        assert!(!player.try_dash(Vec2::X, 0, &tuning));

        player.unlock(Action::ExplosiveShot);
        let bullet = player.try_explosive_shot(aim, 0, &tuning).expect("unlocked");
        assert!(bullet.explosive);
        assert!(player.try_explosive_shot(aim, 2999, &tuning).is_none());
        assert!(player.try_explosive_shot(aim, 3000, &tuning).is_some());
    }

    #[test]
    fn test_sword_hits_each_enemy_once_per_swing() {
        let tuning = Tuning::default();
        let mut player = player();
        player.unlock(Action::SwordAttack);
        let mut rng = Pcg32::seed_from_u64(1);
        // Blade midpoint is 110 units out along the aim
        let mut enemies = vec![
            Enemy::spawn(1, Archetype::Tank, Vec2::new(1310.0, 900.0), None, 0, &mut rng),
            Enemy::spawn(2, Archetype::Tank, Vec2::new(1400.0, 900.0), None, 0, &mut rng),
        ];
        let aim = Vec2::new(2000.0, 900.0);
        let mut report = CombatReport::default();

        assert!(player.try_sword(aim, 0, &tuning));
        player.update_sword(aim, &mut enemies, 0, &tuning, &mut report);
        player.update_sword(aim, &mut enemies, 17, &tuning, &mut report);
        assert_eq!(enemies[0].max_health - enemies[0].health, 1);
        assert_eq!(enemies[1].health, enemies[1].max_health);

        player.update_sword(aim, &mut enemies, 300, &tuning, &mut report);
        assert!(player.sword.is_none());
        assert!(!player.try_sword(aim, 500, &tuning));
        assert!(player.try_sword(aim, 1000, &tuning));
    }

    #[test]
    fn test_dash_overrides_movement_and_respects_walls() {
        let tuning = Tuning::default();
        let obstacles = ObstacleField::new(vec![Obstacle::Rect(Rect::new(1300.0, 0.0, 50.0, 1800.0))]);
        let mut player = player();
        player.unlock(Action::Dash);

        assert!(player.try_dash(Vec2::new(1.0, 0.0), 0, &tuning));
        player.update_movement(&ctx(0, &obstacles, &tuning), Vec2::ZERO);
        assert_eq!(player.center().x, 1215.0);

        for t in (17..200).step_by(17) {
            player.update_movement(&ctx(t, &obstacles, &tuning), Vec2::ZERO);
        }
        assert!(player.body.right() <= 1300.5);

        player.update_movement(&ctx(200, &obstacles, &tuning), Vec2::ZERO);
        assert!(player.dash.is_none());
        assert!(!player.try_dash(Vec2::X, 4000, &tuning));
        assert!(player.try_dash(Vec2::X, 5000, &tuning));
    }

    #[test]
    fn test_xp_threshold_grows() {
        let tuning = Tuning::default();
        let mut player = player();
        assert_eq!(player.gain_xp(100, &tuning), 1);
        assert_eq!(player.xp_threshold, 120);
        assert_eq!(player.gain_xp(120, &tuning), 1);
        assert_eq!(player.xp_threshold, 144);
        assert_eq!(player.level, 3);
        assert_eq!(player.pending_level_ups, 2);
    }

    #[test]
    fn test_xp_remainder_carries() {
        let tuning = Tuning::default();
        let mut player = player();
        player.gain_xp(130, &tuning);
        assert_eq!(player.xp, 30);
        assert_eq!(player.level, 2);
    }

    #[test]
    fn test_choose_upgrade_ignores_out_of_range() {
        let tuning = Tuning::default();
        let mut player = player();
        player.gain_xp(100, &tuning);
        assert!(player.needs_offer());
        player.present_offer(&mut Pcg32::seed_from_u64(5));

        assert_eq!(player.choose_upgrade(0), None);
        assert_eq!(player.choose_upgrade(4), None);
        assert_eq!(player.offer.len(), 3);

        let expected = player.offer[1];
        assert_eq!(player.choose_upgrade(2), Some(expected));
        assert!(player.offer.is_empty());
        assert_eq!(player.pending_level_ups, 0);
    }

    proptest! {
        #[test]
        fn prop_xp_is_conserved(gains in proptest::collection::vec(0u32..300, 1..30)) {
            let tuning = Tuning::default();
            let mut player = player();
            let mut thresholds_paid = 0u64;
            let mut threshold = player.xp_threshold;
            for gain in &gains {
                let before = player.level;
                player.gain_xp(*gain, &tuning);
                for _ in before..player.level {
                    thresholds_paid += threshold as u64;
                    threshold = (threshold as f64 * tuning.player.xp_growth as f64) as u32;
                }
                prop_assert!(player.xp < player.xp_threshold);
            }
            let total: u64 = gains.iter().map(|g| *g as u64).sum();
            prop_assert_eq!(total, thresholds_paid + player.xp as u64);
        }
    }
}
