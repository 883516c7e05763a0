//! Enemy actors
//!
//! Each enemy carries an [`Archetype`] (stats and rewards) and a
//! [`Behavior`] (movement/attack state machine) resolved once at spawn.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::boss::BossBrain;
use super::geometry::Rect;
use super::state::SimContext;
use crate::consts::{
    SWARM_ALIGNMENT_WEIGHT, SWARM_COHESION_WEIGHT, SWARM_SEPARATION_DISTANCE,
    SWARM_SEPARATION_WEIGHT,
};

/// Enemy behavior/stat profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Normal,
    Fast,
    Tank,
    Dasher,
    Shooter,
    Swarm,
    Boss,
}

/// Fixed stats for an archetype
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profile {
    pub size: f32,
    /// Movement per tick
    pub speed: f32,
    pub health_min: i32,
    pub health_max: i32,
    pub hit_flash_ms: u64,
    pub death_ms: u64,
}

impl Archetype {
    pub const ALL: [Archetype; 7] = [
        Archetype::Normal,
        Archetype::Fast,
        Archetype::Tank,
        Archetype::Dasher,
        Archetype::Shooter,
        Archetype::Swarm,
        Archetype::Boss,
    ];

    pub fn profile(self) -> Profile {
        let p = |size, speed, health_min, health_max, hit_flash_ms, death_ms| Profile {
            size,
            speed,
            health_min,
            health_max,
            hit_flash_ms,
            death_ms,
        };
        match self {
            Archetype::Normal => p(40.0, 2.0, 2, 2, 100, 300),
            Archetype::Fast => p(30.0, 3.6, 1, 2, 75, 200),
            Archetype::Tank => p(50.0, 1.5, 5, 8, 100, 400),
            Archetype::Dasher => p(36.0, 2.0, 3, 3, 100, 300),
            Archetype::Shooter => p(35.0, 1.8, 3, 3, 100, 300),
            Archetype::Swarm => p(20.0, 2.5, 1, 1, 75, 100),
            Archetype::Boss => p(100.0, 0.75, 150, 150, 150, 500),
        }
    }
}

/// Timing for a charge-then-dash attack
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashProfile {
    /// Charging starts when the target is closer than this
    pub trigger_range: f32,
    pub charge_ms: u64,
    pub cooldown_ms: u64,
    /// Dash speed as a multiple of base speed
    pub speed_multiplier: f32,
    pub dash_ms: u64,
}

pub const DASHER_DASH: DashProfile = DashProfile {
    trigger_range: 125.0,
    charge_ms: 500,
    cooldown_ms: 2000,
    speed_multiplier: 25.0,
    dash_ms: 100,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DashPhase {
    Seeking,
    /// Standing still, telegraphing the dash
    Charging { since: u64 },
    /// Locked heading until `until`
    Dashing { until: u64, heading: Vec2 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashState {
    pub phase: DashPhase,
    /// Time the last dash ended (or spawn time)
    pub last_dash: u64,
}

impl DashState {
    pub fn new(now: u64) -> Self {
        Self {
            phase: DashPhase::Seeking,
            last_dash: now,
        }
    }

    /// Advance the dash state machine; returns this tick's movement
    pub fn step(
        &mut self,
        profile: &DashProfile,
        now: u64,
        pos: Vec2,
        target: Vec2,
        base_speed: f32,
    ) -> Vec2 {
        let to_target = target - pos;
        let seek = to_target.normalize_or_zero() * base_speed;
        let dash_speed = base_speed * profile.speed_multiplier;

        match self.phase {
            DashPhase::Seeking => {
                let cooled_down = now.saturating_sub(self.last_dash) >= profile.cooldown_ms;
                if to_target.length() < profile.trigger_range && cooled_down {
                    self.phase = DashPhase::Charging { since: now };
                    Vec2::ZERO
                } else {
                    seek
                }
            }
            DashPhase::Charging { since } => {
                if now.saturating_sub(since) >= profile.charge_ms {
                    let heading = to_target.normalize_or_zero();
                    self.phase = DashPhase::Dashing {
                        until: now + profile.dash_ms,
                        heading,
                    };
                    heading * dash_speed
                } else {
                    Vec2::ZERO
                }
            }
            DashPhase::Dashing { until, heading } => {
                if now >= until {
                    self.last_dash = now;
                    self.phase = DashPhase::Seeking;
                    seek
                } else {
                    heading * dash_speed
                }
            }
        }
    }

    pub fn is_charging(&self) -> bool {
        matches!(self.phase, DashPhase::Charging { .. })
    }

    pub fn is_dashing(&self) -> bool {
        matches!(self.phase, DashPhase::Dashing { .. })
    }
}

/// Shooters stop and fire once the player is this close
pub const SHOOTER_RANGE: f32 = 300.0;
pub const SHOOTER_TELEGRAPH_MS: u64 = 500;
pub const SHOOTER_COOLDOWN_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShooterPhase {
    Approach,
    /// In range, waiting for the cooldown
    Holding,
    /// In range, about to fire
    Telegraph { since: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShooterState {
    pub phase: ShooterPhase,
    pub last_shot: Option<u64>,
}

impl ShooterState {
    pub fn new() -> Self {
        Self {
            phase: ShooterPhase::Approach,
            last_shot: None,
        }
    }

    fn step(
        &mut self,
        now: u64,
        pos: Vec2,
        target: Vec2,
        base_speed: f32,
        actions: &mut Vec<EnemyAction>,
    ) -> Vec2 {
        let to_target = target - pos;
        if to_target.length() > SHOOTER_RANGE {
            self.phase = ShooterPhase::Approach;
            return to_target.normalize_or_zero() * base_speed;
        }

        match self.phase {
            ShooterPhase::Approach | ShooterPhase::Holding => {
                let ready = self
                    .last_shot
                    .is_none_or(|t| now.saturating_sub(t) >= SHOOTER_COOLDOWN_MS);
                self.phase = if ready {
                    ShooterPhase::Telegraph { since: now }
                } else {
                    ShooterPhase::Holding
                };
            }
            ShooterPhase::Telegraph { since } => {
                if now.saturating_sub(since) >= SHOOTER_TELEGRAPH_MS {
                    actions.push(EnemyAction::Shoot {
                        from: pos,
                        at: target,
                    });
                    self.last_shot = Some(now);
                    self.phase = ShooterPhase::Holding;
                }
            }
        }
        Vec2::ZERO
    }
}

impl Default for ShooterState {
    fn default() -> Self {
        Self::new()
    }
}

/// Movement/attack state machine, resolved once at spawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    /// Walk straight at the player
    Chase,
    Dasher(DashState),
    Shooter(ShooterState),
    /// Chase blended with flocking inside a group
    Swarm { group: u32 },
    Boss(BossBrain),
}

/// Something an enemy wants the world to do on its behalf
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyAction {
    Shoot { from: Vec2, at: Vec2 },
    FireMissile { from: Vec2 },
    SummonShooters { count: usize },
}

/// What a swarm member needs to know about its neighbors. Captured before
/// any enemy moves this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlockMate {
    pub id: u32,
    pub group: u32,
    pub center: Vec2,
    pub velocity: Vec2,
}

/// Flocking contributions for one swarm member
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlockTerms {
    pub cohesion: Vec2,
    pub separation: Vec2,
    pub alignment: Vec2,
}

impl FlockTerms {
    pub fn total(&self) -> Vec2 {
        self.cohesion + self.separation + self.alignment
    }
}

/// Cohesion toward the group centroid, separation from close neighbors,
/// alignment with the group's average velocity
pub fn flock_terms(id: u32, group: u32, center: Vec2, velocity: Vec2, mates: &[FlockMate]) -> FlockTerms {
    let members: Vec<&FlockMate> = mates.iter().filter(|m| m.group == group).collect();
    if members.is_empty() {
        return FlockTerms::default();
    }
    let count = members.len() as f32;

    let centroid = members.iter().map(|m| m.center).sum::<Vec2>() / count;
    let average_velocity = members.iter().map(|m| m.velocity).sum::<Vec2>() / count;

    let separation = members
        .iter()
        .filter(|m| m.id != id)
        .filter(|m| m.center.distance(center) < SWARM_SEPARATION_DISTANCE)
        .map(|m| center - m.center)
        .sum::<Vec2>();

    FlockTerms {
        cohesion: (centroid - center) * SWARM_COHESION_WEIGHT,
        separation: separation * SWARM_SEPARATION_WEIGHT,
        alignment: (average_velocity - velocity) * SWARM_ALIGNMENT_WEIGHT,
    }
}

/// Observable lifecycle of an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorState {
    Alive,
    HitFlash,
    Dying,
}

/// An enemy in the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub archetype: Archetype,
    pub body: Rect,
    pub health: i32,
    pub max_health: i32,
    pub base_speed: f32,
    /// Movement applied last tick
    pub velocity: Vec2,
    pub behavior: Behavior,
    /// Last time damage was taken
    pub hit_at: Option<u64>,
    /// Set exactly once, when health first reaches zero
    pub dying_since: Option<u64>,
}

impl Enemy {
    /// Spawn an enemy centered on `center`
    pub fn spawn(
        id: u32,
        archetype: Archetype,
        center: Vec2,
        group: Option<u32>,
        now: u64,
        rng: &mut impl Rng,
    ) -> Self {
        let profile = archetype.profile();
        let health = rng.random_range(profile.health_min..=profile.health_max);
        let behavior = match archetype {
            Archetype::Normal | Archetype::Fast | Archetype::Tank => Behavior::Chase,
            Archetype::Dasher => Behavior::Dasher(DashState::new(now)),
            Archetype::Shooter => Behavior::Shooter(ShooterState::new()),
            Archetype::Swarm => Behavior::Swarm {
                group: group.unwrap_or(id),
            },
            Archetype::Boss => Behavior::Boss(BossBrain::new(now)),
        };
        Self {
            id,
            archetype,
            body: Rect::centered(center, profile.size, profile.size),
            health,
            max_health: health,
            base_speed: profile.speed,
            velocity: Vec2::ZERO,
            behavior,
            hit_at: None,
            dying_since: None,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.body.center()
    }

    pub fn is_dying(&self) -> bool {
        self.dying_since.is_some()
    }

    pub fn is_boss(&self) -> bool {
        self.archetype == Archetype::Boss
    }

    /// Apply damage. Returns true exactly once: on the hit that takes
    /// health to zero. Hits on a dying enemy are ignored.
    pub fn take_damage(&mut self, amount: i32, now: u64) -> bool {
        if self.is_dying() {
            return false;
        }
        self.health -= amount;
        self.hit_at = Some(now);
        if self.health <= 0 {
            self.dying_since = Some(now);
            log::debug!("{:?} #{} died", self.archetype, self.id);
            return true;
        }
        false
    }

    pub fn state(&self, now: u64) -> ActorState {
        if self.is_dying() {
            return ActorState::Dying;
        }
        let flash = self.archetype.profile().hit_flash_ms;
        match self.hit_at {
            Some(t) if now.saturating_sub(t) < flash => ActorState::HitFlash,
            _ => ActorState::Alive,
        }
    }

    /// Death animation finished; time to leave the collection
    pub fn death_finished(&self, now: u64) -> bool {
        self.dying_since
            .is_some_and(|t| now.saturating_sub(t) >= self.archetype.profile().death_ms)
    }

    /// Winding up a dash or a shot
    pub fn is_telegraphing(&self) -> bool {
        match &self.behavior {
            Behavior::Dasher(dash) => dash.is_charging(),
            Behavior::Shooter(shooter) => matches!(shooter.phase, ShooterPhase::Telegraph { .. }),
            Behavior::Boss(brain) => brain.dash.is_charging(),
            Behavior::Chase | Behavior::Swarm { .. } => false,
        }
    }

    /// Flocking snapshot entry, if this enemy belongs to a swarm
    pub fn flock_mate(&self) -> Option<FlockMate> {
        match self.behavior {
            Behavior::Swarm { group } if !self.is_dying() => Some(FlockMate {
                id: self.id,
                group,
                center: self.center(),
                velocity: self.velocity,
            }),
            _ => None,
        }
    }

    /// Advance movement and attacks toward `target` (the player center)
    pub fn update(
        &mut self,
        ctx: &SimContext,
        target: Vec2,
        flock: &[FlockMate],
        actions: &mut Vec<EnemyAction>,
    ) {
        if self.is_dying() {
            return;
        }
        let pos = self.center();
        let seek = (target - pos).normalize_or_zero() * self.base_speed;

        let movement = match &mut self.behavior {
            Behavior::Chase => seek,
            Behavior::Dasher(dash) => dash.step(&DASHER_DASH, ctx.now, pos, target, self.base_speed),
            Behavior::Shooter(shooter) => shooter.step(ctx.now, pos, target, self.base_speed, actions),
            Behavior::Swarm { group } => {
                let terms = flock_terms(self.id, *group, pos, self.velocity, flock);
                (seek + terms.total()).clamp_length_max(self.base_speed * 1.5)
            }
            Behavior::Boss(brain) => brain.step(ctx.now, pos, target, self.base_speed, actions),
        };

        self.velocity = ctx.obstacles.slide(&mut self.body, movement);
        self.body.clamp_within(&ctx.bounds, 0.0);
    }
}
