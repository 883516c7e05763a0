//! World state and core simulation types
//!
//! The [`World`] owns every collection the frame loop mutates. Update code
//! reads shared, immutable data through a [`SimContext`] instead of globals.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::director::{WaveDirector, edge_spawn_point};
use super::economy::{self, Action, CurrencyPickup};
use super::enemy::{ActorState, Archetype, Enemy};
use super::geometry::Rect;
use super::obstacle::{Obstacle, ObstacleField};
use super::player::Player;
use super::projectile::{EnemyBullet, Missile, PlayerBullet};
use super::upgrade::Upgrade;
use crate::consts::*;
use crate::error::{ConfigError, ShopError};
use crate::tuning::Tuning;

/// Read-only data every update step needs
#[derive(Debug, Clone, Copy)]
pub struct SimContext<'a> {
    /// Simulation time in milliseconds
    pub now: u64,
    pub obstacles: &'a ObstacleField,
    /// Full map rectangle
    pub bounds: Rect,
    pub tuning: &'a Tuning,
}

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Simulation frozen until an offered upgrade is picked
    AwaitingUpgrade,
    /// Run ended
    GameOver,
}

/// Final result of a run, handed to the leaderboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u64,
    pub wave: u32,
}

/// Notable things that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    WaveStarted { wave: u32, spawn_interval_ms: u64 },
    ArchetypeUnlocked(Archetype),
    BossSpawned,
    BossDefeated,
    EnemyKilled { archetype: Archetype, score: u64, xp: u32 },
    CurrencyDropped { amount: u32 },
    PickupCollected { amount: u32 },
    LevelUp { level: u32 },
    UpgradeOffered(Vec<Upgrade>),
    UpgradeChosen(Upgrade),
    AbilityUsed(Action),
    PlayerHit { health: i32 },
    RunEnded(RunSummary),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    DeathAnimation { archetype: Archetype, size: f32 },
    Explosion { radius: f32 },
}

/// Short-lived visual effect (not gameplay-affecting)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    pub center: Vec2,
    pub started: u64,
    pub duration_ms: u64,
}

impl Effect {
    pub fn expired(&self, now: u64) -> bool {
        now.saturating_sub(self.started) >= self.duration_ms
    }
}

/// Complete simulation state for one run
#[derive(Debug, Clone)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    pub phase: GamePhase,
    /// Simulation ticks elapsed (frozen while awaiting an upgrade)
    pub ticks: u64,
    /// Simulation time in milliseconds, derived from `ticks`
    pub now: u64,
    pub score: u64,
    pub player: Player,
    /// Live and dying enemies, in spawn order
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<PlayerBullet>,
    pub enemy_bullets: Vec<EnemyBullet>,
    pub missiles: Vec<Missile>,
    pub pickups: Vec<CurrencyPickup>,
    pub effects: Vec<Effect>,
    pub director: WaveDirector,
    pub obstacles: ObstacleField,
    pub tuning: Tuning,
    /// Pending events, drained by collaborators
    pub events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl World {
    /// New run on the standard town layout
    pub fn new(seed: u64, tuning: Tuning) -> Result<Self, ConfigError> {
        let spawn = Vec2::new(tuning.arena.width / 2.0, tuning.arena.height / 2.0);
        Self::with_obstacles(seed, tuning, ObstacleField::town(spawn))
    }

    /// New run on a caller-supplied obstacle layout
    pub fn with_obstacles(seed: u64, tuning: Tuning, obstacles: ObstacleField) -> Result<Self, ConfigError> {
        tuning.validate()?;
        let director = WaveDirector::new(&tuning.waves, 0)?;
        let spawn = Vec2::new(tuning.arena.width / 2.0, tuning.arena.height / 2.0);
        let player = Player::new(spawn, &tuning);
        log::info!("New run (seed {seed}, {} obstacles)", obstacles.len());

        Ok(Self {
            seed,
            phase: GamePhase::Playing,
            ticks: 0,
            now: 0,
            score: 0,
            player,
            enemies: Vec::new(),
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            missiles: Vec::new(),
            pickups: Vec::new(),
            effects: Vec::new(),
            director,
            obstacles,
            tuning,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        })
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.tuning.arena.width, self.tuning.arena.height)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            score: self.score,
            wave: self.director.wave,
        }
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// A boss is still in the enemy collection (dying counts)
    pub fn boss_present(&self) -> bool {
        self.enemies.iter().any(Enemy::is_boss)
    }

    /// Shop entry point: spend currency to unlock an action
    pub fn purchase(&mut self, action: Action) -> Result<u32, ShopError> {
        economy::purchase(&mut self.player, action, &self.tuning)
    }

    /// Spawn a single enemy centered on `center`
    pub fn spawn_enemy(&mut self, archetype: Archetype, center: Vec2) -> u32 {
        let id = self.next_entity_id();
        let enemy = Enemy::spawn(id, archetype, center, None, self.now, &mut self.rng);
        log::debug!("Spawned {archetype:?} #{id} at {center}");
        self.enemies.push(enemy);
        id
    }

    /// Spawn a swarm group clustered around `center`; members share the
    /// first member's ID as their group
    pub fn spawn_swarm(&mut self, center: Vec2) {
        let bounds = self.bounds();
        let size = Archetype::Swarm.profile().size;
        let mut group = None;
        for _ in 0..SWARM_GROUP_SIZE {
            let id = self.next_entity_id();
            let offset = Vec2::new(
                self.rng.random_range(-SWARM_SPAWN_SPREAD..=SWARM_SPAWN_SPREAD),
                self.rng.random_range(-SWARM_SPAWN_SPREAD..=SWARM_SPAWN_SPREAD),
            );
            let group_id = *group.get_or_insert(id);
            let mut enemy = Enemy::spawn(id, Archetype::Swarm, center + offset, Some(group_id), self.now, &mut self.rng);
            enemy.body.clamp_within(&bounds, 0.0);
            self.enemies.push(enemy);
        }
        log::debug!("Spawned swarm group at {center}");
    }

    /// Normal spawn from the director: a random map edge
    pub fn spawn_from_edge(&mut self, archetype: Archetype) {
        let bounds = self.bounds();
        let center = edge_spawn_point(&bounds, archetype.profile().size, &mut self.rng);
        if archetype == Archetype::Swarm {
            self.spawn_swarm(center);
        } else {
            self.spawn_enemy(archetype, center);
        }
    }

    /// Drop `count` enemies at random open spots in the arena
    pub fn spawn_scattered(&mut self, archetype: Archetype, count: usize) {
        let bounds = self.bounds();
        let size = archetype.profile().size;
        for _ in 0..count {
            let spot = (0..16).find_map(|_| {
                let center = Vec2::new(
                    self.rng.random_range(bounds.left() + size..=bounds.right() - size),
                    self.rng.random_range(bounds.top() + size..=bounds.bottom() - size),
                );
                let body = Rect::centered(center, size, size);
                (!self.obstacles.collides(&body) && !body.intersects(&self.player.body)).then_some(center)
            });
            match spot {
                Some(center) => {
                    self.spawn_enemy(archetype, center);
                }
                None => log::warn!("No open spot for {archetype:?}, skipping"),
            }
        }
    }

    pub fn push_effect(&mut self, kind: EffectKind, center: Vec2, duration_ms: u64) {
        self.effects.push(Effect {
            kind,
            center,
            started: self.now,
            duration_ms,
        });
    }

    /// Read-only view for rendering
    pub fn snapshot(&self) -> Snapshot {
        let now = self.now;
        let player = &self.player;
        Snapshot {
            phase: self.phase,
            now,
            wave: self.director.wave,
            boss_active: self.director.boss_active,
            score: self.score,
            player: PlayerView {
                body: player.body,
                health: player.health,
                level: player.level,
                xp: player.xp,
                xp_threshold: player.xp_threshold,
                currency: player.currency,
                dashing: player.is_dashing(now),
                sword: player
                    .sword
                    .as_ref()
                    .map(|swing| swing.blade(player.center(), &self.tuning.abilities)),
                actions: player.actions.iter().copied().collect(),
            },
            enemies: self
                .enemies
                .iter()
                .map(|e| EnemyView {
                    id: e.id,
                    archetype: e.archetype,
                    body: e.body,
                    health: e.health.max(0),
                    max_health: e.max_health,
                    state: e.state(now),
                    telegraphing: e.is_telegraphing(),
                })
                .collect(),
            bullets: self
                .bullets
                .iter()
                .filter(|b| b.is_armed(now))
                .map(|b| b.body)
                .collect(),
            enemy_bullets: self.enemy_bullets.iter().map(|b| b.body).collect(),
            missiles: self.missiles.iter().map(|m| (m.body, m.angle)).collect(),
            pickups: self.pickups.iter().map(|p| p.body).collect(),
            effects: self.effects.clone(),
            obstacles: self.obstacles.iter().copied().collect(),
            offer: player.offer.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub body: Rect,
    pub health: i32,
    pub level: u32,
    pub xp: u32,
    pub xp_threshold: u32,
    pub currency: u32,
    pub dashing: bool,
    /// Blade hilt and tip while swinging
    pub sword: Option<(Vec2, Vec2)>,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: u32,
    pub archetype: Archetype,
    pub body: Rect,
    pub health: i32,
    pub max_health: i32,
    pub state: ActorState,
    pub telegraphing: bool,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub now: u64,
    pub wave: u32,
    pub boss_active: bool,
    pub score: u64,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    /// Armed player bullets only
    pub bullets: Vec<Rect>,
    pub enemy_bullets: Vec<Rect>,
    /// Body and heading
    pub missiles: Vec<(Rect, f32)>,
    pub pickups: Vec<Rect>,
    pub effects: Vec<Effect>,
    pub obstacles: Vec<Obstacle>,
    pub offer: Vec<Upgrade>,
}
