//! Wave/spawn director
//!
//! Owns wave progression: the wave clock, the spawn interval curve, the
//! unlocked archetype pool and boss-wave gating. It decides *what* spawns
//! and when; the world decides where and allocates the entities.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::enemy::Archetype;
use super::geometry::Rect;
use crate::error::ConfigError;
use crate::tuning::{SpawnWeight, WaveTuning};

/// Something the director wants to happen this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorEvent {
    WaveStarted { wave: u32, spawn_interval_ms: u64 },
    Unlocked(Archetype),
    SpawnBoss,
    BossDefeated,
    Spawn(Archetype),
}

/// Spawn interval for a wave: shrinks 5% every five waves, never below half
/// the initial interval or the configured floor
pub fn spawn_interval(initial_ms: u64, floor_ms: u64, wave: u32) -> u64 {
    let factor = (1.0 - (wave / 5) as f64 * 0.05).max(0.5);
    ((initial_ms as f64 * factor) as u64).max(floor_ms)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveDirector {
    pub wave: u32,
    pub wave_start: u64,
    pub spawn_interval_ms: u64,
    pub last_spawn: u64,
    /// Grows monotonically; order of unlock is kept for weighted sampling
    pub unlocked: Vec<Archetype>,
    /// Normal spawning and the wave clock are suspended while set
    pub boss_active: bool,
    started: bool,
    weights: Vec<SpawnWeight>,
}

impl WaveDirector {
    /// Build the director for wave 1, rejecting a wave table it cannot
    /// run with
    pub fn new(tuning: &WaveTuning, now: u64) -> Result<Self, ConfigError> {
        tuning.validate()?;

        let mut director = Self {
            wave: 1,
            wave_start: now,
            spawn_interval_ms: spawn_interval(
                tuning.initial_spawn_interval_ms,
                tuning.min_spawn_interval_ms,
                1,
            ),
            last_spawn: now,
            unlocked: Vec::new(),
            boss_active: false,
            started: false,
            weights: tuning.weights.clone(),
        };
        director.apply_unlocks(tuning, &mut Vec::new());
        Ok(director)
    }

    pub fn is_boss_wave(&self, tuning: &WaveTuning) -> bool {
        self.wave % tuning.boss_every == 0
    }

    /// Advance the wave clock and spawn timer. `boss_alive` reports whether
    /// a boss is still in the enemy collection.
    pub fn tick(
        &mut self,
        now: u64,
        boss_alive: bool,
        tuning: &WaveTuning,
        rng: &mut impl Rng,
    ) -> Vec<DirectorEvent> {
        let mut events = Vec::new();

        if !self.started {
            self.started = true;
            events.push(DirectorEvent::WaveStarted {
                wave: self.wave,
                spawn_interval_ms: self.spawn_interval_ms,
            });
            if self.is_boss_wave(tuning) {
                self.start_boss(&mut events);
                return events;
            }
        }

        if self.boss_active {
            if boss_alive {
                return events;
            }
            self.boss_active = false;
            self.wave_start = now;
            self.last_spawn = now;
            log::info!("Boss defeated on wave {}", self.wave);
            events.push(DirectorEvent::BossDefeated);
        }

        if now.saturating_sub(self.wave_start) >= tuning.wave_duration_ms {
            self.new_wave(now, tuning, &mut events);
            if self.is_boss_wave(tuning) {
                self.start_boss(&mut events);
                return events;
            }
        }

        if now.saturating_sub(self.last_spawn) > self.spawn_interval_ms {
            if let Some(archetype) = self.pick_archetype(rng) {
                events.push(DirectorEvent::Spawn(archetype));
            }
            self.last_spawn = now;
        }

        events
    }

    fn start_boss(&mut self, events: &mut Vec<DirectorEvent>) {
        self.boss_active = true;
        log::info!("Boss wave {}", self.wave);
        events.push(DirectorEvent::SpawnBoss);
    }

    fn new_wave(&mut self, now: u64, tuning: &WaveTuning, events: &mut Vec<DirectorEvent>) {
        self.wave += 1;
        self.wave_start = now;
        self.spawn_interval_ms = spawn_interval(
            tuning.initial_spawn_interval_ms,
            tuning.min_spawn_interval_ms,
            self.wave,
        );
        log::info!(
            "Wave {} started (spawn interval {}ms)",
            self.wave,
            self.spawn_interval_ms
        );
        events.push(DirectorEvent::WaveStarted {
            wave: self.wave,
            spawn_interval_ms: self.spawn_interval_ms,
        });
        self.apply_unlocks(tuning, events);
    }

    /// Add every archetype whose milestone has been reached
    fn apply_unlocks(&mut self, tuning: &WaveTuning, events: &mut Vec<DirectorEvent>) {
        for unlock in &tuning.unlocks {
            if unlock.wave <= self.wave && !self.unlocked.contains(&unlock.archetype) {
                self.unlocked.push(unlock.archetype);
                log::debug!("Unlocked {:?} at wave {}", unlock.archetype, self.wave);
                events.push(DirectorEvent::Unlocked(unlock.archetype));
            }
        }
    }

    fn weight_of(&self, archetype: Archetype) -> u32 {
        self.weights
            .iter()
            .find(|w| w.archetype == archetype)
            .map_or(0, |w| w.weight)
    }

    /// Weighted draw over the unlocked pool
    pub fn pick_archetype(&self, rng: &mut impl Rng) -> Option<Archetype> {
        let total: u32 = self.unlocked.iter().map(|a| self.weight_of(*a)).sum();
        if total == 0 {
            return None;
        }
        let mut roll = rng.random_range(0..total);
        for archetype in &self.unlocked {
            let weight = self.weight_of(*archetype);
            if roll < weight {
                return Some(*archetype);
            }
            roll -= weight;
        }
        None
    }
}

/// Pick a spawn center on a random map edge, keeping a body of `size`
/// fully inside the map
pub fn edge_spawn_point(bounds: &Rect, size: f32, rng: &mut impl Rng) -> Vec2 {
    let half = size / 2.0;
    let along_x = rng.random_range(bounds.left() + half..=bounds.right() - half);
    let along_y = rng.random_range(bounds.top() + half..=bounds.bottom() - half);
    match rng.random_range(0..4) {
        0 => Vec2::new(along_x, bounds.top() + half),
        1 => Vec2::new(along_x, bounds.bottom() - half),
        2 => Vec2::new(bounds.left() + half, along_y),
        _ => Vec2::new(bounds.right() - half, along_y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::{Tuning, Unlock};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn waves() -> WaveTuning {
        Tuning::default().waves
    }

    #[test]
    fn test_spawn_interval_curve() {
        assert_eq!(spawn_interval(2000, 500, 1), 2000);
        assert_eq!(spawn_interval(2000, 500, 5), 1900);
        assert_eq!(spawn_interval(2000, 500, 25), 1500);
        assert_eq!(spawn_interval(2000, 500, 100), 1000);
        assert_eq!(spawn_interval(600, 500, 100), 500);
    }

    #[test]
    fn test_rejects_weight_table_mismatch() {
        let mut tuning = waves();
        tuning.weights.pop();
        assert!(matches!(
            WaveDirector::new(&tuning, 0),
            Err(ConfigError::MissingSpawnWeight { .. })
        ));

        let mut tuning = waves();
        tuning.unlocks.pop();
        assert_eq!(
            WaveDirector::new(&tuning, 0).err(),
            Some(ConfigError::WeightCountMismatch {
                weights: 6,
                archetypes: 5
            })
        );
    }

    #[test]
    fn test_first_wave_unlocks_normal_only() {
        let director = WaveDirector::new(&waves(), 0).expect("valid");
        assert_eq!(director.unlocked, vec![Archetype::Normal]);
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(director.pick_archetype(&mut rng), Some(Archetype::Normal));
        }
    }

    #[test]
    fn test_spawns_after_interval() {
        let tuning = waves();
        let mut director = WaveDirector::new(&tuning, 0).expect("valid");
        let mut rng = Pcg32::seed_from_u64(1);

        let events = director.tick(0, false, &tuning, &mut rng);
        assert_eq!(
            events,
            vec![DirectorEvent::WaveStarted {
                wave: 1,
                spawn_interval_ms: 2000
            }]
        );
        assert!(director.tick(2000, false, &tuning, &mut rng).is_empty());
        assert_eq!(
            director.tick(2016, false, &tuning, &mut rng),
            vec![DirectorEvent::Spawn(Archetype::Normal)]
        );
    }

    #[test]
    fn test_unlocks_are_milestone_gated_and_idempotent() {
        let tuning = waves();
        let mut director = WaveDirector::new(&tuning, 0).expect("valid");
        let mut rng = Pcg32::seed_from_u64(1);
        director.tick(0, false, &tuning, &mut rng);

        let mut unlocked = Vec::new();
        for wave in 2..=5 {
            let now = (wave as u64 - 1) * tuning.wave_duration_ms;
            for event in director.tick(now, false, &tuning, &mut rng) {
                if let DirectorEvent::Unlocked(a) = event {
                    unlocked.push((wave, a));
                }
            }
        }
        assert_eq!(unlocked, vec![(5, Archetype::Fast)]);
        assert_eq!(director.unlocked, vec![Archetype::Normal, Archetype::Fast]);
    }

    #[test]
    fn test_boss_wave_suspends_spawning() {
        let tuning = waves();
        let mut director = WaveDirector::new(&tuning, 0).expect("valid");
        director.wave = 9;
        let mut rng = Pcg32::seed_from_u64(1);
        director.tick(0, false, &tuning, &mut rng);

        let events = director.tick(30_000, false, &tuning, &mut rng);
        assert!(events.contains(&DirectorEvent::SpawnBoss));
        assert!(director.boss_active);
        assert_eq!(director.wave, 10);

        // Long after the wave would have ended: still wave 10, no spawns
        for t in (30_016..120_000).step_by(500) {
            assert!(director.tick(t, true, &tuning, &mut rng).is_empty());
        }
        assert_eq!(director.wave, 10);

        let events = director.tick(120_000, false, &tuning, &mut rng);
        assert_eq!(events, vec![DirectorEvent::BossDefeated]);
        assert!(!director.boss_active);
        let events = director.tick(122_500, false, &tuning, &mut rng);
        assert!(matches!(events.as_slice(), [DirectorEvent::Spawn(_)]));
    }

    #[test]
    fn test_boss_every_wave_starts_with_boss() {
        let mut tuning = waves();
        tuning.boss_every = 1;
        let mut director = WaveDirector::new(&tuning, 0).expect("valid");
        let events = director.tick(0, false, &tuning, &mut Pcg32::seed_from_u64(1));
        assert!(events.contains(&DirectorEvent::SpawnBoss));
    }

    #[test]
    fn test_weighted_pick_follows_weights() {
        let mut tuning = waves();
        tuning.unlocks = vec![
            Unlock { wave: 1, archetype: Archetype::Normal },
            Unlock { wave: 1, archetype: Archetype::Tank },
        ];
        tuning.weights = vec![
            SpawnWeight { archetype: Archetype::Normal, weight: 3 },
            SpawnWeight { archetype: Archetype::Tank, weight: 1 },
        ];
        let director = WaveDirector::new(&tuning, 0).expect("valid");
        let mut rng = Pcg32::seed_from_u64(8);
        let tanks = (0..4000)
            .filter(|_| director.pick_archetype(&mut rng) == Some(Archetype::Tank))
            .count();
        assert!((800..1200).contains(&tanks));
    }

    #[test]
    fn test_edge_spawn_point_lies_on_an_edge() {
        let bounds = Rect::new(0.0, 0.0, 2400.0, 1800.0);
        let mut rng = Pcg32::seed_from_u64(4);
        for _ in 0..100 {
            let p = edge_spawn_point(&bounds, 40.0, &mut rng);
            let on_edge = p.x == 20.0 || p.x == 2380.0 || p.y == 20.0 || p.y == 1780.0;
            assert!(on_edge, "{p:?}");
        }
    }

    proptest! {
        #[test]
        fn prop_spawn_interval_respects_floor(initial in 0u64..10_000, floor in 0u64..5_000, wave in 1u32..1_000) {
            let interval = spawn_interval(initial, floor, wave);
            prop_assert!(interval >= floor);
            prop_assert!(interval >= initial / 2 || interval == floor);
        }

        #[test]
        fn prop_spawn_interval_non_increasing(initial in 500u64..10_000, wave in 1u32..1_000) {
            prop_assert!(spawn_interval(initial, 500, wave + 1) <= spawn_interval(initial, 500, wave));
        }
    }
}
