//! Data-driven game balance
//!
//! Every number a designer might want to tweak lives here. Defaults match
//! the shipped balance; a JSON file can override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::{Action, Archetype};

/// Map dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    pub width: f32,
    pub height: f32,
    /// Wall thickness the player is kept inside of
    pub border: f32,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            width: 2400.0,
            height: 1800.0,
            border: 10.0,
        }
    }
}

impl ArenaTuning {
    /// Every body must fit: the boss spawns on an edge, and summoned
    /// Shooters need a body's width of margin on each side
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width.is_nan() || self.height.is_nan() || self.width <= 0.0 || self.height <= 0.0 {
            return Err(ConfigError::InvalidArena {
                width: self.width,
                height: self.height,
            });
        }
        let required = Archetype::ALL
            .iter()
            .map(|a| {
                let size = a.profile().size;
                if *a == Archetype::Shooter { size * 2.0 } else { size }
            })
            .fold(0.0_f32, f32::max);
        if self.width <= required || self.height <= required {
            return Err(ConfigError::ArenaTooSmall {
                width: self.width,
                height: self.height,
                required,
            });
        }
        if !(0.0..self.width.min(self.height) / 2.0).contains(&self.border) {
            return Err(ConfigError::InvalidArena {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub size: f32,
    /// Movement per tick along each pressed axis
    pub speed: f32,
    pub health: i32,
    /// Delay between shots at a fire-rate multiplier of 1.0
    pub fire_delay_ms: u64,
    pub bullet_speed: f32,
    /// Gap between the immediate shot and each queued bonus bullet
    pub bonus_bullet_stagger_ms: u64,
    /// XP needed for the first level-up
    pub xp_threshold: u32,
    /// Threshold multiplier applied at each level-up
    pub xp_growth: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            size: 40.0,
            speed: 5.0,
            health: 3,
            fire_delay_ms: 250,
            bullet_speed: 10.0,
            bonus_bullet_stagger_ms: 50,
            xp_threshold: 100,
            xp_growth: 1.2,
        }
    }
}

impl PlayerTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size.is_nan() || self.size <= 0.0 {
            return Err(ConfigError::NonPositivePlayerSize(self.size));
        }
        if self.xp_growth.is_nan() || self.xp_growth < 1.0 {
            return Err(ConfigError::ShrinkingXpGrowth(self.xp_growth));
        }
        Ok(())
    }
}

/// An archetype joins the spawn pool once this wave is reached
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Unlock {
    pub wave: u32,
    pub archetype: Archetype,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnWeight {
    pub archetype: Archetype,
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    pub wave_duration_ms: u64,
    pub initial_spawn_interval_ms: u64,
    /// The spawn interval never drops below this
    pub min_spawn_interval_ms: u64,
    /// Every Nth wave is a boss wave
    pub boss_every: u32,
    pub unlocks: Vec<Unlock>,
    pub weights: Vec<SpawnWeight>,
}

impl Default for WaveTuning {
    fn default() -> Self {
        let unlock = |wave, archetype| Unlock { wave, archetype };
        let weight = |archetype, weight| SpawnWeight { archetype, weight };
        Self {
            wave_duration_ms: 30_000,
            initial_spawn_interval_ms: 2000,
            min_spawn_interval_ms: 500,
            boss_every: 10,
            unlocks: vec![
                unlock(1, Archetype::Normal),
                unlock(5, Archetype::Fast),
                unlock(10, Archetype::Tank),
                unlock(12, Archetype::Dasher),
                unlock(15, Archetype::Shooter),
                unlock(18, Archetype::Swarm),
            ],
            weights: vec![
                weight(Archetype::Normal, 3),
                weight(Archetype::Fast, 2),
                weight(Archetype::Tank, 1),
                weight(Archetype::Dasher, 2),
                weight(Archetype::Shooter, 2),
                weight(Archetype::Swarm, 1),
            ],
        }
    }
}

impl WaveTuning {
    /// The weight table must cover exactly the archetypes that can ever be
    /// unlocked, and the boss is never one of them
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wave_duration_ms == 0 {
            return Err(ConfigError::ZeroWaveDuration);
        }
        if self.boss_every == 0 {
            return Err(ConfigError::ZeroBossInterval);
        }

        let mut unlockable: Vec<Archetype> = Vec::new();
        for unlock in &self.unlocks {
            if unlock.archetype == Archetype::Boss {
                return Err(ConfigError::BossInSpawnTable);
            }
            if !unlockable.contains(&unlock.archetype) {
                unlockable.push(unlock.archetype);
            }
        }
        for weight in &self.weights {
            if weight.archetype == Archetype::Boss {
                return Err(ConfigError::BossInSpawnTable);
            }
            if weight.weight == 0 {
                return Err(ConfigError::NonPositiveWeight {
                    archetype: weight.archetype,
                    weight: weight.weight,
                });
            }
        }
        for archetype in &unlockable {
            if !self.weights.iter().any(|w| w.archetype == *archetype) {
                return Err(ConfigError::MissingSpawnWeight {
                    archetype: *archetype,
                });
            }
        }
        if self.weights.len() != unlockable.len() {
            return Err(ConfigError::WeightCountMismatch {
                weights: self.weights.len(),
                archetypes: unlockable.len(),
            });
        }
        Ok(())
    }
}

/// What killing one enemy of an archetype is worth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardEntry {
    pub archetype: Archetype,
    pub score: u64,
    pub xp_min: u32,
    pub xp_max: u32,
    /// Probability in [0, 1] that a currency pickup drops
    pub drop_chance: f64,
    pub drop_min: u32,
    pub drop_max: u32,
}

fn default_rewards() -> Vec<RewardEntry> {
    let entry = |archetype, score, xp: (u32, u32), drop_chance, drop: (u32, u32)| RewardEntry {
        archetype,
        score,
        xp_min: xp.0,
        xp_max: xp.1,
        drop_chance,
        drop_min: drop.0,
        drop_max: drop.1,
    };
    vec![
        entry(Archetype::Normal, 50, (1, 3), 0.4, (1, 2)),
        entry(Archetype::Fast, 75, (2, 4), 0.3, (1, 3)),
        entry(Archetype::Tank, 200, (4, 8), 0.7, (3, 7)),
        entry(Archetype::Dasher, 100, (6, 12), 0.5, (2, 5)),
        entry(Archetype::Shooter, 100, (7, 14), 0.5, (2, 4)),
        entry(Archetype::Swarm, 5, (1, 2), 0.2, (1, 1)),
        entry(Archetype::Boss, 2000, (50, 100), 1.0, (20, 40)),
    ]
}

/// Timings and magnitudes for active and passive abilities
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityTuning {
    pub explosive_cooldown_ms: u64,
    pub sword_cooldown_ms: u64,
    pub sword_duration_ms: u64,
    /// Distance from the player center to the sword hilt
    pub sword_offset: f32,
    pub sword_length: f32,
    pub dash_duration_ms: u64,
    pub dash_cooldown_ms: u64,
    /// Movement per tick while dashing
    pub dash_speed: f32,
    /// Speed boost window refreshed on every kill
    pub adrenaline_window_ms: u64,
}

impl Default for AbilityTuning {
    fn default() -> Self {
        Self {
            explosive_cooldown_ms: 3000,
            sword_cooldown_ms: 1000,
            sword_duration_ms: 300,
            sword_offset: 80.0,
            sword_length: 60.0,
            dash_duration_ms: 200,
            dash_cooldown_ms: 5000,
            dash_speed: 15.0,
            adrenaline_window_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopEntry {
    pub action: Action,
    pub cost: u32,
}

fn default_shop() -> Vec<ShopEntry> {
    vec![
        ShopEntry {
            action: Action::ExplosiveShot,
            cost: 25,
        },
        ShopEntry {
            action: Action::SwordAttack,
            cost: 40,
        },
        ShopEntry {
            action: Action::Dash,
            cost: 30,
        },
    ]
}

/// Complete balance configuration for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub arena: ArenaTuning,
    pub player: PlayerTuning,
    pub waves: WaveTuning,
    pub rewards: Vec<RewardEntry>,
    pub abilities: AbilityTuning,
    pub shop: Vec<ShopEntry>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arena: ArenaTuning::default(),
            player: PlayerTuning::default(),
            waves: WaveTuning::default(),
            rewards: default_rewards(),
            abilities: AbilityTuning::default(),
            shop: default_shop(),
        }
    }
}

impl Tuning {
    /// Load and validate a tuning file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Parse and validate tuning from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.arena.validate()?;
        self.player.validate()?;
        self.waves.validate()?;

        for archetype in Archetype::ALL {
            let Some(entry) = self.reward(archetype) else {
                return Err(ConfigError::MissingReward { archetype });
            };
            if entry.xp_min > entry.xp_max {
                return Err(ConfigError::InvalidRange {
                    field: "xp",
                    min: entry.xp_min,
                    max: entry.xp_max,
                });
            }
            if entry.drop_min > entry.drop_max {
                return Err(ConfigError::InvalidRange {
                    field: "drop",
                    min: entry.drop_min,
                    max: entry.drop_max,
                });
            }
            if !(0.0..=1.0).contains(&entry.drop_chance) {
                return Err(ConfigError::InvalidProbability {
                    archetype,
                    chance: entry.drop_chance,
                });
            }
        }
        Ok(())
    }

    /// Reward entry for an archetype
    pub fn reward(&self, archetype: Archetype) -> Option<&RewardEntry> {
        self.rewards.iter().find(|r| r.archetype == archetype)
    }

    /// Shop price for an action, if it is for sale
    pub fn cost(&self, action: Action) -> Option<u32> {
        self.shop.iter().find(|s| s.action == action).map(|s| s.cost)
    }
}
