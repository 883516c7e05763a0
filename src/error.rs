use core::fmt;

use crate::sim::{Action, Archetype};

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// An archetype can be unlocked but has no spawn weight
    MissingSpawnWeight { archetype: Archetype },
    /// The weight table lists a different number of entries than the
    /// archetypes it is asked to cover
    WeightCountMismatch { weights: usize, archetypes: usize },
    NonPositiveWeight { archetype: Archetype, weight: u32 },
    /// The boss is never a regular spawn
    BossInSpawnTable,
    MissingReward { archetype: Archetype },
    ZeroBossInterval,
    ZeroWaveDuration,
    /// Arena sides must be positive and the border must leave room inside
    InvalidArena { width: f32, height: f32 },
    /// The arena can't hold the largest body the run may spawn
    ArenaTooSmall { width: f32, height: f32, required: f32 },
    NonPositivePlayerSize(f32),
    /// XP thresholds would shrink each level
    ShrinkingXpGrowth(f32),
    InvalidRange { field: &'static str, min: u32, max: u32 },
    InvalidProbability { archetype: Archetype, chance: f64 },
    Io(String),
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSpawnWeight { archetype } => {
                write!(f, "no spawn weight configured for unlockable archetype {archetype:?}")
            }
            Self::WeightCountMismatch {
                weights,
                archetypes,
            } => write!(
                f,
                "spawn weight table has {weights} entries for {archetypes} archetypes"
            ),
            Self::NonPositiveWeight { archetype, weight } => {
                write!(f, "spawn weight for {archetype:?} must be positive, got {weight}")
            }
            Self::BossInSpawnTable => write!(f, "boss cannot appear in the spawn table"),
            Self::MissingReward { archetype } => {
                write!(f, "no reward entry configured for {archetype:?}")
            }
            Self::ZeroBossInterval => write!(f, "boss interval must be at least 1 wave"),
            Self::ZeroWaveDuration => write!(f, "wave duration must be non-zero"),
            Self::InvalidArena { width, height } => {
                write!(f, "invalid arena {width}x{height} (border must fit inside)")
            }
            Self::ArenaTooSmall {
                width,
                height,
                required,
            } => write!(
                f,
                "arena {width}x{height} is too small, both sides must exceed {required}"
            ),
            Self::NonPositivePlayerSize(size) => write!(f, "player size must be positive, got {size}"),
            Self::ShrinkingXpGrowth(growth) => write!(f, "xp growth must be at least 1.0, got {growth}"),
            Self::InvalidRange { field, min, max } => {
                write!(f, "invalid range for {field}: {min}..={max}")
            }
            Self::InvalidProbability { archetype, chance } => {
                write!(f, "drop chance for {archetype:?} out of range: {chance}")
            }
            Self::Io(msg) => write!(f, "failed to read tuning: {msg}"),
            Self::Parse(msg) => write!(f, "failed to parse tuning: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShopError {
    AlreadyUnlocked(Action),
    NotForSale(Action),
    InsufficientFunds { cost: u32, balance: u32 },
}

impl fmt::Display for ShopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyUnlocked(action) => write!(f, "{} is already unlocked", action.name()),
            Self::NotForSale(action) => write!(f, "{} is not sold in the shop", action.name()),
            Self::InsufficientFunds { cost, balance } => {
                write!(f, "insufficient funds: cost {cost}, balance {balance}")
            }
        }
    }
}

impl std::error::Error for ShopError {}

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "leaderboard io error: {err}"),
            Self::Json(err) => write!(f, "leaderboard format error: {err}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}
