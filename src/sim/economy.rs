//! Rewards, currency pickups and the shop
//!
//! Kills roll an XP amount and maybe a currency drop from the archetype's
//! reward entry. Currency is spent in the shop to unlock active abilities.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::{Circle, Rect};
use super::player::Player;
use crate::consts::{PICKUP_RADIUS, PICKUP_SIZE};
use crate::error::ShopError;
use crate::tuning::{RewardEntry, Tuning};

/// Active abilities gated behind the shop
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Action {
    ExplosiveShot,
    SwordAttack,
    Dash,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::ExplosiveShot, Action::SwordAttack, Action::Dash];

    pub fn name(self) -> &'static str {
        match self {
            Action::ExplosiveShot => "Explosive Shot",
            Action::SwordAttack => "Sword Attack",
            Action::Dash => "Dash",
        }
    }
}

/// Currency lying in the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyPickup {
    pub body: Rect,
    pub amount: u32,
    /// Set on contact; the pickup is swept at the end of collection
    pub collected: bool,
}

impl CurrencyPickup {
    pub fn new(center: Vec2, amount: u32) -> Self {
        Self {
            body: Rect::centered(center, PICKUP_SIZE, PICKUP_SIZE),
            amount,
            collected: false,
        }
    }

    pub fn touches(&self, player: &Rect) -> bool {
        Circle::new(self.body.center(), PICKUP_RADIUS).intersects_rect(player)
    }
}

/// Collect every pickup the player is touching. Returns the amount of each
/// pickup collected, in collection order.
pub fn collect_pickups(pickups: &mut Vec<CurrencyPickup>, player: &Rect) -> Vec<u32> {
    let mut amounts = Vec::new();
    for pickup in pickups.iter_mut() {
        if !pickup.collected && pickup.touches(player) {
            pickup.collected = true;
            amounts.push(pickup.amount);
        }
    }
    pickups.retain(|p| !p.collected);
    amounts
}

/// What one kill is worth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reward {
    pub score: u64,
    pub xp: u32,
    /// Currency dropped at the kill site, if the drop roll succeeded
    pub drop: Option<u32>,
}

pub fn roll_reward(entry: &RewardEntry, rng: &mut impl Rng) -> Reward {
    let xp = rng.random_range(entry.xp_min..=entry.xp_max);
    let drop = if rng.random_bool(entry.drop_chance) {
        Some(rng.random_range(entry.drop_min..=entry.drop_max))
    } else {
        None
    };
    Reward {
        score: entry.score,
        xp,
        drop,
    }
}

/// Spend currency to unlock an action. Returns the remaining balance.
pub fn purchase(player: &mut Player, action: Action, tuning: &Tuning) -> Result<u32, ShopError> {
    if player.has_action(action) {
        return Err(ShopError::AlreadyUnlocked(action));
    }
    let cost = tuning.cost(action).ok_or(ShopError::NotForSale(action))?;
    if player.currency < cost {
        return Err(ShopError::InsufficientFunds {
            cost,
            balance: player.currency,
        });
    }
    player.currency -= cost;
    player.unlock(action);
    log::info!("Purchased {} for {cost}", action.name());
    Ok(player.currency)
}
