//! Level-up upgrades
//!
//! Every upgrade maps to a single [`AbilityEffect`] and all effects are
//! applied by [`apply_effect`]. Picking the same upgrade again stacks.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::player::Player;
use crate::consts::UPGRADE_CHOICES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Upgrade {
    SpeedBoost,
    ExtraBullet,
    PiercingBullets,
    Ricochet,
    RapidFire,
    MaxHealth,
    AdrenalineRush,
}

/// A stat mutation and its magnitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AbilityEffect {
    /// Added to the permanent speed bonus
    SpeedBonus(f32),
    BonusBullets(u32),
    Pierce(i32),
    Ricochet(u32),
    /// Multiplies the fire-rate multiplier
    FireRate(f32),
    Health(i32),
    /// Added to the adrenaline speed bonus
    Adrenaline(f32),
}

impl Upgrade {
    pub const ALL: [Upgrade; 7] = [
        Upgrade::SpeedBoost,
        Upgrade::ExtraBullet,
        Upgrade::PiercingBullets,
        Upgrade::Ricochet,
        Upgrade::RapidFire,
        Upgrade::MaxHealth,
        Upgrade::AdrenalineRush,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Upgrade::SpeedBoost => "Speed Boost",
            Upgrade::ExtraBullet => "Extra Bullet",
            Upgrade::PiercingBullets => "Piercing Bullets",
            Upgrade::Ricochet => "Ricochet",
            Upgrade::RapidFire => "Rapid Fire",
            Upgrade::MaxHealth => "Max HP +1",
            Upgrade::AdrenalineRush => "Adrenaline Rush",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Upgrade::SpeedBoost => "Move 20% faster",
            Upgrade::ExtraBullet => "Fire one additional bullet per shot",
            Upgrade::PiercingBullets => "Bullets pass through one extra enemy",
            Upgrade::Ricochet => "Bullets bounce off one more wall",
            Upgrade::RapidFire => "Shoot 25% faster",
            Upgrade::MaxHealth => "Gain 1 extra HP",
            Upgrade::AdrenalineRush => "Kills grant +25% speed for 5 seconds",
        }
    }

    pub fn effect(self) -> AbilityEffect {
        match self {
            Upgrade::SpeedBoost => AbilityEffect::SpeedBonus(0.2),
            Upgrade::ExtraBullet => AbilityEffect::BonusBullets(1),
            Upgrade::PiercingBullets => AbilityEffect::Pierce(1),
            Upgrade::Ricochet => AbilityEffect::Ricochet(1),
            Upgrade::RapidFire => AbilityEffect::FireRate(1.25),
            Upgrade::MaxHealth => AbilityEffect::Health(1),
            Upgrade::AdrenalineRush => AbilityEffect::Adrenaline(0.25),
        }
    }
}

/// Apply one effect to the player
pub fn apply_effect(player: &mut Player, effect: AbilityEffect) {
    let stats = &mut player.stats;
    match effect {
        AbilityEffect::SpeedBonus(amount) => stats.speed_bonus += amount,
        AbilityEffect::BonusBullets(count) => stats.bonus_bullets += count,
        AbilityEffect::Pierce(count) => stats.pierce += count,
        AbilityEffect::Ricochet(count) => stats.ricochet += count,
        AbilityEffect::FireRate(factor) => stats.fire_rate *= factor,
        AbilityEffect::Health(amount) => player.health += amount,
        AbilityEffect::Adrenaline(amount) => stats.adrenaline += amount,
    }
}

/// Draw distinct upgrades for a level-up offer
pub fn roll_offer(rng: &mut impl Rng) -> Vec<Upgrade> {
    rand::seq::index::sample(rng, Upgrade::ALL.len(), UPGRADE_CHOICES)
        .into_iter()
        .map(|i| Upgrade::ALL[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_offer_has_three_distinct_choices() {
        let mut rng = Pcg32::seed_from_u64(99);
        for _ in 0..50 {
            let offer = roll_offer(&mut rng);
            assert_eq!(offer.len(), 3);
            assert_ne!(offer[0], offer[1]);
            assert_ne!(offer[0], offer[2]);
            assert_ne!(offer[1], offer[2]);
        }
    }

    #[test]
    fn test_effects_stack() {
        let mut player = Player::new(Vec2::ZERO, &Tuning::default());
        for _ in 0..2 {
            apply_effect(&mut player, Upgrade::ExtraBullet.effect());
            apply_effect(&mut player, Upgrade::PiercingBullets.effect());
            apply_effect(&mut player, Upgrade::RapidFire.effect());
            apply_effect(&mut player, Upgrade::SpeedBoost.effect());
        }
        assert_eq!(player.stats.bonus_bullets, 2);
        assert_eq!(player.stats.pierce, 2);
        assert!((player.stats.fire_rate - 1.5625).abs() < 1e-5);
        assert!((player.stats.speed_bonus - 0.4).abs() < 1e-5);
    }

    #[test]
    fn test_max_health_heals() {
        let mut player = Player::new(Vec2::ZERO, &Tuning::default());
        apply_effect(&mut player, Upgrade::MaxHealth.effect());
        assert_eq!(player.health, 4);
    }
}
