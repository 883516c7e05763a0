//! Idle/demo mode - a simple bot that plays the game
//!
//! Produces a [`TickInput`] from the current world, so the headless runner
//! and tests can drive whole runs without a human. Purely a function of
//! world state, so replays with the same seed stay identical.

use std::cmp::Ordering;

use glam::Vec2;

use super::economy::Action;
use super::enemy::Enemy;
use super::state::{GamePhase, World};
use super::tick::TickInput;
use super::upgrade::Upgrade;

/// Keep at least this far from the nearest enemy
const KEEP_AWAY: f32 = 220.0;
/// Go after pickups only when nothing is closer than this
const SAFE_DISTANCE: f32 = 320.0;
/// Dead zone before pressing a movement key
const AXIS_DEAD_ZONE: f32 = 4.0;

/// Preferred picks, best first
const UPGRADE_PRIORITY: [Upgrade; 7] = [
    Upgrade::MaxHealth,
    Upgrade::ExtraBullet,
    Upgrade::PiercingBullets,
    Upgrade::RapidFire,
    Upgrade::SpeedBoost,
    Upgrade::Ricochet,
    Upgrade::AdrenalineRush,
];

fn closest<'a, T>(items: impl Iterator<Item = (&'a T, f32)>) -> Option<(&'a T, f32)>
where
    T: 'a,
{
    items.min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
}

/// Decide this tick's input
pub fn autopilot(world: &World) -> TickInput {
    let mut input = TickInput::default();

    if world.phase == GamePhase::AwaitingUpgrade {
        input.upgrade_choice = pick_upgrade(&world.player.offer);
        return input;
    }

    let me = world.player.center();
    let nearest = closest(
        world
            .enemies
            .iter()
            .filter(|e| !e.is_dying())
            .map(|e| (e, e.center().distance(me))),
    );

    let mut heading = Vec2::ZERO;
    match nearest {
        Some((enemy, distance)) => {
            input.aim = Some(enemy.center());
            input.fire = true;
            if distance < KEEP_AWAY {
                heading += (me - enemy.center()).normalize_or_zero();
            }
            input.sword = distance < 150.0;
            input.dash = distance < 70.0;
            input.explosive_shot = crowd_near(&world.enemies, enemy.center()) >= 3;
        }
        None => {
            input.aim = Some(me + world.player.facing * 100.0);
        }
    }

    let threatened = nearest.is_some_and(|(_, d)| d < SAFE_DISTANCE);
    if !threatened {
        let pickup = closest(world.pickups.iter().map(|p| (p, p.body.center().distance(me))));
        if let Some((pickup, _)) = pickup {
            heading += (pickup.body.center() - me).normalize_or_zero();
        }
    }

    // Drift back toward the middle so the walls don't pin us
    let middle = world.bounds().center();
    heading += (middle - me) * 0.002;

    input.left = heading.x < -AXIS_DEAD_ZONE / 100.0;
    input.right = heading.x > AXIS_DEAD_ZONE / 100.0;
    input.up = heading.y < -AXIS_DEAD_ZONE / 100.0;
    input.down = heading.y > AXIS_DEAD_ZONE / 100.0;
    input
}

fn crowd_near(enemies: &[Enemy], point: Vec2) -> usize {
    enemies
        .iter()
        .filter(|e| !e.is_dying() && e.center().distance(point) < 80.0)
        .count()
}

fn pick_upgrade(offer: &[Upgrade]) -> Option<u8> {
    UPGRADE_PRIORITY
        .iter()
        .find_map(|wanted| offer.iter().position(|u| u == wanted))
        .and_then(|i| u8::try_from(i + 1).ok())
}

/// Buy the cheapest affordable action not yet owned. Returns what was
/// bought.
pub fn auto_purchase(world: &mut World) -> Option<Action> {
    let action = Action::ALL
        .into_iter()
        .filter(|a| !world.player.has_action(*a))
        .filter_map(|a| world.tuning.cost(a).map(|cost| (a, cost)))
        .filter(|(_, cost)| *cost <= world.player.currency)
        .min_by_key(|(_, cost)| *cost)
        .map(|(a, _)| a)?;
    world.purchase(action).ok().map(|_| action)
}
