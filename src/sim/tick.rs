//! Fixed timestep simulation tick
//!
//! Advances the world by one 60 Hz step. Order within a tick: player input
//! and abilities, enemy movement and attacks, projectiles, contact damage
//! and the stuck-in-obstacle sweep, pickups, timer expiry, then the wave
//! director. Level-ups reached during a tick pause the world once the tick
//! completes.

use glam::Vec2;

use super::director::DirectorEvent;
use super::economy::{Action, CurrencyPickup, collect_pickups, roll_reward};
use super::enemy::{Archetype, Behavior, Enemy, EnemyAction, FlockMate};
use super::projectile::{
    CombatReport, EnemyBullet, Kill, Missile, update_enemy_bullets, update_missiles, update_player_bullets,
};
use super::state::{EffectKind, GameEvent, GamePhase, SimContext, World};
use crate::consts::*;
use crate::ticks_to_ms;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Pointer position in world coordinates
    pub aim: Option<Vec2>,
    /// Shoot (held)
    pub fire: bool,
    pub explosive_shot: bool,
    pub sword: bool,
    pub dash: bool,
    /// 1-based pick while an upgrade offer is open
    pub upgrade_choice: Option<u8>,
}

impl TickInput {
    /// Movement axes; diagonals are deliberately not normalized
    pub fn movement(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput) {
    match world.phase {
        GamePhase::GameOver => return,
        GamePhase::AwaitingUpgrade => {
            resolve_upgrade_choice(world, input);
            return;
        }
        GamePhase::Playing => {}
    }

    world.ticks += 1;
    world.now = ticks_to_ms(world.ticks);
    let mut report = CombatReport::default();

    update_player(world, input, &mut report);
    let actions = update_enemies(world);
    apply_enemy_actions(world, actions);
    update_projectiles(world, &mut report);
    apply_combat(world, report);
    if end_run_if_dead(world) {
        return;
    }

    resolve_contact(world);
    if end_run_if_dead(world) {
        return;
    }

    for amount in collect_pickups(&mut world.pickups, &world.player.body) {
        world.player.currency += amount;
        world.events.push(GameEvent::PickupCollected { amount });
    }

    let now = world.now;
    world.enemies.retain(|e| !e.death_finished(now));
    world.effects.retain(|e| !e.expired(now));

    run_director(world);
    offer_pending_upgrade(world);
}

fn update_player(world: &mut World, input: &TickInput, report: &mut CombatReport) {
    let now = world.now;
    let movement = input.movement();
    let aim = input
        .aim
        .unwrap_or_else(|| world.player.center() + world.player.facing * 100.0);

    if input.dash && world.player.try_dash(movement, now, &world.tuning) {
        world.events.push(GameEvent::AbilityUsed(Action::Dash));
    }

    let ctx = SimContext {
        now,
        obstacles: &world.obstacles,
        bounds: world.bounds(),
        tuning: &world.tuning,
    };
    world.player.update_movement(&ctx, movement);

    if input.fire {
        let shots = world.player.try_shoot(aim, now, &world.tuning);
        world.bullets.extend(shots);
    }
    if input.explosive_shot
        && let Some(bullet) = world.player.try_explosive_shot(aim, now, &world.tuning)
    {
        world.bullets.push(bullet);
        world.events.push(GameEvent::AbilityUsed(Action::ExplosiveShot));
    }
    if input.sword && world.player.try_sword(aim, now, &world.tuning) {
        world.events.push(GameEvent::AbilityUsed(Action::SwordAttack));
    }
    world
        .player
        .update_sword(aim, &mut world.enemies, now, &world.tuning, report);
}

fn update_enemies(world: &mut World) -> Vec<EnemyAction> {
    let target = world.player.center();
    // Flocking reads positions from before anyone moves this tick
    let flock: Vec<FlockMate> = world.enemies.iter().filter_map(Enemy::flock_mate).collect();
    let ctx = SimContext {
        now: world.now,
        obstacles: &world.obstacles,
        bounds: world.bounds(),
        tuning: &world.tuning,
    };

    let mut actions = Vec::new();
    for enemy in world.enemies.iter_mut() {
        enemy.update(&ctx, target, &flock, &mut actions);
    }
    actions
}

fn apply_enemy_actions(world: &mut World, actions: Vec<EnemyAction>) {
    for action in actions {
        match action {
            EnemyAction::Shoot { from, at } => world.enemy_bullets.push(EnemyBullet::aimed(from, at)),
            EnemyAction::FireMissile { from } => {
                let target = world.player.center();
                world.missiles.push(Missile::launch(from, target));
            }
            EnemyAction::SummonShooters { count } => {
                log::info!("Boss summons {count} shooters");
                world.spawn_scattered(Archetype::Shooter, count);
            }
        }
    }
}

fn update_projectiles(world: &mut World, report: &mut CombatReport) {
    let ctx = SimContext {
        now: world.now,
        obstacles: &world.obstacles,
        bounds: world.bounds(),
        tuning: &world.tuning,
    };
    let player_body = world.player.body;

    update_player_bullets(&mut world.bullets, &mut world.enemies, &ctx, report);
    update_enemy_bullets(&mut world.enemy_bullets, &player_body, &ctx, report);
    update_missiles(&mut world.missiles, &mut world.enemies, &player_body, &ctx, report);
}

fn apply_combat(world: &mut World, report: CombatReport) {
    for kill in report.kills {
        credit_kill(world, kill);
    }
    for death in report.deaths {
        push_death_animation(world, &death);
    }
    for explosion in report.explosions {
        world.push_effect(
            EffectKind::Explosion {
                radius: explosion.radius,
            },
            explosion.center,
            EXPLOSION_EFFECT_MS,
        );
    }
    hurt_player(world, report.player_hits);
}

fn push_death_animation(world: &mut World, kill: &Kill) {
    world.push_effect(
        EffectKind::DeathAnimation {
            archetype: kill.archetype,
            size: kill.size,
        },
        kill.center,
        kill.archetype.profile().death_ms,
    );
}

/// Score, XP, drop roll and adrenaline for a player kill
fn credit_kill(world: &mut World, kill: Kill) {
    push_death_animation(world, &kill);

    let Some(entry) = world.tuning.reward(kill.archetype).copied() else {
        log::warn!("No reward entry for {:?}", kill.archetype);
        return;
    };
    let reward = roll_reward(&entry, &mut world.rng);
    world.score += reward.score;
    world.events.push(GameEvent::EnemyKilled {
        archetype: kill.archetype,
        score: reward.score,
        xp: reward.xp,
    });

    let levels = world.player.gain_xp(reward.xp, &world.tuning);
    let level = world.player.level;
    for i in 0..levels {
        world.events.push(GameEvent::LevelUp {
            level: level - levels + i + 1,
        });
    }

    if let Some(amount) = reward.drop {
        world.pickups.push(CurrencyPickup::new(kill.center, amount));
        world.events.push(GameEvent::CurrencyDropped { amount });
    }
    world.player.on_kill(world.now, &world.tuning);
}

fn hurt_player(world: &mut World, hits: i32) {
    if hits <= 0 {
        return;
    }
    world.player.take_damage(hits);
    log::debug!("Player hit x{hits}, health {}", world.player.health);
    world.events.push(GameEvent::PlayerHit {
        health: world.player.health,
    });
}

/// Touching a regular enemy costs a point of health and destroys the enemy
/// with no reward. The boss survives contact and only hurts once per
/// cooldown. Afterwards, any regular enemy shoved into an obstacle is
/// swept.
fn resolve_contact(world: &mut World) {
    let now = world.now;
    let player_body = world.player.body;
    let mut hits = 0;

    world.enemies.retain_mut(|enemy| {
        if enemy.is_dying() || !enemy.body.intersects(&player_body) {
            return true;
        }
        match &mut enemy.behavior {
            Behavior::Boss(brain) => {
                if brain.try_contact(now) {
                    hits += 1;
                }
                true
            }
            _ => {
                hits += 1;
                log::debug!("{:?} #{} hit the player", enemy.archetype, enemy.id);
                false
            }
        }
    });

    let obstacles = &world.obstacles;
    let before = world.enemies.len();
    world
        .enemies
        .retain(|e| e.is_boss() || e.is_dying() || !obstacles.collides(&e.body));
    let stuck = before - world.enemies.len();
    if stuck > 0 {
        log::debug!("Removed {stuck} enemies stuck in obstacles");
    }

    hurt_player(world, hits);
}

fn end_run_if_dead(world: &mut World) -> bool {
    if !world.player.is_dead() {
        return false;
    }
    world.phase = GamePhase::GameOver;
    let summary = world.summary();
    log::info!(
        "Game over: score {} on wave {} after {} ticks",
        summary.score,
        summary.wave,
        world.ticks
    );
    world.events.push(GameEvent::RunEnded(summary));
    true
}

fn run_director(world: &mut World) {
    let boss_present = world.boss_present();
    let events = world
        .director
        .tick(world.now, boss_present, &world.tuning.waves, &mut world.rng);

    for event in events {
        match event {
            DirectorEvent::WaveStarted {
                wave,
                spawn_interval_ms,
            } => world.events.push(GameEvent::WaveStarted {
                wave,
                spawn_interval_ms,
            }),
            DirectorEvent::Unlocked(archetype) => {
                world.events.push(GameEvent::ArchetypeUnlocked(archetype));
            }
            DirectorEvent::SpawnBoss => {
                world.spawn_from_edge(Archetype::Boss);
                world.events.push(GameEvent::BossSpawned);
            }
            DirectorEvent::BossDefeated => world.events.push(GameEvent::BossDefeated),
            DirectorEvent::Spawn(archetype) => world.spawn_from_edge(archetype),
        }
    }
}

fn offer_pending_upgrade(world: &mut World) {
    if !world.player.needs_offer() {
        return;
    }
    let offer = world.player.present_offer(&mut world.rng).to_vec();
    world.events.push(GameEvent::UpgradeOffered(offer));
    world.phase = GamePhase::AwaitingUpgrade;
}

fn resolve_upgrade_choice(world: &mut World, input: &TickInput) {
    let Some(choice) = input.upgrade_choice else {
        return;
    };
    match world.player.choose_upgrade(choice) {
        Some(upgrade) => {
            world.events.push(GameEvent::UpgradeChosen(upgrade));
            world.phase = GamePhase::Playing;
            // Further level-ups are offered one after another
            offer_pending_upgrade(world);
        }
        None => log::warn!("Ignoring upgrade choice {choice}"),
    }
}
