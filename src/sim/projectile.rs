//! Projectiles: player bullets, enemy bullets and boss missiles
//!
//! Player bullets may be queued for a later fire time, pierce through
//! enemies, ricochet off walls and explode on impact. Each update reports
//! kills and explosions back to the frame loop rather than touching score
//! or the player directly.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::{Archetype, Enemy};
use super::geometry::{Circle, Rect};
use super::state::SimContext;
use crate::consts::*;
use crate::{angle_between, direction, normalize_angle};

/// An enemy that died this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kill {
    pub enemy_id: u32,
    pub archetype: Archetype,
    pub center: Vec2,
    pub size: f32,
}

impl Kill {
    pub fn of(enemy: &Enemy) -> Self {
        Self {
            enemy_id: enemy.id,
            archetype: enemy.archetype,
            center: enemy.center(),
            size: enemy.body.w,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub center: Vec2,
    pub radius: f32,
}

/// Outcome of a combat step
#[derive(Debug, Clone, Default)]
pub struct CombatReport {
    /// Deaths credited to the player (score, XP, drops)
    pub kills: Vec<Kill>,
    /// Deaths nobody gets credit for
    pub deaths: Vec<Kill>,
    pub explosions: Vec<Explosion>,
    /// Damage dealt to the player
    pub player_hits: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fate {
    Alive,
    Destroyed,
}

/// A bullet fired by the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerBullet {
    pub body: Rect,
    pub velocity: Vec2,
    /// Extra enemies this bullet may pass through; destroyed once negative
    pub pierce: i32,
    /// Wall bounces left
    pub ricochet: u32,
    pub explosive: bool,
    /// Invisible and inert until this time
    pub fire_at: u64,
}

impl PlayerBullet {
    pub fn new(origin: Vec2, angle: f32, speed: f32, fire_at: u64) -> Self {
        Self {
            body: Rect::centered(origin, BULLET_SIZE, BULLET_SIZE),
            velocity: direction(angle) * speed,
            pierce: 0,
            ricochet: 0,
            explosive: false,
            fire_at,
        }
    }

    pub fn with_pierce(mut self, pierce: i32) -> Self {
        self.pierce = pierce;
        self
    }

    pub fn with_ricochet(mut self, ricochet: u32) -> Self {
        self.ricochet = ricochet;
        self
    }

    pub fn explosive(mut self) -> Self {
        self.explosive = true;
        self
    }

    pub fn is_armed(&self, now: u64) -> bool {
        now >= self.fire_at
    }

    /// Spend a ricochet to bounce, or report that the bullet is done
    fn bounce(&mut self, flip_x: bool) -> Fate {
        if self.ricochet == 0 {
            return Fate::Destroyed;
        }
        self.ricochet -= 1;
        if flip_x {
            self.velocity.x = -self.velocity.x;
        } else {
            self.velocity.y = -self.velocity.y;
        }
        Fate::Alive
    }
}

/// Move every armed bullet, then resolve obstacle, map edge and enemy
/// contact in that order. Destroyed bullets are swept in place.
pub fn update_player_bullets(
    bullets: &mut Vec<PlayerBullet>,
    enemies: &mut [Enemy],
    ctx: &SimContext,
    report: &mut CombatReport,
) {
    bullets.retain_mut(|bullet| step_player_bullet(bullet, enemies, ctx, report) == Fate::Alive);
}

fn step_player_bullet(
    bullet: &mut PlayerBullet,
    enemies: &mut [Enemy],
    ctx: &SimContext,
    report: &mut CombatReport,
) -> Fate {
    if !bullet.is_armed(ctx.now) {
        return Fate::Alive;
    }

    let previous = bullet.body;
    bullet.body.translate(bullet.velocity);

    if let Some(obstacle) = ctx.obstacles.first_collision(&bullet.body) {
        let overlap = bullet.body.overlap(&obstacle.bounds());
        // Bounce off the face with the shallower penetration
        if bullet.bounce(overlap.x < overlap.y) == Fate::Destroyed {
            return Fate::Destroyed;
        }
        bullet.body = previous;
    }

    let bounds = &ctx.bounds;
    if bullet.body.left() <= bounds.left() || bullet.body.right() >= bounds.right() {
        if bullet.bounce(true) == Fate::Destroyed {
            return Fate::Destroyed;
        }
        bullet.body.x = previous.x;
    }
    if bullet.body.top() <= bounds.top() || bullet.body.bottom() >= bounds.bottom() {
        if bullet.bounce(false) == Fate::Destroyed {
            return Fate::Destroyed;
        }
        bullet.body.y = previous.y;
    }

    let mut hit_this_tick: Vec<u32> = Vec::new();
    for i in 0..enemies.len() {
        let enemy = &mut enemies[i];
        if enemy.is_dying() || hit_this_tick.contains(&enemy.id) {
            continue;
        }
        if !bullet.body.intersects(&enemy.body) {
            continue;
        }

        hit_this_tick.push(enemy.id);
        let impact = bullet.body.center();
        if enemy.take_damage(1, ctx.now) {
            report.kills.push(Kill::of(enemy));
        }
        bullet.body.translate(bullet.velocity * PIERCE_ADVANCE);
        bullet.pierce -= 1;

        if bullet.explosive {
            explode_on_enemies(impact, enemies, &mut hit_this_tick, ctx.now, report);
        }
        if bullet.pierce < 0 {
            return Fate::Destroyed;
        }
    }

    Fate::Alive
}

/// Explosive-shot blast: every enemy within range takes one flat point of
/// damage, except ones this bullet already hit this tick
fn explode_on_enemies(
    center: Vec2,
    enemies: &mut [Enemy],
    hit_this_tick: &mut Vec<u32>,
    now: u64,
    report: &mut CombatReport,
) {
    report.explosions.push(Explosion {
        center,
        radius: EXPLOSION_RADIUS,
    });
    for enemy in enemies.iter_mut() {
        if enemy.is_dying() || hit_this_tick.contains(&enemy.id) {
            continue;
        }
        if enemy.center().distance(center) > EXPLOSION_RADIUS {
            continue;
        }
        hit_this_tick.push(enemy.id);
        if enemy.take_damage(1, now) {
            report.kills.push(Kill::of(enemy));
        }
    }
}

/// A straight-flying shot from a shooter enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyBullet {
    pub body: Rect,
    pub velocity: Vec2,
}

impl EnemyBullet {
    pub fn aimed(from: Vec2, at: Vec2) -> Self {
        Self {
            body: Rect::centered(from, ENEMY_BULLET_SIZE, ENEMY_BULLET_SIZE),
            velocity: direction(angle_between(from, at)) * ENEMY_BULLET_SPEED,
        }
    }
}

/// Move enemy bullets; each one that touches the player deals a point of
/// damage and is consumed
pub fn update_enemy_bullets(
    bullets: &mut Vec<EnemyBullet>,
    player_body: &Rect,
    ctx: &SimContext,
    report: &mut CombatReport,
) {
    bullets.retain_mut(|bullet| {
        bullet.body.translate(bullet.velocity);
        if bullet.body.intersects(player_body) {
            report.player_hits += 1;
            return false;
        }
        if ctx.obstacles.collides(&bullet.body) {
            return false;
        }
        bullet.body.intersects(&ctx.bounds)
    });
}

/// Boss missile that steers toward the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Missile {
    pub body: Rect,
    /// Current heading
    pub angle: f32,
}

impl Missile {
    pub fn launch(from: Vec2, target: Vec2) -> Self {
        Self {
            body: Rect::centered(from, MISSILE_SIZE, MISSILE_SIZE),
            angle: angle_between(from, target),
        }
    }

    /// Turn a fraction of the way toward `target`, then move
    pub fn steer(&mut self, target: Vec2) {
        let wanted = angle_between(self.body.center(), target);
        let turn = normalize_angle(wanted - self.angle);
        self.angle = normalize_angle(self.angle + turn * MISSILE_TURN_RATE);
        self.body.translate(direction(self.angle) * MISSILE_SPEED);
    }
}

/// Steer missiles toward the player. A missile explodes when it reaches the
/// player, an obstacle or the map edge, hurting the player and any enemy
/// inside the blast except the boss.
pub fn update_missiles(
    missiles: &mut Vec<Missile>,
    enemies: &mut [Enemy],
    player_body: &Rect,
    ctx: &SimContext,
    report: &mut CombatReport,
) {
    missiles.retain_mut(|missile| {
        missile.steer(player_body.center());
        let detonate = missile.body.intersects(player_body)
            || ctx.obstacles.collides(&missile.body)
            || !ctx.bounds.intersects(&missile.body);
        if detonate {
            let blast = Circle::new(missile.body.center(), EXPLOSION_RADIUS);
            report.explosions.push(Explosion {
                center: blast.center,
                radius: blast.radius,
            });
            if blast.intersects_rect(player_body) {
                report.player_hits += 1;
            }
            for enemy in enemies.iter_mut() {
                if !enemy.is_dying()
                    && !enemy.is_boss()
                    && enemy.center().distance(blast.center) <= blast.radius
                    && enemy.take_damage(MISSILE_ENEMY_DAMAGE, ctx.now)
                {
                    report.deaths.push(Kill::of(enemy));
                }
            }
        }
        !detonate
    });
}
