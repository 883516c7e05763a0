use glam::Vec2;
use last_stand::sim::{
    Archetype, GameEvent, GamePhase, ObstacleField, RunSummary, TickInput, World, autopilot, spawn_interval, tick,
};
use last_stand::{HighScores, Tuning};

fn open_world(seed: u64, tuning: Tuning) -> World {
    World::with_obstacles(seed, tuning, ObstacleField::default()).expect("valid tuning")
}

fn idle() -> TickInput {
    TickInput::default()
}

#[test]
fn three_contacts_end_the_run() {
    let mut world = open_world(1, Tuning::default());
    let center = world.player.center();

    for (i, offset) in [Vec2::new(30.0, 0.0), Vec2::new(-30.0, 0.0), Vec2::new(0.0, 30.0)]
        .into_iter()
        .enumerate()
    {
        assert!(!world.is_over());
        world.spawn_enemy(Archetype::Normal, center + offset);
        tick(&mut world, &idle());
        assert_eq!(world.player.health, 2 - i as i32);
    }

    assert!(world.is_over());
    assert_eq!(world.phase, GamePhase::GameOver);
    let ended: Vec<RunSummary> = world
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            GameEvent::RunEnded(summary) => Some(summary),
            _ => None,
        })
        .collect();
    assert_eq!(ended, vec![RunSummary { score: 0, wave: 1 }]);

    let mut scores = HighScores::new();
    assert_eq!(scores.record("first", ended[0]), Some(1));
    assert_eq!(scores.record("second", RunSummary { score: 10, wave: 1 }), Some(1));
    assert_eq!(scores.entries.len(), 2);
}

#[test]
fn boss_wave_gates_normal_spawns() {
    let mut tuning = Tuning::default();
    tuning.waves.wave_duration_ms = 1000;
    tuning.waves.initial_spawn_interval_ms = 200;
    tuning.waves.min_spawn_interval_ms = 100;
    tuning.player.health = 100_000;
    let mut world = open_world(2, tuning);

    // Run until the boss shows up
    let mut guard = 0;
    while !world.director.boss_active && guard < 60 * 30 {
        tick(&mut world, &idle());
        guard += 1;
    }
    assert!(world.director.boss_active);
    assert_eq!(world.director.wave, 10);
    assert!(world.boss_present());
    let events = world.drain_events();
    assert!(events.contains(&GameEvent::BossSpawned));

    // Regular enemies don't need to linger for this check
    world.enemies.retain(|e| e.is_boss());

    // Long past the wave duration: still wave 10, nothing but the boss
    for _ in 0..60 * 10 {
        tick(&mut world, &idle());
        if world.is_over() {
            break;
        }
    }
    assert!(!world.is_over());
    assert_eq!(world.director.wave, 10);
    assert_eq!(world.enemies.len(), 1);
    assert!(world.director.boss_active);

    // Kill the boss; it stays until its death animation ends
    let now = world.now;
    let boss = world.enemies.iter_mut().find(|e| e.is_boss()).expect("boss");
    assert!(boss.take_damage(1_000, now));
    tick(&mut world, &idle());
    assert!(world.director.boss_active);

    let mut guard = 0;
    while world.director.boss_active && guard < 120 {
        tick(&mut world, &idle());
        guard += 1;
    }
    assert!(!world.director.boss_active);
    assert!(!world.boss_present());
    assert!(world.drain_events().contains(&GameEvent::BossDefeated));

    // Normal spawning resumes
    for _ in 0..60 {
        tick(&mut world, &idle());
    }
    assert!(world.enemies.iter().any(|e| !e.is_boss()));
}

#[test]
fn wave_progression_unlocks_archetypes() {
    let mut tuning = Tuning::default();
    tuning.waves.wave_duration_ms = 500;
    tuning.player.health = 100_000;
    let mut world = open_world(3, tuning);

    let mut unlocked = Vec::new();
    while world.director.wave < 6 {
        tick(&mut world, &idle());
        for event in world.drain_events() {
            if let GameEvent::ArchetypeUnlocked(a) = event {
                unlocked.push((world.director.wave, a));
            }
        }
    }
    assert_eq!(unlocked, vec![(5, Archetype::Fast)]);
}

#[test]
fn spawn_interval_bottoms_out_late() {
    let waves = Tuning::default().waves;
    let at = |wave| spawn_interval(waves.initial_spawn_interval_ms, waves.min_spawn_interval_ms, wave);
    assert_eq!(at(1), 2000);
    assert_eq!(at(5), 1900);
    assert_eq!(at(25), 1500);
    assert_eq!(at(200), 1000);
}

#[test]
fn xp_threshold_grows_geometrically() {
    let mut world = open_world(4, Tuning::default());
    let tuning = world.tuning.clone();
    assert_eq!(world.player.xp_threshold, 100);
    world.player.gain_xp(100, &tuning);
    assert_eq!(world.player.xp_threshold, 120);
    world.player.gain_xp(120, &tuning);
    assert_eq!(world.player.xp_threshold, 144);
}

#[test]
fn autopilot_runs_are_deterministic() {
    let play = |seed: u64| {
        let mut world = World::new(seed, Tuning::default()).expect("valid tuning");
        for _ in 0..60 * 60 {
            if world.is_over() {
                break;
            }
            let input = autopilot(&world);
            tick(&mut world, &input);
        }
        world
    };

    let a = play(2024);
    let b = play(2024);
    assert_eq!(a.ticks, b.ticks);
    assert_eq!(a.summary(), b.summary());
    assert_eq!(a.snapshot(), b.snapshot());

    let c = play(7);
    assert!(a.snapshot() != c.snapshot());
}

#[test]
fn paused_world_only_accepts_upgrade_choice() {
    let mut world = open_world(5, Tuning::default());
    let tuning = world.tuning.clone();
    world.player.gain_xp(100, &tuning);
    tick(&mut world, &idle());
    assert_eq!(world.phase, GamePhase::AwaitingUpgrade);

    let ticks = world.ticks;
    let moving = TickInput {
        right: true,
        fire: true,
        aim: Some(Vec2::new(0.0, 0.0)),
        ..Default::default()
    };
    let before = world.player.center();
    for _ in 0..30 {
        tick(&mut world, &moving);
    }
    assert_eq!(world.ticks, ticks);
    assert_eq!(world.player.center(), before);
    assert!(world.bullets.is_empty());

    tick(
        &mut world,
        &TickInput {
            upgrade_choice: Some(3),
            ..Default::default()
        },
    );
    assert_eq!(world.phase, GamePhase::Playing);
}
