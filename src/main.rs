//! Last Stand headless runner
//!
//! Plays a run with the autopilot at full speed, logs the outcome and
//! records it on the leaderboard.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;

    use last_stand::consts::TICK_RATE;
    use last_stand::sim::{GameEvent, World, auto_purchase, autopilot, tick};
    use last_stand::{HighScores, Tuning};

    #[derive(Parser)]
    #[command(name = "last-stand", about = "Run a headless Last Stand game with the autopilot")]
    struct Cli {
        /// Run seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Stop after this many simulated seconds
        #[arg(long, default_value = "600")]
        seconds: u64,

        /// Balance overrides (JSON)
        #[arg(long)]
        tuning: Option<PathBuf>,

        /// Leaderboard file to record the run in
        #[arg(long)]
        leaderboard: Option<PathBuf>,

        /// Name to record on the leaderboard
        #[arg(long, default_value = "autopilot")]
        name: String,
    }

    pub fn run() -> Result<()> {
        let cli = Cli::parse();

        let tuning = match &cli.tuning {
            Some(path) => Tuning::load(path).with_context(|| format!("loading {}", path.display()))?,
            None => Tuning::default(),
        };
        let mut world = World::new(cli.seed, tuning).context("building world")?;

        let max_ticks = cli.seconds * TICK_RATE;
        while !world.is_over() && world.ticks < max_ticks {
            if let Some(action) = auto_purchase(&mut world) {
                log::info!("Autopilot bought {}", action.name());
            }
            let input = autopilot(&world);
            tick(&mut world, &input);

            for event in world.drain_events() {
                match event {
                    GameEvent::WaveStarted { wave, .. } => log::info!("Wave {wave}"),
                    GameEvent::BossSpawned => log::info!("Boss incoming"),
                    GameEvent::UpgradeChosen(upgrade) => log::info!("Upgrade: {}", upgrade.name()),
                    GameEvent::RunEnded(summary) => {
                        log::info!("Run ended: score {}, wave {}", summary.score, summary.wave)
                    }
                    _ => {}
                }
            }
        }

        let summary = world.summary();
        if !world.is_over() {
            log::info!("Time limit reached");
        }
        println!(
            "seed {} | score {} | wave {} | level {} | {:.1}s",
            cli.seed,
            summary.score,
            summary.wave,
            world.player.level,
            world.now as f64 / 1000.0
        );

        if let Some(path) = &cli.leaderboard {
            let mut scores = HighScores::load(path).with_context(|| format!("reading {}", path.display()))?;
            match scores.record(&cli.name, summary) {
                Some(rank) => {
                    scores.save(path).with_context(|| format!("writing {}", path.display()))?;
                    println!("New high score! Rank #{rank}");
                }
                None => println!("Did not place on the leaderboard"),
            }
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The runner is native-only
}
