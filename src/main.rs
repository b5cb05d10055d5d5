//! Void Barrage headless host
//!
//! Runs the fixed-step simulation with a simple autopilot, drives the level
//! lifecycle and persists the profile.
//!
//! Usage: `void-barrage [LEVEL] [--hard] [--seed N] [--seconds N] [--data DIR]`

use std::path::PathBuf;

use clap::Parser;
use glam::Vec2;
use void_barrage::consts::*;
use void_barrage::sim::{DirectorState, FixedClock, GameState, SimConfig, TickInput, tick};
use void_barrage::{LevelProgress, Profile, Settings, UpgradeKind};

/// Simulated frame length fed to the clock (slightly uneven, like a real display)
const FRAME_DT: f32 = 1.0 / 59.0;

#[derive(Parser, Debug)]
#[command(name = "void-barrage")]
#[command(about = "Play one Void Barrage level headless with the autopilot")]
struct Args {
    /// Level to start (must already be unlocked)
    #[arg(value_parser = clap::value_parser!(u8).range(1..=MAX_LEVEL as i64))]
    level: Option<u8>,
    /// Hard difficulty (overrides settings.json)
    #[arg(long)]
    hard: bool,
    /// Run seed
    #[arg(long, default_value_t = 0x5EED)]
    seed: u64,
    /// Simulated seconds before giving up
    #[arg(long, default_value_t = 240.0)]
    seconds: f32,
    /// Directory holding settings.json and profile.json
    #[arg(long = "data", default_value = ".")]
    data_dir: PathBuf,
}

/// Host session: simulation, clock and the persisted profile
struct Game {
    state: GameState,
    clock: FixedClock,
    profile: Profile,
    profile_path: PathBuf,
    /// Seconds since the boss died, while waiting to complete the level
    complete_timer: Option<f32>,
    last_director: DirectorState,
}

impl Game {
    fn new(args: &Args) -> Self {
        let settings = Settings::load(args.data_dir.join("settings.json"));
        let mut config = SimConfig::from(&settings);
        config.hard_mode |= args.hard;

        let profile_path = args.data_dir.join("profile.json");
        let profile = Profile::load_or_default(&profile_path);

        let mut level = args.level.unwrap_or(1);
        if !profile.is_unlocked(level) {
            log::warn!("Level {} is locked, starting level 1", level);
            level = 1;
        }

        let mut state = GameState::new(args.seed, config);
        state.start_level(level, &profile);
        Self {
            state,
            clock: FixedClock::default(),
            profile,
            profile_path,
            complete_timer: None,
            last_director: DirectorState::SpawningWave,
        }
    }

    /// Run one real frame; returns false once the run is over
    fn frame(&mut self, frame_dt: f32) -> bool {
        let steps = self.clock.advance(frame_dt);
        for _ in 0..steps {
            let input = autopilot(&self.state);
            let outcome = tick(&mut self.state, &input, SIM_DT, &mut self.profile);
            if outcome.ended {
                log::info!(
                    "Run over on level {} wave {} (score {})",
                    self.state.level,
                    self.state.wave,
                    self.state.score
                );
                return false;
            }
        }

        if self.state.director != self.last_director {
            log::debug!("Director {:?} -> {:?}", self.last_director, self.state.director);
            self.last_director = self.state.director;
        }

        // Host-side delay between boss death and level completion
        if self.state.boss_defeated {
            let t = self.complete_timer.get_or_insert(0.0);
            *t += frame_dt;
            if *t >= LEVEL_COMPLETE_DELAY {
                self.complete_timer = None;
                self.state.finish_level();
                return false;
            }
        }
        true
    }

    /// Spend credits on the cheapest affordable upgrade, then save
    fn shop_and_save(&mut self) {
        loop {
            let wallet = &self.profile.wallet;
            let cheapest = UpgradeKind::ALL
                .iter()
                .copied()
                .filter(|k| wallet.upgrades.get(*k) < k.max_level())
                .min_by_key(|k| k.cost(wallet.upgrades.get(*k)));
            let Some(kind) = cheapest else { break };
            if self.profile.wallet.purchase(kind).is_err() {
                break;
            }
        }
        if let Err(e) = self.profile.save(&self.profile_path) {
            log::error!("Failed to save profile: {}", e);
        }
    }
}

/// Dodge the nearest threat, drift under the nearest target and keep firing
fn autopilot(state: &GameState) -> TickInput {
    let player = &state.player;

    let target_x = state
        .boss
        .as_ref()
        .map(|b| b.pos.x)
        .or_else(|| {
            state
                .enemies
                .iter()
                .min_by(|a, b| {
                    a.pos
                        .distance_squared(player.pos)
                        .total_cmp(&b.pos.distance_squared(player.pos))
                })
                .map(|e| e.pos.x)
        })
        .unwrap_or(FIELD_WIDTH / 2.0);

    let mut intent = Vec2::new((target_x - player.pos.x) / 120.0, 0.0);

    let threat = state
        .enemy_bullets
        .iter()
        .filter(|b| b.pos.y < player.pos.y && player.pos.y - b.pos.y < 160.0)
        .find(|b| (b.pos.x - player.pos.x).abs() < 40.0);
    let dash = threat.is_some();
    if let Some(b) = threat {
        intent.x = if b.pos.x > player.pos.x { -1.0 } else { 1.0 };
    }

    let home_y = FIELD_HEIGHT - 120.0;
    intent.y = (home_y - player.pos.y) / 120.0;

    TickInput {
        intent: intent.clamp_length_max(1.0),
        shoot: !player.overheat_locked && player.heat < 85.0,
        dash,
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    log::info!("Void Barrage (headless) starting...");

    let mut game = Game::new(&args);
    let frames = (args.seconds / FRAME_DT) as u32;
    for _ in 0..frames {
        if !game.frame(FRAME_DT) {
            break;
        }
    }

    let s = &game.state;
    println!(
        "level {} | wave {} | score {} | lives {} | credits {} | {}",
        s.level,
        s.wave,
        s.score,
        s.player.lives,
        game.profile.wallet.credits,
        match (s.dead, s.director) {
            (true, _) => "destroyed",
            (false, DirectorState::LevelComplete) => "level complete",
            _ => "time up",
        }
    );
    game.shop_and_save();
}
