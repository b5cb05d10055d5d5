//! Game state and core simulation types
//!
//! Every entity is a plain record owned by [`GameState`]. The renderer only
//! ever sees them through [`RenderSnapshot`].

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::{Effects, Particle, PendingEffect, Popup};
use crate::consts::*;
use crate::economy::UpgradeValues;
use crate::settings::Settings;

/// Where the wave/boss director currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectorState {
    /// Fresh level, first wave not spawned yet
    SpawningWave,
    /// Regular wave on the field
    ClearingWave,
    /// Boss on the field
    BossFight,
    /// Boss destroyed, waiting for the host to finish the level.
    /// This is also the level-complete-pending phase.
    BossDefeated,
    /// Host acknowledged the level transition
    LevelComplete,
}

/// Player ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Collection radius for pickups
    pub pickup_radius: f32,
    pub shield: f32,
    pub shield_max: f32,
    pub lives: u32,
    pub fire_cooldown: f32,
    /// Weapon heat, 0..=110
    pub heat: f32,
    pub overheat_locked: bool,
    pub dash_cooldown: f32,
    /// Remaining time the max-speed clamp is lifted after a dash
    pub dash_timer: f32,
    /// Invulnerability timer (seconds)
    pub inv: f32,
    /// 1..=5
    pub weapon_level: u8,
    /// >= 1.0
    pub speed_boost: f32,
    pub dash_enabled: bool,
    /// Upgrade level used to look up the dash cooldown
    pub dash_level: u32,
    /// 0..1 fraction shaved off each shot's heat cost
    pub overheat_reduction: f32,
}

/// Enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Drone,
    Swooper,
    Zigzag,
    Tank,
    Shooter,
    Kamikaze,
    Splitter,
    Sniper,
    Orbiter,
    Bomber,
    Elite,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 11] = [
        EnemyKind::Drone,
        EnemyKind::Swooper,
        EnemyKind::Zigzag,
        EnemyKind::Tank,
        EnemyKind::Shooter,
        EnemyKind::Kamikaze,
        EnemyKind::Splitter,
        EnemyKind::Sniper,
        EnemyKind::Orbiter,
        EnemyKind::Bomber,
        EnemyKind::Elite,
    ];

    /// Heavy kinds trigger a short hit-stop when destroyed
    pub fn is_heavy(self) -> bool {
        matches!(self, EnemyKind::Tank | EnemyKind::Bomber | EnemyKind::Elite)
    }
}

/// Per-kind movement state. Each variant carries only what its pattern needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Maneuver {
    /// Straight down
    Dive,
    /// Sine sway around a fixed column
    Sway {
        origin_x: f32,
        amplitude: f32,
        frequency: f32,
    },
    /// Bounce between the side walls
    Bounce,
    /// Fall, then lock onto the player after a delay
    Home { locked: bool },
    /// Descend to `hold_y`, linger for `dwell` seconds, then leave
    Park { hold_y: f32, dwell: f32 },
    /// Circle an anchor that drifts downward
    Orbit {
        anchor: Vec2,
        angle: f32,
        orbit_radius: f32,
    },
    /// Figure-eight weave
    Weave { phase: f32 },
}

/// A regular enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub maneuver: Maneuver,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub hp: i32,
    /// Cruise speed rolled at spawn
    pub speed: f32,
    pub age: f32,
    /// Time until the next shot
    pub shoot_cooldown: f32,
    /// `None` for kinds that never fire
    pub fire_interval: Option<f32>,
    pub bullet_damage: f32,
    pub bullet_speed: f32,
    pub score: u32,
    /// Damage dealt to the player on body contact
    pub contact_damage: f32,
    /// Cosmetic only
    pub hue: f32,
}

/// Boss sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhase {
    /// Moving into position from above the field
    Entering,
    /// Hover/weave and attack
    Hover,
}

/// Cosmetic ring segment around the boss
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RingElement {
    pub angle: f32,
    pub intact: bool,
}

/// Level boss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub hp: i32,
    pub hp_max: i32,
    pub age: f32,
    pub shoot_cooldown: f32,
    pub beam_cooldown: f32,
    /// Seconds spent below the rage threshold
    pub rage: f32,
    /// Level this boss belongs to
    pub level: u8,
    pub phase: BossPhase,
    /// Number of petal volleys fired (rotates the pattern)
    pub volleys: u32,
    pub score: u32,
    pub ring: Vec<RingElement>,
}

impl Boss {
    /// Remaining hp as a fraction of max
    pub fn hp_ratio(&self) -> f32 {
        if self.hp_max <= 0 {
            return 0.0;
        }
        (self.hp as f32 / self.hp_max as f32).clamp(0.0, 1.0)
    }
}

/// Player projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: i32,
    /// Remaining life (seconds)
    pub life: f32,
    pub hue: f32,
}

/// Hostile projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyBullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub life: f32,
    pub hue: f32,
}

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Shield,
}

/// A falling pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub kind: PickupKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub age: f32,
}

/// Simulation-facing subset of [`Settings`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub hard_mode: bool,
    pub max_particles: usize,
    pub shake_enabled: bool,
    pub hit_stop_enabled: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for SimConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            hard_mode: settings.hard_mode,
            max_particles: settings.max_particles(),
            shake_enabled: settings.effective_screen_shake(),
            hit_stop_enabled: settings.effective_hit_stop(),
        }
    }
}

/// Complete simulation state for one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Gameplay RNG (spawns, kinds, drops, firing jitter)
    pub rng: Pcg32,
    pub config: SimConfig,
    /// Current level, 1..=5. Survives `reset_all`.
    pub level: u8,
    pub wave: u32,
    pub score: u32,
    /// Simulated seconds since the run started
    pub time: f32,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub boss: Option<Boss>,
    pub bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<EnemyBullet>,
    pub pickups: Vec<Pickup>,
    pub effects: Effects,
    pub director: DirectorState,
    /// Set on boss death, cleared by `finish_level`
    pub boss_defeated: bool,
    /// Countdown for the wave/boss announcement banner
    pub wave_message: f32,
    /// True once lives hit 0
    pub dead: bool,
    /// Whether the run end has already been reported by `tick`
    pub(crate) end_reported: bool,
    /// Last upgrade values applied; re-applied by `reset_all`
    pub upgrades: UpgradeValues,
}

impl GameState {
    /// Create a new run at level 1 with the given seed
    pub fn new(seed: u64, config: SimConfig) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            config,
            level: 1,
            wave: 0,
            score: 0,
            time: 0.0,
            player: Player::new(),
            enemies: Vec::new(),
            boss: None,
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            pickups: Vec::new(),
            effects: Effects::new(seed, &config),
            director: DirectorState::SpawningWave,
            boss_defeated: false,
            wave_message: 0.0,
            dead: false,
            end_reported: false,
            upgrades: UpgradeValues::default(),
        }
    }

    pub fn hard_mode(&self) -> bool {
        self.config.hard_mode
    }

    /// Toggle difficulty. Takes effect for stats rolled from now on.
    pub fn set_hard_mode(&mut self, hard: bool) {
        self.config.hard_mode = hard;
    }

    /// Select the level for the next run (clamped to 1..=5)
    pub fn set_level(&mut self, level: u8) {
        self.level = level.clamp(1, MAX_LEVEL);
    }

    /// Start a new run on the current level.
    ///
    /// The player is rebuilt and the last applied upgrade values are applied
    /// again, so `reset_all` and `apply_upgrades` commute.
    pub fn reset_all(&mut self) {
        self.wave = 0;
        self.score = 0;
        self.time = 0.0;
        self.player = Player::new();
        self.player.apply_upgrades(&self.upgrades);
        self.enemies.clear();
        self.boss = None;
        self.bullets.clear();
        self.enemy_bullets.clear();
        self.pickups.clear();
        self.effects.clear();
        self.director = DirectorState::SpawningWave;
        self.boss_defeated = false;
        self.wave_message = 0.0;
        self.dead = false;
        self.end_reported = false;
    }

    /// Store and apply upgrade values to the player
    pub fn apply_upgrades(&mut self, values: UpgradeValues) {
        self.upgrades = values.sanitized();
        self.player.apply_upgrades(&self.upgrades);
    }

    /// Level start flow: select level, reset, then apply the economy's values
    pub fn start_level<E: crate::economy::Economy + ?Sized>(&mut self, level: u8, economy: &E) {
        self.set_level(level);
        self.reset_all();
        self.apply_upgrades(economy.game_values());
        log::info!(
            "Level {} start (hard={}, weapon={}, shield_max={})",
            self.level,
            self.config.hard_mode,
            self.player.weapon_level,
            self.player.shield_max
        );
    }

    /// Acknowledge the boss-defeat transition after the host's delay
    pub fn finish_level(&mut self) -> bool {
        if !self.boss_defeated {
            return false;
        }
        self.boss_defeated = false;
        self.director = DirectorState::LevelComplete;
        log::info!("Level {} complete (score {})", self.level, self.score);
        true
    }

    /// Read-only view for the renderer
    pub fn snapshot(&self) -> RenderSnapshot<'_> {
        RenderSnapshot {
            player: &self.player,
            enemies: &self.enemies,
            boss: self.boss.as_ref(),
            bullets: &self.bullets,
            enemy_bullets: &self.enemy_bullets,
            pickups: &self.pickups,
            particles: &self.effects.particles,
            popups: &self.effects.popups,
            pending: &self.effects.pending,
            score: self.score,
            wave: self.wave,
            time: self.time,
            shake: self.effects.shake,
            wave_message: self.wave_message,
            hard_mode: self.config.hard_mode,
            level: self.level,
            director: self.director,
        }
    }
}

/// Borrowed view of everything the renderer draws in a frame
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RenderSnapshot<'a> {
    pub player: &'a Player,
    pub enemies: &'a [Enemy],
    pub boss: Option<&'a Boss>,
    pub bullets: &'a [Bullet],
    pub enemy_bullets: &'a [EnemyBullet],
    pub pickups: &'a [Pickup],
    pub particles: &'a [Particle],
    pub popups: &'a [Popup],
    /// Telegraphed beams still counting down
    pub pending: &'a [PendingEffect],
    pub score: u32,
    pub wave: u32,
    pub time: f32,
    pub shake: f32,
    pub wave_message: f32,
    pub hard_mode: bool,
    pub level: u8,
    pub director: DirectorState,
}

/// Player spawn point
pub fn player_spawn() -> Vec2 {
    Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT - 120.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = GameState::new(7, SimConfig::default());
        assert_eq!(state.level, 1);
        assert_eq!(state.player.lives, 3);
        assert_eq!(state.player.shield, 100.0);
        assert_eq!(state.player.weapon_level, 1);
        assert_eq!(state.director, DirectorState::SpawningWave);
        assert!(state.boss.is_none());
    }

    #[test]
    fn test_set_level_clamps() {
        let mut state = GameState::new(7, SimConfig::default());
        state.set_level(9);
        assert_eq!(state.level, 5);
        state.set_level(0);
        assert_eq!(state.level, 1);
    }

    #[test]
    fn test_reset_preserves_level_and_upgrades() {
        let mut state = GameState::new(7, SimConfig::default());
        state.set_level(3);
        state.apply_upgrades(UpgradeValues {
            weapon_level: 4,
            ..Default::default()
        });
        state.score = 900;
        state.reset_all();
        assert_eq!(state.level, 3);
        assert_eq!(state.score, 0);
        assert_eq!(state.player.weapon_level, 4);
    }

    #[test]
    fn test_finish_level_requires_boss_defeat() {
        let mut state = GameState::new(7, SimConfig::default());
        assert!(!state.finish_level());
        state.boss_defeated = true;
        state.director = DirectorState::BossDefeated;
        assert!(state.finish_level());
        assert!(!state.boss_defeated);
        assert_eq!(state.director, DirectorState::LevelComplete);
    }
}
