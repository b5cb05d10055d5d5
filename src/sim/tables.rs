//! Balance tables
//!
//! Per-kind enemy stats, per-level spawn weights, boss scaling and player
//! tuning. Everything that decides "how strong" lives here so the rest of the
//! simulation only decides "when".

use rand::Rng;

use super::state::EnemyKind;
use crate::consts::MAX_LEVEL;
use crate::lerp;

/// Base stats for one enemy kind (level 1, normal mode)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub radius: f32,
    pub hp: i32,
    pub speed: f32,
    pub score: u32,
    pub contact_damage: f32,
    /// Damage per hostile bullet
    pub bullet_damage: f32,
    pub bullet_speed: f32,
    /// Seconds between shots, `None` for kinds that never fire
    pub fire_interval: Option<f32>,
    pub hue: f32,
}

pub fn base_stats(kind: EnemyKind) -> EnemyStats {
    let (radius, hp, speed, score, contact, bullet_damage, bullet_speed, fire, hue) = match kind {
        EnemyKind::Drone => (16.0, 3, 150.0, 10, 30.0, 0.0, 0.0, None, 190.0),
        EnemyKind::Swooper => (16.0, 4, 130.0, 15, 28.0, 0.0, 0.0, None, 280.0),
        EnemyKind::Zigzag => (15.0, 4, 140.0, 15, 28.0, 0.0, 0.0, None, 50.0),
        EnemyKind::Tank => (26.0, 14, 70.0, 40, 45.0, 14.0, 240.0, Some(1.8), 20.0),
        EnemyKind::Shooter => (18.0, 6, 100.0, 25, 30.0, 12.0, 260.0, Some(1.4), 330.0),
        EnemyKind::Kamikaze => (14.0, 3, 170.0, 20, 40.0, 0.0, 0.0, None, 0.0),
        EnemyKind::Splitter => (22.0, 8, 95.0, 30, 32.0, 0.0, 0.0, None, 120.0),
        EnemyKind::Sniper => (17.0, 6, 110.0, 35, 28.0, 18.0, 420.0, Some(2.2), 210.0),
        EnemyKind::Orbiter => (17.0, 7, 90.0, 30, 30.0, 12.0, 220.0, Some(2.0), 160.0),
        EnemyKind::Bomber => (24.0, 12, 75.0, 45, 40.0, 14.0, 200.0, Some(2.4), 30.0),
        EnemyKind::Elite => (22.0, 18, 110.0, 80, 45.0, 15.0, 280.0, Some(1.6), 300.0),
    };
    EnemyStats {
        radius,
        hp,
        speed,
        score,
        contact_damage: contact,
        bullet_damage,
        bullet_speed,
        fire_interval: fire,
        hue,
    }
}

#[inline]
fn level_index(level: u8) -> usize {
    (level.clamp(1, MAX_LEVEL) - 1) as usize
}

/// Stats after level, wave and difficulty scaling
pub fn scaled_stats(kind: EnemyKind, level: u8, wave: u32, hard: bool) -> EnemyStats {
    let base = base_stats(kind);
    let li = level_index(level) as f32;

    let hp_mult = (1.0 + 0.15 * li) * if hard { 1.3 } else { 1.0 };
    let speed_mult =
        (1.0 + 0.06 * li + 0.02 * wave.min(10) as f32) * if hard { 1.15 } else { 1.0 };
    let fire_mult = (1.0 - 0.06 * li) * if hard { 0.85 } else { 1.0 };

    EnemyStats {
        hp: ((base.hp as f32) * hp_mult).round().max(1.0) as i32,
        speed: base.speed * speed_mult,
        fire_interval: base.fire_interval.map(|f| f * fire_mult),
        bullet_damage: if hard {
            (base.bullet_damage * 1.25).round()
        } else {
            base.bullet_damage
        },
        ..base
    }
}

/// Spawn weights per level, indexed like [`EnemyKind::ALL`]
pub const LEVEL_KIND_WEIGHTS: [[u32; 11]; 5] = [
    // Drone Swoop Zig Tank Shoot Kami Split Snipe Orbit Bomb Elite
    [40, 25, 20, 0, 15, 0, 0, 0, 0, 0, 0],
    [28, 20, 16, 8, 14, 14, 0, 0, 0, 0, 0],
    [18, 15, 12, 10, 13, 12, 10, 10, 0, 0, 0],
    [12, 11, 10, 11, 12, 11, 9, 9, 8, 7, 0],
    [8, 9, 8, 11, 11, 10, 9, 9, 9, 9, 7],
];

/// Independent weighted draw of one enemy kind for `level`
pub fn roll_kind<R: Rng + ?Sized>(rng: &mut R, level: u8) -> EnemyKind {
    let weights = &LEVEL_KIND_WEIGHTS[level_index(level)];
    let total: u32 = weights.iter().sum();
    let mut roll = rng.random_range(0..total);
    for (kind, &w) in EnemyKind::ALL.iter().zip(weights.iter()) {
        if roll < w {
            return *kind;
        }
        roll -= w;
    }
    EnemyKind::Drone
}

/// Enemies spawned in wave `n`
pub fn wave_enemy_count(wave: u32, hard: bool) -> u32 {
    6 + wave * 2 + if hard { 2 } else { 0 }
}

/// Wave index at which the level's boss appears
pub fn boss_wave(level: u8) -> u32 {
    5 + level.clamp(1, MAX_LEVEL) as u32
}

/// Chance that a destroyed enemy drops a pickup
pub const PICKUP_DROP_CHANCE: f32 = 0.12;
/// Shield restored by a shield pickup
pub const SHIELD_PICKUP_AMOUNT: f32 = 25.0;

// === Boss ===

pub const BOSS_BASE_HP: f32 = 420.0;
pub const BOSS_BASE_HP_HARD: f32 = 520.0;
pub const BOSS_LEVEL_MULTIPLIER: [f32; 5] = [1.0, 1.25, 1.5, 1.75, 2.0];
pub const BOSS_SHOOT_COOLDOWN: [f32; 5] = [1.15, 1.05, 0.95, 0.85, 0.75];
pub const BOSS_RADIUS: f32 = 64.0;
pub const BOSS_ALTITUDE: f32 = 170.0;
pub const BOSS_ENTRY_SPEED: f32 = 120.0;
/// Below this hp ratio the boss adds aimed bursts
pub const BOSS_BURST_THRESHOLD: f32 = 0.72;
/// Below this hp ratio the boss starts firing beams
pub const BOSS_BEAM_THRESHOLD: f32 = 0.55;
/// Below this hp ratio rage accumulates
pub const BOSS_RAGE_THRESHOLD: f32 = 0.35;
pub const BEAM_TELEGRAPH: f32 = 0.9;
pub const BEAM_HALF_WIDTH: f32 = 36.0;
pub const BOSS_RING_ELEMENTS: usize = 12;

pub fn boss_hp_max(level: u8, hard: bool) -> i32 {
    let base = if hard { BOSS_BASE_HP_HARD } else { BOSS_BASE_HP };
    (base * BOSS_LEVEL_MULTIPLIER[level_index(level)]).round() as i32
}

pub fn boss_shoot_cooldown(level: u8, hard: bool) -> f32 {
    BOSS_SHOOT_COOLDOWN[level_index(level)] * if hard { 0.85 } else { 1.0 }
}

/// Petals per radial volley; grows as hp drops
pub fn petal_count(level: u8, hard: bool, hp_ratio: f32) -> u32 {
    let rage_bonus = lerp(0.0, 4.0, 1.0 - hp_ratio.clamp(0.0, 1.0)).floor() as u32;
    6 + 2 * level.clamp(1, MAX_LEVEL) as u32 + if hard { 2 } else { 0 } + rage_bonus
}

/// Petal bullet speed; grows as hp drops
pub fn petal_speed(level: u8, hard: bool, hp_ratio: f32) -> f32 {
    lerp(160.0, 260.0, 1.0 - hp_ratio.clamp(0.0, 1.0))
        + 12.0 * level_index(level) as f32
        + if hard { 20.0 } else { 0.0 }
}

pub fn aimed_burst_count(hard: bool) -> u32 {
    if hard { 3 } else { 2 }
}

pub fn beam_interval(level: u8) -> f32 {
    6.0 - 0.4 * level_index(level) as f32
}

pub fn beam_damage(hard: bool) -> f32 {
    if hard { 45.0 } else { 35.0 }
}

pub fn boss_bullet_damage(hard: bool) -> f32 {
    if hard { 16.0 } else { 12.0 }
}

pub fn boss_score(level: u8) -> u32 {
    1500 + 500 * level.clamp(1, MAX_LEVEL) as u32
}

// === Player tuning ===

pub const PLAYER_RADIUS: f32 = 14.0;
pub const PLAYER_PICKUP_RADIUS: f32 = 46.0;
pub const PLAYER_LIVES: u32 = 3;
pub const FRICTION: f32 = 0.88;
pub const DASH_SPEED: f32 = 950.0;
pub const DASH_DURATION: f32 = 0.14;
pub const DASH_INVULNERABILITY: f32 = 0.40;
pub const RESPAWN_INVULNERABILITY: f32 = 1.0;
pub const HEAT_MAX: f32 = 110.0;
pub const OVERHEAT_THRESHOLD: f32 = 100.0;
pub const BULLET_SPEED: f32 = 900.0;
pub const BULLET_RADIUS: f32 = 4.0;
pub const BULLET_LIFE: f32 = 1.1;
pub const ENEMY_BULLET_LIFE: f32 = 6.0;

pub fn base_accel(hard: bool) -> f32 {
    if hard { 2400.0 } else { 2600.0 }
}

pub fn max_speed(hard: bool) -> f32 {
    if hard { 480.0 } else { 520.0 }
}

/// Heat added by one trigger pull
pub fn heat_cost(hard: bool, weapon_level: u8, overheat_reduction: f32) -> f32 {
    let base = if hard { 9.0 } else { 7.0 };
    (base + (weapon_level.max(1) - 1) as f32 * 1.4) * (1.0 - overheat_reduction)
}

/// Passive heat loss per second
pub fn heat_decay(hard: bool) -> f32 {
    if hard { 34.0 } else { 40.0 }
}

pub fn fire_cooldown(hard: bool) -> f32 {
    if hard { 0.11 } else { 0.09 }
}

/// Angular offsets (degrees from straight up) for each weapon level
pub fn fan_offsets(weapon_level: u8) -> &'static [f32] {
    match weapon_level {
        0 | 1 => &[0.0],
        2 => &[-4.0, 4.0],
        3 => &[-8.0, 0.0, 8.0],
        4 => &[-12.0, -4.0, 4.0, 12.0],
        _ => &[-16.0, -8.0, 0.0, 8.0, 16.0],
    }
}

pub fn bullet_damage(weapon_level: u8) -> i32 {
    2 + (weapon_level.max(1) as i32 - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_wave_enemy_count() {
        assert_eq!(wave_enemy_count(1, false), 8);
        assert_eq!(wave_enemy_count(1, true), 10);
        assert_eq!(wave_enemy_count(4, false), 14);
    }

    #[test]
    fn test_boss_hp_scaling() {
        assert_eq!(boss_hp_max(1, false), 420);
        assert_eq!(boss_hp_max(2, false), 525);
        assert_eq!(boss_hp_max(3, true), 780);
        assert_eq!(boss_hp_max(5, true), 1040);
    }

    #[test]
    fn test_petal_count() {
        assert_eq!(petal_count(3, true, 1.0), 14);
        assert_eq!(petal_count(1, false, 1.0), 8);
        // More petals as the boss weakens
        assert!(petal_count(1, false, 0.1) > petal_count(1, false, 1.0));
    }

    #[test]
    fn test_petal_speed_rises_as_hp_drops() {
        assert!(petal_speed(2, false, 0.2) > petal_speed(2, false, 0.9));
        assert_eq!(petal_speed(1, false, 1.0), 160.0);
    }

    #[test]
    fn test_boss_wave() {
        assert_eq!(boss_wave(1), 6);
        assert_eq!(boss_wave(5), 10);
    }

    #[test]
    fn test_heat_cost() {
        assert_eq!(heat_cost(false, 1, 0.0), 7.0);
        assert_eq!(heat_cost(true, 1, 0.0), 9.0);
        assert!((heat_cost(false, 3, 0.0) - 9.8).abs() < 1e-5);
        assert!((heat_cost(false, 1, 0.5) - 3.5).abs() < 1e-5);
    }

    #[test]
    fn test_fan_and_damage() {
        for level in 1..=5u8 {
            assert_eq!(fan_offsets(level).len(), level as usize);
            assert_eq!(bullet_damage(level), 1 + level as i32);
        }
    }

    #[test]
    fn test_level_one_roster() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..500 {
            let kind = roll_kind(&mut rng, 1);
            assert!(matches!(
                kind,
                EnemyKind::Drone | EnemyKind::Swooper | EnemyKind::Zigzag | EnemyKind::Shooter
            ));
        }
    }

    #[test]
    fn test_scaled_stats_hard_mode_tougher() {
        let normal = scaled_stats(EnemyKind::Tank, 2, 3, false);
        let hard = scaled_stats(EnemyKind::Tank, 2, 3, true);
        assert!(hard.hp > normal.hp);
        assert!(hard.speed > normal.speed);
        assert!(hard.fire_interval < normal.fire_interval);
    }
}
