//! Wave/boss director and hostile AI
//!
//! The director decides when a wave spawns, when the level escalates to its
//! boss, and hands off to the host once the boss is down. Enemy and boss
//! movement/firing live here too since they are driven by the same tables.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::state::{
    Boss, BossPhase, DirectorState, Enemy, EnemyBullet, EnemyKind, GameState, Maneuver,
    RingElement,
};
use super::tables::*;
use crate::consts::*;
use crate::{direction_or_zero, rand_range};

/// Banner time for wave/boss announcements
pub const WAVE_MESSAGE_SECS: f32 = 2.0;
const ENEMY_BULLET_RADIUS: f32 = 5.0;
/// Kamikazes commit after this long on the field
const KAMIKAZE_LOCK_DELAY: f32 = 0.8;

impl GameState {
    /// Spawn wave `n` (also used by dev tooling)
    pub fn spawn_wave(&mut self, wave: u32) {
        spawn_wave(self, wave);
    }

    /// Spawn this level's boss (also used by dev tooling)
    pub fn spawn_boss(&mut self) {
        spawn_boss(self);
    }
}

/// One director step: spawn the next wave or the boss once the field is clear
pub fn run(state: &mut GameState) {
    match state.director {
        DirectorState::SpawningWave | DirectorState::ClearingWave => {
            if state.enemies.is_empty() && !state.boss_defeated && state.boss.is_none() {
                let next = state.wave + 1;
                if next >= boss_wave(state.level) {
                    state.wave = next;
                    spawn_boss(state);
                } else {
                    spawn_wave(state, next);
                }
            }
        }
        DirectorState::BossFight | DirectorState::BossDefeated | DirectorState::LevelComplete => {}
    }
}

pub fn spawn_wave(state: &mut GameState, wave: u32) {
    let hard = state.config.hard_mode;
    let count = wave_enemy_count(wave, hard);
    state.wave = wave;

    let mut y = 0.0;
    for _ in 0..count {
        let kind = roll_kind(&mut state.rng, state.level);
        let radius = base_stats(kind).radius;
        y -= radius + rand_range(&mut state.rng, 40.0, 75.0);
        let x = rand_range(
            &mut state.rng,
            FIELD_MARGIN + radius,
            FIELD_WIDTH - FIELD_MARGIN - radius,
        );
        spawn_enemy(state, kind, Vec2::new(x, y));
    }

    state.director = DirectorState::ClearingWave;
    state.wave_message = WAVE_MESSAGE_SECS;
    log::info!(
        "Level {} wave {}: {} enemies (hard={})",
        state.level,
        wave,
        count,
        hard
    );
}

/// Create one enemy of `kind` at `pos` with current level/wave scaling
pub fn spawn_enemy(state: &mut GameState, kind: EnemyKind, pos: Vec2) {
    let stats = scaled_stats(kind, state.level, state.wave, state.config.hard_mode);
    let rng = &mut state.rng;

    let mut vel = Vec2::new(0.0, stats.speed);
    let maneuver = match kind {
        EnemyKind::Drone | EnemyKind::Tank | EnemyKind::Splitter | EnemyKind::Bomber => {
            Maneuver::Dive
        }
        EnemyKind::Swooper | EnemyKind::Shooter => {
            let (lo, hi) = if kind == EnemyKind::Swooper {
                (40.0, 90.0)
            } else {
                (20.0, 40.0)
            };
            let amplitude = rand_range(rng, lo, hi);
            let edge = FIELD_MARGIN + stats.radius + amplitude;
            Maneuver::Sway {
                origin_x: pos.x.clamp(edge, (FIELD_WIDTH - edge).max(edge)),
                amplitude,
                frequency: rand_range(rng, 1.0, 2.5),
            }
        }
        EnemyKind::Zigzag => {
            let dir = if rng.random::<bool>() { 1.0 } else { -1.0 };
            vel.x = dir * stats.speed * 0.9;
            Maneuver::Bounce
        }
        EnemyKind::Kamikaze => Maneuver::Home { locked: false },
        EnemyKind::Sniper => Maneuver::Park {
            hold_y: rand_range(rng, 140.0, 320.0),
            dwell: 4.0,
        },
        EnemyKind::Orbiter => Maneuver::Orbit {
            anchor: pos,
            angle: rand_range(rng, 0.0, TAU),
            orbit_radius: rand_range(rng, 30.0, 50.0),
        },
        EnemyKind::Elite => Maneuver::Weave {
            phase: rand_range(rng, 0.0, TAU),
        },
    };

    let shoot_cooldown = stats
        .fire_interval
        .map(|f| f * rand_range(rng, 0.5, 1.0))
        .unwrap_or(0.0);

    state.enemies.push(Enemy {
        kind,
        maneuver,
        pos,
        vel,
        radius: stats.radius,
        hp: stats.hp,
        speed: stats.speed,
        age: 0.0,
        shoot_cooldown,
        fire_interval: stats.fire_interval,
        bullet_damage: stats.bullet_damage,
        bullet_speed: stats.bullet_speed,
        score: stats.score,
        contact_damage: stats.contact_damage,
        hue: stats.hue,
    });
}

pub fn spawn_boss(state: &mut GameState) {
    let hard = state.config.hard_mode;
    let level = state.level;
    let hp_max = boss_hp_max(level, hard);

    let ring = (0..BOSS_RING_ELEMENTS)
        .map(|i| RingElement {
            angle: i as f32 / BOSS_RING_ELEMENTS as f32 * TAU,
            intact: true,
        })
        .collect();

    state.boss = Some(Boss {
        pos: Vec2::new(FIELD_WIDTH / 2.0, -BOSS_RADIUS),
        vel: Vec2::new(0.0, BOSS_ENTRY_SPEED),
        radius: BOSS_RADIUS,
        hp: hp_max,
        hp_max,
        age: 0.0,
        shoot_cooldown: boss_shoot_cooldown(level, hard),
        beam_cooldown: 1.5,
        rage: 0.0,
        level,
        phase: BossPhase::Entering,
        volleys: 0,
        score: boss_score(level),
        ring,
    });
    state.director = DirectorState::BossFight;
    state.wave_message = WAVE_MESSAGE_SECS;
    log::info!(
        "Boss spawned: level {} wave {} hp_max {} petals {}",
        level,
        state.wave,
        hp_max,
        petal_count(level, hard, 1.0)
    );
}

/// Move every enemy, fire their weapons and drop the ones that left the field
pub fn update_enemies(state: &mut GameState, dt: f32) {
    let player_pos = state.player.pos;
    let mut shots: Vec<EnemyBullet> = Vec::new();

    for enemy in state.enemies.iter_mut() {
        enemy.age += dt;
        steer(enemy, player_pos, dt);

        let Some(interval) = enemy.fire_interval else {
            continue;
        };
        enemy.shoot_cooldown -= dt;
        let in_band = enemy.pos.y > 20.0 && enemy.pos.y < FIELD_HEIGHT * 0.75;
        if enemy.shoot_cooldown <= 0.0 && in_band {
            fire_enemy(enemy, player_pos, &mut shots);
            enemy.shoot_cooldown = interval * rand_range(&mut state.rng, 0.8, 1.2);
        }
    }

    state.enemy_bullets.extend(shots);
    state.enemies.retain(|e| {
        e.pos.y - e.radius <= FIELD_HEIGHT
            && e.pos.x > -100.0
            && e.pos.x < FIELD_WIDTH + 100.0
    });
}

fn steer(enemy: &mut Enemy, player_pos: Vec2, dt: f32) {
    let age = enemy.age;
    let radius = enemy.radius;
    match &mut enemy.maneuver {
        Maneuver::Dive => {
            enemy.pos += enemy.vel * dt;
        }
        Maneuver::Sway {
            origin_x,
            amplitude,
            frequency,
        } => {
            enemy.pos.y += enemy.vel.y * dt;
            enemy.pos.x = *origin_x + (age * *frequency).sin() * *amplitude;
        }
        Maneuver::Bounce => {
            enemy.pos += enemy.vel * dt;
            let lo = FIELD_MARGIN + radius;
            let hi = FIELD_WIDTH - FIELD_MARGIN - radius;
            if enemy.pos.x < lo || enemy.pos.x > hi {
                enemy.vel.x = -enemy.vel.x;
                enemy.pos.x = enemy.pos.x.clamp(lo, hi);
            }
        }
        Maneuver::Home { locked } => {
            if !*locked && age > KAMIKAZE_LOCK_DELAY && enemy.pos.y > 0.0 {
                *locked = true;
            }
            if *locked && enemy.pos.y < player_pos.y {
                let dir = direction_or_zero(enemy.pos, player_pos);
                enemy.vel += dir * enemy.speed * 3.0 * dt;
                enemy.vel = enemy.vel.clamp_length_max(enemy.speed * 2.2);
            }
            enemy.pos += enemy.vel * dt;
        }
        Maneuver::Park { hold_y, dwell } => {
            if *dwell > 0.0 && enemy.pos.y < *hold_y {
                enemy.pos.y += enemy.vel.y * dt;
            } else if *dwell > 0.0 {
                *dwell -= dt;
            } else {
                enemy.pos.y += enemy.vel.y * 1.5 * dt;
            }
        }
        Maneuver::Orbit {
            anchor,
            angle,
            orbit_radius,
        } => {
            anchor.y += enemy.vel.y * dt;
            *angle += 2.2 * dt;
            enemy.pos = *anchor + Vec2::new(angle.cos(), angle.sin()) * *orbit_radius;
        }
        Maneuver::Weave { phase } => {
            let cruise_y = 260.0;
            if enemy.pos.y < cruise_y {
                enemy.pos.y += enemy.vel.y * dt;
            } else {
                enemy.pos.y += enemy.vel.y * 0.25 * dt;
            }
            let swing = FIELD_WIDTH * 0.35;
            let target_x = FIELD_WIDTH / 2.0 + (age * 0.9 + *phase).sin() * swing;
            enemy.pos.x += (target_x - enemy.pos.x) * (3.0 * dt).min(1.0);
        }
    }
}

fn fire_enemy(enemy: &Enemy, player_pos: Vec2, out: &mut Vec<EnemyBullet>) {
    let aim = direction_or_zero(enemy.pos, player_pos);
    let down = Vec2::Y;
    let mut emit = |dir: Vec2| {
        out.push(EnemyBullet {
            pos: enemy.pos,
            vel: dir * enemy.bullet_speed,
            radius: ENEMY_BULLET_RADIUS,
            damage: enemy.bullet_damage,
            life: ENEMY_BULLET_LIFE,
            hue: enemy.hue,
        });
    };

    match enemy.kind {
        EnemyKind::Tank => emit(down),
        EnemyKind::Bomber => {
            for deg in [-18.0f32, 0.0, 18.0] {
                emit(Vec2::from_angle(deg.to_radians()).rotate(down));
            }
        }
        EnemyKind::Elite => {
            for deg in [-10.0f32, 0.0, 10.0] {
                emit(Vec2::from_angle(deg.to_radians()).rotate(aim));
            }
        }
        _ => emit(aim),
    }
}

/// Boss movement, petals, aimed bursts and beam telegraphs
pub fn update_boss(state: &mut GameState, dt: f32) {
    let hard = state.config.hard_mode;
    let player_pos = state.player.pos;
    let Some(boss) = state.boss.as_mut() else {
        return;
    };
    boss.age += dt;

    match boss.phase {
        BossPhase::Entering => {
            boss.vel = Vec2::new(0.0, BOSS_ENTRY_SPEED);
            boss.pos.y += BOSS_ENTRY_SPEED * dt;
            if boss.pos.y >= BOSS_ALTITUDE {
                boss.pos.y = BOSS_ALTITUDE;
                boss.phase = BossPhase::Hover;
                boss.age = 0.0;
            }
            state
                .effects
                .trail(boss.pos - Vec2::new(0.0, boss.radius), Vec2::new(0.0, -60.0), 0.0);
            return;
        }
        BossPhase::Hover => {}
    }

    let ratio = boss.hp_ratio();
    if ratio < BOSS_RAGE_THRESHOLD {
        boss.rage += dt;
    }
    let weave = 0.7 * (1.0 + boss.rage.min(4.0) * 0.15);
    let target = Vec2::new(
        FIELD_WIDTH / 2.0 + (boss.age * weave).sin() * FIELD_WIDTH * 0.3,
        BOSS_ALTITUDE + (boss.age * 1.3).sin() * 18.0,
    );
    boss.vel = (target - boss.pos) / dt.max(1e-6);
    boss.pos = target;

    // Petal volley (+ aimed burst once wounded)
    boss.shoot_cooldown -= dt;
    if boss.shoot_cooldown <= 0.0 {
        let petals = petal_count(boss.level, hard, ratio);
        let speed = petal_speed(boss.level, hard, ratio);
        let damage = boss_bullet_damage(hard);
        let base = boss.volleys as f32 * 0.21;
        for k in 0..petals {
            let a = base + k as f32 * TAU / petals as f32;
            state.enemy_bullets.push(EnemyBullet {
                pos: boss.pos,
                vel: Vec2::new(a.cos(), a.sin()) * speed,
                radius: ENEMY_BULLET_RADIUS + 1.0,
                damage,
                life: ENEMY_BULLET_LIFE,
                hue: 330.0,
            });
        }

        if ratio < BOSS_BURST_THRESHOLD {
            let aim = direction_or_zero(boss.pos, player_pos);
            let count = aimed_burst_count(hard);
            let mid = (count as f32 - 1.0) / 2.0;
            for k in 0..count {
                let offset = (k as f32 - mid) * 0.12;
                state.enemy_bullets.push(EnemyBullet {
                    pos: boss.pos,
                    vel: Vec2::from_angle(offset).rotate(aim) * speed * 1.35,
                    radius: ENEMY_BULLET_RADIUS,
                    damage,
                    life: ENEMY_BULLET_LIFE,
                    hue: 15.0,
                });
            }
        }

        boss.volleys += 1;
        boss.shoot_cooldown = boss_shoot_cooldown(boss.level, hard) * crate::lerp(1.0, 0.7, 1.0 - ratio);
    }

    // Beam telegraph
    if ratio < BOSS_BEAM_THRESHOLD {
        boss.beam_cooldown -= dt;
        if boss.beam_cooldown <= 0.0 {
            boss.beam_cooldown = beam_interval(boss.level);
            let x = player_pos.x;
            state
                .effects
                .schedule_beam(x, BEAM_HALF_WIDTH, beam_damage(hard), BEAM_TELEGRAPH);
            state.effects.add_shake(5.0);
            state.effects.popup(Vec2::new(x, 80.0), "WARNING", 0.0);
            log::debug!("Beam telegraphed at x={:.0}", x);
        }
    }

    let exhaust = boss.pos - Vec2::new(0.0, boss.radius * 0.8);
    state.effects.trail(exhaust, Vec2::new(0.0, -40.0), 330.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::SimConfig;

    fn state(hard: bool) -> GameState {
        GameState::new(
            42,
            SimConfig {
                hard_mode: hard,
                ..SimConfig::default()
            },
        )
    }

    #[test]
    fn test_wave_count_exact() {
        for hard in [false, true] {
            for wave in 1..5 {
                let mut s = state(hard);
                spawn_wave(&mut s, wave);
                assert_eq!(s.enemies.len() as u32, 6 + wave * 2 + if hard { 2 } else { 0 });
                assert_eq!(s.wave, wave);
                assert_eq!(s.director, DirectorState::ClearingWave);
            }
        }
    }

    #[test]
    fn test_wave_spawns_above_field() {
        let mut s = state(false);
        spawn_wave(&mut s, 3);
        assert!(s.enemies.iter().all(|e| e.pos.y < 0.0));
        assert!(s.enemies.iter().all(|e| e.pos.x >= FIELD_MARGIN && e.pos.x <= FIELD_WIDTH - FIELD_MARGIN));
    }

    #[test]
    fn test_director_escalates_to_boss() {
        let mut s = state(false);
        s.set_level(2);
        // Clear waves until the boss arrives
        for expected in 1..boss_wave(2) {
            run(&mut s);
            assert_eq!(s.wave, expected);
            assert!(s.boss.is_none());
            s.enemies.clear();
        }
        run(&mut s);
        assert_eq!(s.wave, 7);
        assert_eq!(s.director, DirectorState::BossFight);
        let boss = s.boss.as_ref().expect("boss should spawn");
        assert_eq!(boss.hp_max, 525);
        assert!(s.enemies.is_empty());

        // No new wave while the boss is up
        run(&mut s);
        assert!(s.enemies.is_empty());
    }

    #[test]
    fn test_no_wave_while_boss_defeat_pending() {
        let mut s = state(false);
        s.boss_defeated = true;
        s.director = DirectorState::BossDefeated;
        run(&mut s);
        assert!(s.enemies.is_empty());
        assert_eq!(s.wave, 0);
    }

    #[test]
    fn test_boss_stats_level_three_hard() {
        let mut s = state(true);
        s.set_level(3);
        spawn_boss(&mut s);
        let boss = s.boss.as_ref().unwrap();
        assert_eq!(boss.hp_max, 780);
        assert_eq!(petal_count(3, true, boss.hp_ratio()), 14);
    }

    #[test]
    fn test_boss_enters_then_fires_petals() {
        let mut s = state(false);
        spawn_boss(&mut s);
        let dt = SIM_DT;
        let mut ticks = 0;
        while s.boss.as_ref().unwrap().phase == BossPhase::Entering {
            update_boss(&mut s, dt);
            ticks += 1;
            assert!(ticks < 600);
        }
        assert!(s.enemy_bullets.is_empty());
        for _ in 0..120 {
            update_boss(&mut s, dt);
        }
        // Full-hp level 1 volley is 8 petals
        assert!(s.enemy_bullets.len() >= 8);
        assert_eq!(s.enemy_bullets.len() % 8, 0);
    }

    #[test]
    fn test_wounded_boss_adds_burst_and_beam() {
        let mut s = state(false);
        spawn_boss(&mut s);
        {
            let boss = s.boss.as_mut().unwrap();
            boss.phase = BossPhase::Hover;
            boss.hp = boss.hp_max / 2;
            boss.shoot_cooldown = 0.0;
            boss.beam_cooldown = 0.0;
        }
        update_boss(&mut s, SIM_DT);
        let petals = petal_count(1, false, 0.5) as usize;
        assert_eq!(s.enemy_bullets.len(), petals + 2);
        assert_eq!(s.effects.pending.len(), 1);
    }

    #[test]
    fn test_enemies_leave_through_bottom() {
        let mut s = state(false);
        spawn_enemy(&mut s, EnemyKind::Drone, Vec2::new(100.0, FIELD_HEIGHT + 10.0));
        s.enemies[0].pos.y = FIELD_HEIGHT + 40.0;
        update_enemies(&mut s, SIM_DT);
        assert!(s.enemies.is_empty());
    }

    #[test]
    fn test_tank_fires_downward() {
        let mut s = state(false);
        spawn_enemy(&mut s, EnemyKind::Tank, Vec2::new(200.0, 200.0));
        s.enemies[0].shoot_cooldown = 0.0;
        update_enemies(&mut s, SIM_DT);
        assert_eq!(s.enemy_bullets.len(), 1);
        assert!(s.enemy_bullets[0].vel.y > 0.0);
        assert!(s.enemy_bullets[0].vel.x.abs() < 1e-3);
    }
}
