//! Combat resolver
//!
//! Pure circle-circle tests re-evaluated from scratch every tick. The phases
//! run in a fixed order:
//! 1. enemy bodies vs player
//! 2. enemy bullets vs player
//! 3. pickups vs player collect radius
//! 4. player bullets vs boss
//! 5. player bullets vs enemies

use glam::Vec2;
use rand::Rng;

use super::director::spawn_enemy;
use super::effects::MAX_SHAKE;
use super::player::DamageOutcome;
use super::state::{DirectorState, Enemy, EnemyKind, GameState, Pickup, PickupKind};
use super::tables::{PICKUP_DROP_CHANCE, SHIELD_PICKUP_AMOUNT};
use crate::consts::MAX_LEVEL;
use crate::economy::{Economy, LevelProgress};

const PICKUP_RADIUS: f32 = 10.0;
const PICKUP_FALL_SPEED: f32 = 90.0;

/// Two circles collide iff the distance between centers is strictly less
/// than the sum of their radii
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

impl GameState {
    /// Apply damage to the player with all feedback effects
    pub fn damage_player(&mut self, dmg: f32) -> DamageOutcome {
        let pos = self.player.pos;
        let outcome = self.player.take_damage(dmg);
        match outcome {
            DamageOutcome::Ignored => {}
            DamageOutcome::Absorbed => {
                self.effects.add_shake(4.0);
                self.effects.explosion(pos, 200.0, 6, 120.0);
            }
            DamageOutcome::LifeLost | DamageOutcome::Killed => {
                self.effects.explosion(pos, 15.0, 40, 320.0);
                self.effects.add_shake(12.0);
                self.effects.add_hit_stop(0.08);
                self.effects.popup(pos, "SHIELD BROKEN", 0.0);
            }
        }
        if outcome == DamageOutcome::Killed {
            self.dead = true;
            log::info!(
                "Player destroyed on level {} wave {} (score {})",
                self.level,
                self.wave,
                self.score
            );
        }
        outcome
    }
}

/// Run every collision phase in order
pub fn resolve<H>(state: &mut GameState, host: &mut H)
where
    H: Economy + LevelProgress + ?Sized,
{
    enemy_contacts(state);
    enemy_bullet_hits(state);
    collect_pickups(state);
    bullets_vs_boss(state, host);
    bullets_vs_enemies(state, host);
}

fn enemy_contacts(state: &mut GameState) {
    let (pp, pr) = (state.player.pos, state.player.radius);
    let mut rammed = Vec::new();
    state.enemies.retain(|e| {
        if circles_overlap(e.pos, e.radius, pp, pr) {
            rammed.push((e.pos, e.hue, e.contact_damage));
            false
        } else {
            true
        }
    });

    for (pos, hue, damage) in rammed {
        state.effects.explosion(pos, hue, 18, 220.0);
        state.damage_player(damage);
    }
}

fn enemy_bullet_hits(state: &mut GameState) {
    let (pp, pr) = (state.player.pos, state.player.radius);
    let mut hits = Vec::new();
    state.enemy_bullets.retain(|b| {
        if circles_overlap(b.pos, b.radius, pp, pr) {
            hits.push(b.damage);
            false
        } else {
            true
        }
    });

    for damage in hits {
        state.damage_player(damage);
    }
}

fn collect_pickups(state: &mut GameState) {
    let (pp, reach) = (state.player.pos, state.player.pickup_radius);
    let mut collected = Vec::new();
    state.pickups.retain(|p| {
        if circles_overlap(p.pos, p.radius, pp, reach) {
            collected.push(p.kind);
            false
        } else {
            true
        }
    });

    for kind in collected {
        match kind {
            PickupKind::Shield => {
                state.player.restore_shield(SHIELD_PICKUP_AMOUNT);
                state.effects.popup(pp, "+SHIELD", 190.0);
                log::debug!("Shield pickup, shield now {:.0}", state.player.shield);
            }
        }
    }
}

fn bullets_vs_boss<H>(state: &mut GameState, host: &mut H)
where
    H: Economy + LevelProgress + ?Sized,
{
    let Some(boss) = state.boss.as_mut() else {
        return;
    };

    let mut sparks = Vec::new();
    state.bullets.retain(|b| {
        if boss.hp > 0 && circles_overlap(b.pos, b.radius, boss.pos, boss.radius) {
            boss.hp -= b.damage;
            sparks.push(b.pos);
            false
        } else {
            true
        }
    });
    if sparks.is_empty() {
        return;
    }

    // Shatter ring elements in step with lost hp
    let intact_target =
        (boss.hp_ratio() * boss.ring.len() as f32).ceil() as usize;
    let mut shattered = Vec::new();
    for (i, element) in boss.ring.iter_mut().enumerate() {
        if element.intact && i >= intact_target {
            element.intact = false;
            shattered.push(boss.pos + Vec2::from_angle(element.angle) * boss.radius);
        }
    }
    let dead = boss.hp <= 0;

    for pos in sparks {
        state.effects.explosion(pos, 50.0, 3, 140.0);
    }
    for pos in shattered {
        state.effects.explosion(pos, 280.0, 12, 200.0);
        state.effects.add_shake(3.0);
    }

    if dead {
        kill_boss(state, host);
    }
}

fn kill_boss<H>(state: &mut GameState, host: &mut H)
where
    H: Economy + LevelProgress + ?Sized,
{
    let Some(boss) = state.boss.take() else {
        return;
    };

    state.score += boss.score;
    host.add_credits(boss.score);
    if boss.level < MAX_LEVEL {
        host.unlock_level(boss.level + 1);
        log::info!("Level {} unlocked", boss.level + 1);
    }
    state.boss_defeated = true;
    state.director = DirectorState::BossDefeated;

    // Board clear
    for bullet in std::mem::take(&mut state.enemy_bullets) {
        state.effects.explosion(bullet.pos, bullet.hue, 2, 60.0);
    }
    state.effects.cancel_pending();

    state.effects.explosion(boss.pos, 330.0, 80, 420.0);
    state.effects.add_shake(MAX_SHAKE);
    state.effects.add_hit_stop(0.10);
    state
        .effects
        .popup(boss.pos, format!("+{}", boss.score), 55.0);
    log::info!(
        "Boss defeated: level {} (+{} score, total {})",
        boss.level,
        boss.score,
        state.score
    );
}

fn bullets_vs_enemies<H>(state: &mut GameState, host: &mut H)
where
    H: Economy + LevelProgress + ?Sized,
{
    if state.enemies.is_empty() {
        return;
    }

    let enemies = &mut state.enemies;
    let mut sparks = Vec::new();
    state.bullets.retain(|b| {
        let target = enemies
            .iter_mut()
            .find(|e| e.hp > 0 && circles_overlap(b.pos, b.radius, e.pos, e.radius));
        match target {
            Some(enemy) => {
                enemy.hp -= b.damage;
                sparks.push((b.pos, enemy.hue));
                false
            }
            None => true,
        }
    });

    for (pos, hue) in sparks {
        state.effects.explosion(pos, hue, 3, 120.0);
    }

    let (killed, alive): (Vec<Enemy>, Vec<Enemy>) =
        std::mem::take(&mut state.enemies).into_iter().partition(|e| e.hp <= 0);
    state.enemies = alive;

    for enemy in killed {
        on_enemy_killed(state, host, enemy);
    }
}

fn on_enemy_killed<H>(state: &mut GameState, host: &mut H, enemy: Enemy)
where
    H: Economy + LevelProgress + ?Sized,
{
    state.score += enemy.score;
    host.add_credits(enemy.score);

    state.effects.explosion(enemy.pos, enemy.hue, 22, 260.0);
    state
        .effects
        .popup(enemy.pos, format!("+{}", enemy.score), enemy.hue);
    if enemy.kind.is_heavy() {
        state.effects.add_shake(6.0);
        state.effects.add_hit_stop(0.03);
    } else {
        state.effects.add_shake(2.0);
    }

    if state.rng.random::<f32>() < PICKUP_DROP_CHANCE {
        state.pickups.push(Pickup {
            kind: PickupKind::Shield,
            pos: enemy.pos,
            vel: Vec2::new(0.0, PICKUP_FALL_SPEED),
            radius: PICKUP_RADIUS,
            age: 0.0,
        });
    }

    if enemy.kind == EnemyKind::Splitter {
        for dx in [-14.0, 14.0] {
            spawn_enemy(state, EnemyKind::Drone, enemy.pos + Vec2::new(dx, 0.0));
        }
    }
}
