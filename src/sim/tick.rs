//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use glam::Vec2;

use super::collision;
use super::director;
use super::player::ShotOutcome;
use super::state::GameState;
use crate::consts::*;
use crate::dist_to_segment;
use crate::economy::{Economy, LevelProgress};

/// Input snapshot for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Movement intent, magnitude <= 1 (keyboard or gamepad, normalized by the caller)
    pub intent: Vec2,
    /// Fire button held
    pub shoot: bool,
    /// Dash button went down this tick
    pub dash: bool,
}

/// What the host needs to know after a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Player lost the last life this tick. Reported exactly once per run.
    pub ended: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick<H>(state: &mut GameState, input: &TickInput, dt: f32, host: &mut H) -> TickOutcome
where
    H: Economy + LevelProgress + ?Sized,
{
    // Hit-stop freezes everything but its own timer
    if state.effects.hit_stop > 0.0 {
        state.effects.hit_stop = (state.effects.hit_stop - dt).max(0.0);
        return TickOutcome::default();
    }
    if state.dead {
        return TickOutcome::default();
    }

    let hard = state.config.hard_mode;
    state.time += dt;
    state.wave_message = (state.wave_message - dt).max(0.0);

    // Timers
    if state.player.update_timers(dt, hard) {
        log::debug!("Overheat cleared");
    }

    // Player
    update_player(state, input, dt, host);

    // Hostiles
    director::update_enemies(state, dt);
    director::update_boss(state, dt);

    // Projectiles and pickups
    move_projectiles(state, dt);

    // Collisions
    collision::resolve(state, host);

    // Waves
    director::run(state);

    // Effects (beam detonations resolve here)
    for det in state.effects.advance_pending(dt) {
        state.effects.add_shake(10.0);
        state.effects.explosion(Vec2::new(det.x, state.player.pos.y), 0.0, 24, 300.0);
        let beam_top = Vec2::new(det.x, 0.0);
        let beam_bottom = Vec2::new(det.x, FIELD_HEIGHT);
        let dist = dist_to_segment(state.player.pos, beam_top, beam_bottom);
        if dist < det.half_width + state.player.radius {
            log::debug!("Beam hit player for {}", det.damage);
            state.damage_player(det.damage);
        }
    }
    state.effects.decay(dt);

    let ended = state.dead && !state.end_reported;
    if ended {
        state.end_reported = true;
    }
    TickOutcome { ended }
}

fn update_player<H>(state: &mut GameState, input: &TickInput, dt: f32, host: &mut H)
where
    H: Economy + LevelProgress + ?Sized,
{
    let hard = state.config.hard_mode;

    if input.dash {
        let cooldown = host.dash_cooldown(state.player.dash_level);
        if state.player.try_dash(input.intent, cooldown) {
            state.effects.explosion(state.player.pos, 190.0, 10, 160.0);
            log::debug!("Dash (cooldown {:.2}s)", cooldown);
        }
    }

    state.player.integrate(input.intent, dt, hard);

    if state.player.vel.length_squared() > 100.0 * 100.0 {
        let exhaust = state.player.pos + Vec2::new(0.0, state.player.radius);
        state.effects.trail(exhaust, Vec2::new(0.0, 120.0), 190.0);
    }

    if input.shoot {
        if let ShotOutcome::Fired {
            bullets,
            overheated,
        } = state.player.shoot(hard)
        {
            state.bullets.extend(bullets);
            if overheated {
                let pos = state.player.pos - Vec2::new(0.0, 30.0);
                state.effects.popup(pos, "OVERHEAT", 10.0);
                log::debug!("Overheat locked at heat {:.1}", state.player.heat);
            }
        }
    }
}

fn move_projectiles(state: &mut GameState, dt: f32) {
    const PAD: f32 = 40.0;
    let in_field = |p: Vec2, r: f32| {
        p.x + r > -PAD && p.x - r < FIELD_WIDTH + PAD && p.y + r > -PAD && p.y - r < FIELD_HEIGHT + PAD
    };

    for b in state.bullets.iter_mut() {
        b.pos += b.vel * dt;
        b.life -= dt;
    }
    state.bullets.retain(|b| b.life > 0.0 && in_field(b.pos, b.radius));

    for b in state.enemy_bullets.iter_mut() {
        b.pos += b.vel * dt;
        b.life -= dt;
    }
    state
        .enemy_bullets
        .retain(|b| b.life > 0.0 && in_field(b.pos, b.radius));

    for p in state.pickups.iter_mut() {
        p.pos += p.vel * dt;
        p.age += dt;
    }
    state.pickups.retain(|p| p.pos.y - p.radius <= FIELD_HEIGHT);
}

/// Fixed-timestep accumulator for the host loop
#[derive(Debug, Clone)]
pub struct FixedClock {
    step: f32,
    accumulator: f32,
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::new(SIM_DT)
    }
}

impl FixedClock {
    pub fn new(step: f32) -> Self {
        Self {
            step,
            accumulator: 0.0,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Feed one real frame; returns how many ticks to run
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);
        let mut steps = 0;
        while self.accumulator >= self.step && steps < MAX_SUBSTEPS {
            self.accumulator -= self.step;
            steps += 1;
        }
        // Drop the backlog instead of spiralling
        if steps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(self.step);
        }
        steps
    }

    /// Fraction of a step left in the accumulator (for render interpolation)
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }
}
