//! Effects bus
//!
//! Particles, popups, screen shake and hit-stop. None of this feeds back into
//! collisions or scoring, with two exceptions handled by the tick: hit-stop
//! suspends the simulation, and telegraphed beams detonate from the pending
//! queue at a fixed phase.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::SimConfig;
use crate::rand_range;

/// Screen shake cap (pixels)
pub const MAX_SHAKE: f32 = 18.0;
/// Screen shake linear decay per second
pub const SHAKE_DECAY: f32 = 28.0;
/// Accumulated hit-stop cap (seconds)
pub const MAX_HIT_STOP: f32 = 0.10;
/// Stream offset so cosmetic draws never touch the gameplay RNG
const EFFECTS_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds remaining
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
    pub hue: f32,
}

/// Floating text (score gains, warnings)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Popup {
    pub pos: Vec2,
    pub text: String,
    pub life: f32,
    pub hue: f32,
}

/// Deferred gameplay effect resolved by the tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PendingEffect {
    /// Full-height beam column that detonates when `timer` runs out
    BeamDetonation {
        x: f32,
        half_width: f32,
        damage: f32,
        timer: f32,
    },
}

/// A beam whose telegraph finished this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detonation {
    pub x: f32,
    pub half_width: f32,
    pub damage: f32,
}

#[derive(Debug, Clone)]
pub struct Effects {
    pub particles: Vec<Particle>,
    pub popups: Vec<Popup>,
    pub pending: Vec<PendingEffect>,
    pub shake: f32,
    /// Remaining global freeze (seconds)
    pub hit_stop: f32,
    max_particles: usize,
    shake_enabled: bool,
    hit_stop_enabled: bool,
    rng: Pcg32,
}

impl Effects {
    pub fn new(seed: u64, config: &SimConfig) -> Self {
        Self {
            particles: Vec::new(),
            popups: Vec::new(),
            pending: Vec::new(),
            shake: 0.0,
            hit_stop: 0.0,
            max_particles: config.max_particles,
            shake_enabled: config.shake_enabled,
            hit_stop_enabled: config.hit_stop_enabled,
            rng: Pcg32::seed_from_u64(seed ^ EFFECTS_STREAM),
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.popups.clear();
        self.pending.clear();
        self.shake = 0.0;
        self.hit_stop = 0.0;
    }

    /// Additive shake, capped
    pub fn add_shake(&mut self, amount: f32) {
        if !self.shake_enabled {
            return;
        }
        self.shake = (self.shake + amount).min(MAX_SHAKE);
    }

    /// Additive hit-stop, capped
    pub fn add_hit_stop(&mut self, secs: f32) {
        if !self.hit_stop_enabled {
            return;
        }
        self.hit_stop = (self.hit_stop + secs).min(MAX_HIT_STOP);
    }

    fn push_particle(&mut self, particle: Particle) {
        if self.particles.len() < self.max_particles {
            self.particles.push(particle);
        }
    }

    /// Radial burst of particles
    pub fn explosion(&mut self, pos: Vec2, hue: f32, count: usize, speed: f32) {
        for _ in 0..count {
            if self.particles.len() >= self.max_particles {
                break;
            }
            let angle = self.rng.random::<f32>() * std::f32::consts::TAU;
            let s = rand_range(&mut self.rng, speed * 0.3, speed);
            let life = rand_range(&mut self.rng, 0.35, 0.8);
            let size = rand_range(&mut self.rng, 1.5, 4.0);
            self.push_particle(Particle {
                pos,
                vel: Vec2::new(angle.cos(), angle.sin()) * s,
                life,
                max_life: life,
                size,
                hue,
            });
        }
    }

    /// Single short-lived exhaust particle
    pub fn trail(&mut self, pos: Vec2, drift: Vec2, hue: f32) {
        let jitter = rand_range(&mut self.rng, -12.0, 12.0);
        self.push_particle(Particle {
            pos,
            vel: drift + Vec2::new(jitter, 0.0),
            life: 0.25,
            max_life: 0.25,
            size: 2.0,
            hue,
        });
    }

    pub fn popup(&mut self, pos: Vec2, text: impl Into<String>, hue: f32) {
        self.popups.push(Popup {
            pos,
            text: text.into(),
            life: 0.9,
            hue,
        });
    }

    /// Queue a telegraphed beam
    pub fn schedule_beam(&mut self, x: f32, half_width: f32, damage: f32, delay: f32) {
        self.pending.push(PendingEffect::BeamDetonation {
            x,
            half_width,
            damage,
            timer: delay,
        });
    }

    /// Drop every queued beam (boss gone)
    pub fn cancel_pending(&mut self) {
        self.pending.clear();
    }

    /// Advance queued effects, returning the ones that fired this tick
    pub fn advance_pending(&mut self, dt: f32) -> Vec<Detonation> {
        let mut fired = Vec::new();
        self.pending.retain_mut(|effect| match effect {
            PendingEffect::BeamDetonation {
                x,
                half_width,
                damage,
                timer,
            } => {
                *timer -= dt;
                if *timer <= 0.0 {
                    fired.push(Detonation {
                        x: *x,
                        half_width: *half_width,
                        damage: *damage,
                    });
                    false
                } else {
                    true
                }
            }
        });
        fired
    }

    /// Decay particles, popups and shake
    pub fn decay(&mut self, dt: f32) {
        for p in self.particles.iter_mut() {
            p.pos += p.vel * dt;
            p.vel *= 0.96;
            p.life -= dt;
        }
        self.particles.retain(|p| p.life > 0.0);

        for popup in self.popups.iter_mut() {
            popup.pos.y -= 40.0 * dt;
            popup.life -= dt;
        }
        self.popups.retain(|p| p.life > 0.0);

        self.shake = (self.shake - SHAKE_DECAY * dt).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effects() -> Effects {
        Effects::new(1, &SimConfig::default())
    }

    #[test]
    fn test_shake_is_additive_and_capped() {
        let mut fx = effects();
        fx.add_shake(6.0);
        fx.add_shake(6.0);
        assert_eq!(fx.shake, 12.0);
        fx.add_shake(50.0);
        assert_eq!(fx.shake, MAX_SHAKE);
    }

    #[test]
    fn test_shake_decay() {
        let mut fx = effects();
        fx.add_shake(1.0);
        fx.decay(1.0 / 60.0);
        assert!((fx.shake - (1.0 - 28.0 / 60.0)).abs() < 1e-5);
        fx.decay(1.0);
        assert_eq!(fx.shake, 0.0);
    }

    #[test]
    fn test_hit_stop_cap() {
        let mut fx = effects();
        fx.add_hit_stop(0.08);
        fx.add_hit_stop(0.08);
        assert_eq!(fx.hit_stop, MAX_HIT_STOP);
    }

    #[test]
    fn test_particles_pruned() {
        let mut fx = effects();
        fx.explosion(Vec2::new(100.0, 100.0), 30.0, 20, 200.0);
        assert_eq!(fx.particles.len(), 20);
        for _ in 0..60 {
            fx.decay(1.0 / 60.0);
        }
        assert!(fx.particles.is_empty());
    }

    #[test]
    fn test_particle_cap_respected() {
        let config = SimConfig {
            max_particles: 5,
            ..SimConfig::default()
        };
        let mut fx = Effects::new(1, &config);
        fx.explosion(Vec2::ZERO, 0.0, 50, 100.0);
        assert_eq!(fx.particles.len(), 5);
    }

    #[test]
    fn test_beam_fires_after_telegraph() {
        let mut fx = effects();
        fx.schedule_beam(200.0, 36.0, 35.0, 0.5);
        assert!(fx.advance_pending(0.25).is_empty());
        let fired = fx.advance_pending(0.3);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].x, 200.0);
        assert!(fx.pending.is_empty());
    }

    #[test]
    fn test_shake_disabled() {
        let config = SimConfig {
            shake_enabled: false,
            ..SimConfig::default()
        };
        let mut fx = Effects::new(1, &config);
        fx.add_shake(10.0);
        assert_eq!(fx.shake, 0.0);
    }

    #[test]
    fn test_hit_stop_disabled() {
        let config = SimConfig {
            hit_stop_enabled: false,
            ..SimConfig::default()
        };
        let mut fx = Effects::new(1, &config);
        fx.add_hit_stop(0.08);
        assert_eq!(fx.hit_stop, 0.0);
    }
}
