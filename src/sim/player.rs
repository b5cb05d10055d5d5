//! Player controller: movement, dash, weapon heat and damage intake

use glam::Vec2;

use super::state::{Bullet, Player, player_spawn};
use super::tables::*;
use crate::consts::*;
use crate::economy::UpgradeValues;

/// Result of pulling the trigger
#[derive(Debug, Clone, PartialEq)]
pub enum ShotOutcome {
    /// Cooldown running or weapon overheated
    Blocked,
    Fired {
        bullets: Vec<Bullet>,
        /// This shot pushed heat past the overheat threshold
        overheated: bool,
    },
}

/// What a hit did to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Invulnerable, nothing changed
    Ignored,
    /// Shield took the whole hit
    Absorbed,
    /// Shield broke, one life lost, player recentered
    LifeLost,
    /// Last life lost
    Killed,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        let defaults = UpgradeValues::default();
        Self {
            pos: player_spawn(),
            vel: Vec2::ZERO,
            radius: PLAYER_RADIUS,
            pickup_radius: PLAYER_PICKUP_RADIUS,
            shield: defaults.shield_max,
            shield_max: defaults.shield_max,
            lives: PLAYER_LIVES,
            fire_cooldown: 0.0,
            heat: 0.0,
            overheat_locked: false,
            dash_cooldown: 0.0,
            dash_timer: 0.0,
            inv: 0.0,
            weapon_level: defaults.weapon_level,
            speed_boost: defaults.speed_boost,
            dash_enabled: defaults.dash_enabled,
            dash_level: defaults.dash_level,
            overheat_reduction: defaults.overheat_reduction,
        }
    }

    /// Apply upgrade-derived modifiers. Idempotent; refills the shield.
    pub fn apply_upgrades(&mut self, values: &UpgradeValues) {
        self.weapon_level = values.weapon_level.clamp(1, 5);
        self.speed_boost = values.speed_boost.max(1.0);
        self.shield_max = values.shield_max;
        self.shield = self.shield_max;
        self.dash_enabled = values.dash_enabled;
        self.dash_level = values.dash_level;
        self.overheat_reduction = values.overheat_reduction;
    }

    pub fn is_invulnerable(&self) -> bool {
        self.inv > 0.0
    }

    /// Count down timers and cool the weapon.
    ///
    /// Returns true when this call cleared the overheat lock.
    pub fn update_timers(&mut self, dt: f32, hard: bool) -> bool {
        self.fire_cooldown = (self.fire_cooldown - dt).max(0.0);
        self.dash_cooldown = (self.dash_cooldown - dt).max(0.0);
        self.dash_timer = (self.dash_timer - dt).max(0.0);
        self.inv = (self.inv - dt).max(0.0);

        self.heat = (self.heat - heat_decay(hard) * dt).clamp(0.0, HEAT_MAX);
        if self.overheat_locked && self.heat <= 0.0 {
            self.overheat_locked = false;
            return true;
        }
        false
    }

    /// Integrate movement from a normalized intent vector
    pub fn integrate(&mut self, intent: Vec2, dt: f32, hard: bool) {
        let intent = intent.clamp_length_max(1.0);
        let accel = intent * base_accel(hard) * self.speed_boost;
        self.vel = (self.vel + accel * dt) * FRICTION;

        let cap = if self.dash_timer > 0.0 {
            DASH_SPEED * self.speed_boost
        } else {
            max_speed(hard) * self.speed_boost
        };
        self.vel = self.vel.clamp_length_max(cap);

        self.pos += self.vel * dt;
        self.pos.x = self.pos.x.clamp(FIELD_MARGIN, FIELD_WIDTH - FIELD_MARGIN);
        self.pos.y = self.pos.y.clamp(FIELD_MARGIN, FIELD_HEIGHT - FIELD_MARGIN);
    }

    /// Burst along the intent (or straight up when idle).
    ///
    /// `cooldown` is the upgrade-dependent recharge time.
    pub fn try_dash(&mut self, intent: Vec2, cooldown: f32) -> bool {
        if !self.dash_enabled || self.dash_cooldown > 0.0 {
            return false;
        }
        let dir = if intent.length_squared() > 1e-6 {
            intent.normalize()
        } else {
            Vec2::NEG_Y
        };
        self.vel = dir * DASH_SPEED * self.speed_boost;
        self.dash_timer = DASH_DURATION;
        self.inv = self.inv.max(DASH_INVULNERABILITY);
        self.dash_cooldown = cooldown;
        true
    }

    /// Fire the weapon fan if cooldown and heat allow
    pub fn shoot(&mut self, hard: bool) -> ShotOutcome {
        if self.overheat_locked || self.fire_cooldown > 0.0 {
            return ShotOutcome::Blocked;
        }

        let damage = bullet_damage(self.weapon_level);
        let muzzle = self.pos - Vec2::new(0.0, self.radius);
        let bullets = fan_offsets(self.weapon_level)
            .iter()
            .map(|deg| {
                let a = deg.to_radians();
                Bullet {
                    pos: muzzle,
                    vel: Vec2::new(a.sin(), -a.cos()) * BULLET_SPEED,
                    radius: BULLET_RADIUS,
                    damage,
                    life: BULLET_LIFE,
                    hue: 55.0 + *deg,
                }
            })
            .collect();

        self.fire_cooldown = fire_cooldown(hard);
        self.heat = (self.heat + heat_cost(hard, self.weapon_level, self.overheat_reduction))
            .clamp(0.0, HEAT_MAX);

        let overheated = self.heat >= OVERHEAT_THRESHOLD;
        if overheated {
            self.overheat_locked = true;
        }
        ShotOutcome::Fired {
            bullets,
            overheated,
        }
    }

    /// Shield absorbs first; overflow costs a life
    pub fn take_damage(&mut self, dmg: f32) -> DamageOutcome {
        if self.is_invulnerable() || self.lives == 0 {
            return DamageOutcome::Ignored;
        }
        if dmg <= self.shield {
            self.shield = (self.shield - dmg).clamp(0.0, self.shield_max);
            return DamageOutcome::Absorbed;
        }

        self.lives = self.lives.saturating_sub(1);
        self.shield = self.shield_max;
        self.pos = player_spawn();
        self.vel = Vec2::ZERO;
        self.inv = RESPAWN_INVULNERABILITY;

        if self.lives == 0 {
            DamageOutcome::Killed
        } else {
            DamageOutcome::LifeLost
        }
    }

    /// Restore shield from a pickup
    pub fn restore_shield(&mut self, amount: f32) {
        self.shield = (self.shield + amount).clamp(0.0, self.shield_max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DT: f32 = SIM_DT;

    #[test]
    fn test_single_shot_costs_heat() {
        let mut p = Player::new();
        match p.shoot(false) {
            ShotOutcome::Fired {
                bullets,
                overheated,
            } => {
                assert_eq!(bullets.len(), 1);
                assert_eq!(bullets[0].damage, 2);
                assert!(!overheated);
            }
            ShotOutcome::Blocked => panic!("first shot should fire"),
        }
        assert_eq!(p.heat, 7.0);
        assert!(!p.overheat_locked);
    }

    #[test]
    fn test_fire_cooldown_blocks() {
        let mut p = Player::new();
        assert!(matches!(p.shoot(false), ShotOutcome::Fired { .. }));
        assert_eq!(p.shoot(false), ShotOutcome::Blocked);
    }

    #[test]
    fn test_overheat_lock_and_recovery() {
        let mut p = Player::new();
        let mut shots = 0;
        while !p.overheat_locked {
            p.fire_cooldown = 0.0;
            assert!(matches!(p.shoot(false), ShotOutcome::Fired { .. }));
            shots += 1;
        }
        assert_eq!(shots, 15);
        assert!(p.heat >= 100.0 && p.heat <= HEAT_MAX);

        // Locked until heat reaches 0
        p.fire_cooldown = 0.0;
        assert_eq!(p.shoot(false), ShotOutcome::Blocked);

        let mut cleared = false;
        for _ in 0..600 {
            if p.update_timers(DT, false) {
                cleared = true;
                break;
            }
            assert!(p.heat > 0.0);
            assert_eq!(p.shoot(false), ShotOutcome::Blocked);
        }
        assert!(cleared);
        assert_eq!(p.heat, 0.0);
        assert!(matches!(p.shoot(false), ShotOutcome::Fired { .. }));
    }

    #[test]
    fn test_weapon_fan() {
        let mut p = Player::new();
        p.weapon_level = 5;
        match p.shoot(false) {
            ShotOutcome::Fired { bullets, .. } => {
                assert_eq!(bullets.len(), 5);
                assert!(bullets.iter().all(|b| b.damage == 6));
                assert!(bullets.iter().all(|b| b.vel.y < 0.0));
            }
            ShotOutcome::Blocked => panic!("should fire"),
        }
    }

    #[test]
    fn test_shield_absorbs_first() {
        let mut p = Player::new();
        assert_eq!(p.take_damage(30.0), DamageOutcome::Absorbed);
        assert_eq!(p.shield, 70.0);
        assert_eq!(p.lives, 3);
    }

    #[test]
    fn test_overflow_costs_life() {
        let mut p = Player::new();
        p.shield = 10.0;
        p.pos = Vec2::new(40.0, 40.0);
        assert_eq!(p.take_damage(30.0), DamageOutcome::LifeLost);
        assert_eq!(p.lives, 2);
        assert_eq!(p.shield, p.shield_max);
        assert_eq!(p.pos, player_spawn());
        assert_eq!(p.inv, RESPAWN_INVULNERABILITY);
    }

    #[test]
    fn test_invulnerability_ignores_damage() {
        let mut p = Player::new();
        p.inv = 0.5;
        for _ in 0..5 {
            assert_eq!(p.take_damage(500.0), DamageOutcome::Ignored);
        }
        assert_eq!(p.shield, 100.0);
        assert_eq!(p.lives, 3);
    }

    #[test]
    fn test_last_life_kills() {
        let mut p = Player::new();
        p.lives = 1;
        p.shield = 0.0;
        assert_eq!(p.take_damage(1.0), DamageOutcome::Killed);
        assert_eq!(p.lives, 0);
    }

    #[test]
    fn test_dash_requires_enabled_and_ready() {
        let mut p = Player::new();
        p.dash_enabled = false;
        assert!(!p.try_dash(Vec2::X, 1.0));

        p.dash_enabled = true;
        assert!(p.try_dash(Vec2::ZERO, 1.2));
        assert!(p.vel.y < 0.0);
        assert!(p.inv >= DASH_INVULNERABILITY);
        assert_eq!(p.dash_cooldown, 1.2);
        assert!(!p.try_dash(Vec2::X, 1.2));
    }

    #[test]
    fn test_movement_stays_in_field() {
        let mut p = Player::new();
        for _ in 0..600 {
            p.integrate(Vec2::new(-1.0, -1.0), DT, false);
        }
        assert_eq!(p.pos.x, FIELD_MARGIN);
        assert_eq!(p.pos.y, FIELD_MARGIN);
        assert!(p.vel.length() <= max_speed(false) + 1e-3);
    }

    #[test]
    fn test_apply_upgrades_idempotent() {
        let values = UpgradeValues {
            weapon_level: 3,
            speed_boost: 1.2,
            shield_max: 150.0,
            ..Default::default()
        };
        let mut a = Player::new();
        a.apply_upgrades(&values);
        let snapshot = (a.weapon_level, a.speed_boost, a.shield, a.shield_max);
        a.apply_upgrades(&values);
        assert_eq!(snapshot, (a.weapon_level, a.speed_boost, a.shield, a.shield_max));
        assert_eq!(a.shield, 150.0);
    }

    proptest! {
        #[test]
        fn prop_heat_and_shield_stay_clamped(
            actions in proptest::collection::vec((0u8..3, 0.0f32..80.0), 1..200),
            hard in any::<bool>(),
        ) {
            let mut p = Player::new();
            p.weapon_level = 5;
            for (action, amount) in actions {
                match action {
                    0 => { p.fire_cooldown = 0.0; let _ = p.shoot(hard); }
                    1 => { p.update_timers(DT, hard); }
                    _ => { p.inv = 0.0; let _ = p.take_damage(amount); }
                }
                prop_assert!(p.heat >= 0.0 && p.heat <= HEAT_MAX);
                prop_assert!(p.shield >= 0.0 && p.shield <= p.shield_max);
                if p.overheat_locked {
                    prop_assert!(p.heat > 0.0);
                }
            }
        }
    }
}
