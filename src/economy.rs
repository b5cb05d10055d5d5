//! Economy and progression hooks
//!
//! The simulation only talks to the outside world through [`Economy`]
//! (credits, upgrade values, dash cooldown) and [`LevelProgress`] (level
//! unlocks). `Wallet` and `UnlockedLevels` are the reference implementations
//! stored in the player profile.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_LEVEL;

/// Upgrade-derived player modifiers, applied at level start
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeValues {
    pub weapon_level: u8,
    pub speed_boost: f32,
    pub shield_max: f32,
    pub dash_enabled: bool,
    pub overheat_reduction: f32,
    /// Dash upgrade level, fed back into [`Economy::dash_cooldown`]
    pub dash_level: u32,
}

impl Default for UpgradeValues {
    fn default() -> Self {
        Self {
            weapon_level: 1,
            speed_boost: 1.0,
            shield_max: 100.0,
            dash_enabled: true,
            overheat_reduction: 0.0,
            dash_level: 0,
        }
    }
}

impl UpgradeValues {
    /// Replace out-of-range values with balanced defaults
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let mut v = self;
        if !(1..=5).contains(&v.weapon_level) {
            log::warn!("weapon_level {} out of range, using default", v.weapon_level);
            v.weapon_level = defaults.weapon_level;
        }
        if !v.speed_boost.is_finite() || v.speed_boost < 1.0 {
            log::warn!("speed_boost {} invalid, using default", v.speed_boost);
            v.speed_boost = defaults.speed_boost;
        }
        if !v.shield_max.is_finite() || v.shield_max <= 0.0 {
            log::warn!("shield_max {} invalid, using default", v.shield_max);
            v.shield_max = defaults.shield_max;
        }
        if !v.overheat_reduction.is_finite() || !(0.0..1.0).contains(&v.overheat_reduction) {
            log::warn!(
                "overheat_reduction {} invalid, using default",
                v.overheat_reduction
            );
            v.overheat_reduction = defaults.overheat_reduction;
        }
        v
    }
}

/// Credits and upgrade lookups owned by the host
pub trait Economy {
    fn add_credits(&mut self, amount: u32);
    fn game_values(&self) -> UpgradeValues;
    /// Dash recharge time for a dash upgrade level
    fn dash_cooldown(&self, dash_level: u32) -> f32;
}

/// Level unlock persistence owned by the host
pub trait LevelProgress {
    fn unlock_level(&mut self, level: u8);
    fn unlocked_levels(&self) -> Vec<u8>;

    fn is_unlocked(&self, level: u8) -> bool {
        self.unlocked_levels().contains(&level)
    }
}

/// Upgrade tracks sold in the shop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    Weapon,
    Speed,
    Shield,
    Dash,
    Cooling,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 5] = [
        UpgradeKind::Weapon,
        UpgradeKind::Speed,
        UpgradeKind::Shield,
        UpgradeKind::Dash,
        UpgradeKind::Cooling,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeKind::Weapon => "Weapon",
            UpgradeKind::Speed => "Speed",
            UpgradeKind::Shield => "Shield",
            UpgradeKind::Dash => "Dash",
            UpgradeKind::Cooling => "Cooling",
        }
    }

    pub fn max_level(&self) -> u32 {
        match self {
            UpgradeKind::Weapon | UpgradeKind::Shield => 4,
            UpgradeKind::Speed | UpgradeKind::Dash | UpgradeKind::Cooling => 5,
        }
    }

    /// Price of going from `current` to `current + 1`
    pub fn cost(&self, current: u32) -> u32 {
        let base = match self {
            UpgradeKind::Weapon => 400,
            UpgradeKind::Shield | UpgradeKind::Dash => 300,
            UpgradeKind::Speed | UpgradeKind::Cooling => 250,
        };
        base * (current + 1)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("{} upgrade is already at max level", .0.as_str())]
    MaxLevel(UpgradeKind),
    #[error("Not enough credits: need {needed}, have {available}")]
    InsufficientCredits { needed: u32, available: u32 },
}

/// Purchased levels per upgrade track
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeLevels {
    pub weapon: u32,
    pub speed: u32,
    pub shield: u32,
    pub dash: u32,
    pub cooling: u32,
}

impl UpgradeLevels {
    pub fn get(&self, kind: UpgradeKind) -> u32 {
        match kind {
            UpgradeKind::Weapon => self.weapon,
            UpgradeKind::Speed => self.speed,
            UpgradeKind::Shield => self.shield,
            UpgradeKind::Dash => self.dash,
            UpgradeKind::Cooling => self.cooling,
        }
    }

    fn get_mut(&mut self, kind: UpgradeKind) -> &mut u32 {
        match kind {
            UpgradeKind::Weapon => &mut self.weapon,
            UpgradeKind::Speed => &mut self.speed,
            UpgradeKind::Shield => &mut self.shield,
            UpgradeKind::Dash => &mut self.dash,
            UpgradeKind::Cooling => &mut self.cooling,
        }
    }
}

/// Credit balance plus purchased upgrades
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wallet {
    pub credits: u32,
    pub upgrades: UpgradeLevels,
}

impl Wallet {
    /// Buy the next level of `kind`, returning the new level
    pub fn purchase(&mut self, kind: UpgradeKind) -> Result<u32, PurchaseError> {
        let current = self.upgrades.get(kind);
        if current >= kind.max_level() {
            return Err(PurchaseError::MaxLevel(kind));
        }
        let needed = kind.cost(current);
        if self.credits < needed {
            return Err(PurchaseError::InsufficientCredits {
                needed,
                available: self.credits,
            });
        }
        self.credits -= needed;
        let level = self.upgrades.get_mut(kind);
        *level += 1;
        log::info!("Purchased {} level {} for {}", kind.as_str(), *level, needed);
        Ok(*level)
    }
}

impl Economy for Wallet {
    fn add_credits(&mut self, amount: u32) {
        self.credits = self.credits.saturating_add(amount);
    }

    fn game_values(&self) -> UpgradeValues {
        let u = &self.upgrades;
        UpgradeValues {
            weapon_level: (1 + u.weapon.min(UpgradeKind::Weapon.max_level())) as u8,
            speed_boost: 1.0 + 0.08 * u.speed as f32,
            shield_max: 100.0 + 25.0 * u.shield as f32,
            dash_enabled: true,
            overheat_reduction: 0.08 * u.cooling.min(UpgradeKind::Cooling.max_level()) as f32,
            dash_level: u.dash,
        }
    }

    fn dash_cooldown(&self, dash_level: u32) -> f32 {
        (1.6 - 0.2 * dash_level as f32).max(0.6)
    }
}

/// Set of unlocked levels; level 1 is always present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockedLevels(BTreeSet<u8>);

impl Default for UnlockedLevels {
    fn default() -> Self {
        Self(BTreeSet::from([1]))
    }
}

impl LevelProgress for UnlockedLevels {
    fn unlock_level(&mut self, level: u8) {
        let level = level.clamp(1, MAX_LEVEL);
        if self.0.insert(level) {
            log::info!("Unlocked level {}", level);
        }
    }

    fn unlocked_levels(&self) -> Vec<u8> {
        let mut levels: Vec<u8> = self.0.iter().copied().collect();
        if !levels.contains(&1) {
            levels.insert(0, 1);
        }
        levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values_are_balanced() {
        let v = Wallet::default().game_values();
        assert_eq!(v, UpgradeValues::default());
    }

    #[test]
    fn test_sanitize_falls_back() {
        let v = UpgradeValues {
            weapon_level: 9,
            speed_boost: f32::NAN,
            shield_max: -5.0,
            overheat_reduction: 1.5,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(v, UpgradeValues::default());
    }

    #[test]
    fn test_missing_fields_deserialize_to_defaults() {
        let v: UpgradeValues = serde_json::from_str(r#"{"weapon_level": 3}"#).unwrap();
        assert_eq!(v.weapon_level, 3);
        assert_eq!(v.shield_max, 100.0);
        assert!(v.dash_enabled);
    }

    #[test]
    fn test_purchase_flow() {
        let mut wallet = Wallet::default();
        assert_eq!(
            wallet.purchase(UpgradeKind::Weapon),
            Err(PurchaseError::InsufficientCredits {
                needed: 400,
                available: 0
            })
        );
        wallet.add_credits(5000);
        assert_eq!(wallet.purchase(UpgradeKind::Weapon), Ok(1));
        assert_eq!(wallet.purchase(UpgradeKind::Weapon), Ok(2));
        assert_eq!(wallet.credits, 5000 - 400 - 800);
        assert_eq!(wallet.game_values().weapon_level, 3);
    }

    #[test]
    fn test_purchase_max_level() {
        let mut wallet = Wallet {
            credits: 1_000_000,
            ..Default::default()
        };
        for _ in 0..UpgradeKind::Shield.max_level() {
            wallet.purchase(UpgradeKind::Shield).unwrap();
        }
        assert_eq!(
            wallet.purchase(UpgradeKind::Shield),
            Err(PurchaseError::MaxLevel(UpgradeKind::Shield))
        );
        assert_eq!(wallet.game_values().shield_max, 200.0);
    }

    #[test]
    fn test_dash_cooldown_floor() {
        let wallet = Wallet::default();
        assert!((wallet.dash_cooldown(0) - 1.6).abs() < 1e-6);
        assert!((wallet.dash_cooldown(5) - 0.6).abs() < 1e-6);
        assert!((wallet.dash_cooldown(50) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_unlocked_levels() {
        let mut levels = UnlockedLevels::default();
        assert_eq!(levels.unlocked_levels(), vec![1]);
        levels.unlock_level(3);
        levels.unlock_level(3);
        levels.unlock_level(42);
        assert_eq!(levels.unlocked_levels(), vec![1, 3, 5]);
        assert!(levels.is_unlocked(3));
        assert!(!levels.is_unlocked(2));
    }
}
