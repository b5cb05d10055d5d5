//! Void Barrage - A vertical arcade shooter simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player, enemies, boss, collisions, waves)
//! - `economy`: Credit/upgrade/level-unlock hooks consumed by the simulation
//! - `persistence`: Save/load of the player profile
//! - `settings`: Difficulty and effect preferences

pub mod economy;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use economy::{
    Economy, LevelProgress, PurchaseError, UnlockedLevels, UpgradeKind, UpgradeLevels,
    UpgradeValues, Wallet,
};
pub use persistence::{Profile, ProfileError};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;
use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest real frame the clock will account for
    pub const MAX_FRAME_DT: f32 = 0.25;

    /// Play-field dimensions (portrait, origin top-left, y grows downward)
    pub const FIELD_WIDTH: f32 = 540.0;
    pub const FIELD_HEIGHT: f32 = 960.0;
    /// Keep-out margin for the player ship
    pub const FIELD_MARGIN: f32 = 18.0;

    /// Levels 1..=MAX_LEVEL
    pub const MAX_LEVEL: u8 = 5;

    /// Delay the host waits between boss defeat and level completion
    pub const LEVEL_COMPLETE_DELAY: f32 = 2.0;
}

/// Clamp `v` into `[lo, hi]`
#[inline]
pub fn clamp(v: f32, lo: f32, hi: f32) -> f32 {
    v.max(lo).min(hi)
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Uniform draw in `[lo, hi)`; degenerate ranges return `lo`
#[inline]
pub fn rand_range<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi <= lo {
        return lo;
    }
    rng.random_range(lo..hi)
}

/// Distance from point `p` to the segment `a`-`b`
pub fn dist_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Unit vector from `from` toward `to`.
///
/// A zero-length offset divides by 1 instead of 0, yielding `Vec2::ZERO`.
#[inline]
pub fn direction_or_zero(from: Vec2, to: Vec2) -> Vec2 {
    let d = to - from;
    let len = d.length();
    let len = if len > 0.0 { len } else { 1.0 };
    d / len
}
