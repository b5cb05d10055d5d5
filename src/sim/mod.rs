//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (insertion order of each entity list)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod director;
pub mod effects;
pub mod player;
pub mod state;
pub mod tables;
pub mod tick;

pub use collision::circles_overlap;
pub use effects::{Detonation, Effects, Particle, PendingEffect, Popup};
pub use player::{DamageOutcome, ShotOutcome};
pub use state::{
    Boss, BossPhase, Bullet, DirectorState, Enemy, EnemyBullet, EnemyKind, GameState, Maneuver,
    Pickup, PickupKind, Player, RenderSnapshot, RingElement, SimConfig,
};
pub use tick::{FixedClock, TickInput, TickOutcome, tick};
