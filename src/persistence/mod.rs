//! Player profile persistence
//!
//! Features:
//! - Versioned JSON envelope
//! - Atomic write (tmp file, then rename over the save)
//! - Fallback to a fresh profile on a missing or corrupt save

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::economy::{Economy, LevelProgress, UnlockedLevels, UpgradeValues, Wallet};

/// Current profile format version
pub const PROFILE_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ProfileError {
    #[error("Profile I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Profile is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Unsupported profile version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Credits, upgrades and unlocked levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub version: u32,
    #[serde(default)]
    pub wallet: Wallet,
    #[serde(default)]
    pub unlocked: UnlockedLevels,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            version: PROFILE_VERSION,
            wallet: Wallet::default(),
            unlocked: UnlockedLevels::default(),
        }
    }
}

impl Profile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let json = fs::read_to_string(path)?;
        let profile: Profile = serde_json::from_str(&json)?;
        if profile.version != PROFILE_VERSION {
            return Err(ProfileError::UnsupportedVersion {
                found: profile.version,
                expected: PROFILE_VERSION,
            });
        }
        Ok(profile)
    }

    /// Load the profile, or start fresh when it is missing or unreadable
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(profile) => {
                log::info!(
                    "Loaded profile from {} ({} credits)",
                    path.display(),
                    profile.wallet.credits
                );
                profile
            }
            Err(ProfileError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No profile at {}, starting fresh", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("{}; starting fresh", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ProfileError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        log::info!("Profile saved to {}", path.display());
        Ok(())
    }
}

impl Economy for Profile {
    fn add_credits(&mut self, amount: u32) {
        self.wallet.add_credits(amount);
    }

    fn game_values(&self) -> UpgradeValues {
        self.wallet.game_values()
    }

    fn dash_cooldown(&self, dash_level: u32) -> f32 {
        self.wallet.dash_cooldown(dash_level)
    }
}

impl LevelProgress for Profile {
    fn unlock_level(&mut self, level: u8) {
        self.unlocked.unlock_level(level);
    }

    fn unlocked_levels(&self) -> Vec<u8> {
        self.unlocked.unlocked_levels()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::UpgradeKind;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "void_barrage_{}_{}.json",
            name,
            std::process::id()
        ))
    }

    #[test]
    fn test_save_load() {
        let path = temp_path("profile_roundtrip");
        let mut profile = Profile::default();
        profile.add_credits(900);
        profile.wallet.purchase(UpgradeKind::Speed).unwrap();
        profile.unlock_level(2);
        profile.save(&path).unwrap();

        let loaded = Profile::load(&path).unwrap();
        assert_eq!(loaded, profile);
        assert!(!path.with_extension("tmp").exists());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_is_fresh() {
        let path = temp_path("profile_missing");
        assert!(matches!(Profile::load(&path), Err(ProfileError::Io(_))));
        assert_eq!(Profile::load_or_default(&path), Profile::default());
    }

    #[test]
    fn test_corrupt_file() {
        let path = temp_path("profile_corrupt");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Profile::load(&path), Err(ProfileError::Parse(_))));
        assert_eq!(Profile::load_or_default(&path), Profile::default());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_version_mismatch() {
        let path = temp_path("profile_version");
        fs::write(&path, r#"{"version": 7}"#).unwrap();
        match Profile::load(&path) {
            Err(ProfileError::UnsupportedVersion { found, expected }) => {
                assert_eq!(found, 7);
                assert_eq!(expected, PROFILE_VERSION);
            }
            other => panic!("unexpected {:?}", other),
        }
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_profile_delegates_hooks() {
        let mut profile = Profile::default();
        assert_eq!(profile.unlocked_levels(), vec![1]);
        profile.unlock_level(4);
        assert!(profile.is_unlocked(4));
        assert_eq!(profile.game_values(), UpgradeValues::default());
        assert!((profile.dash_cooldown(2) - 1.2).abs() < 1e-6);
    }
}
