//=========================================================================
// Configuration
//=========================================================================
//
// TOML-backed reel configuration. Every field has a default, so an empty
// file (or no file at all) yields a working reel.
//
//   [runtime]     tick rate and host channel sizing
//   [navigation]  cooldowns and camera transition timings
//   [reel]        intro, RNG seed, tilt axis
//   [viewport]    overlay geometry used for hit testing and unprojection
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Longest navigation timing accepted, so timer deadlines stay in range.
const MAX_DURATION_SECS: f32 = 86_400.0;

//=== ConfigError =========================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

//=== Sections ============================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub tps: f64,
    pub channel_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 128,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub cooldown_secs: f32,
    pub first_slide_cooldown_secs: f32,
    pub camera_restore_secs: f32,
    pub camera_reset_secs: f32,
    pub intro_transition_secs: f32,
}

impl NavigationConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs_f32(self.cooldown_secs)
    }

    pub fn first_slide_cooldown(&self) -> Duration {
        Duration::from_secs_f32(self.first_slide_cooldown_secs)
    }

    pub fn camera_restore(&self) -> Duration {
        Duration::from_secs_f32(self.camera_restore_secs)
    }

    pub fn camera_reset(&self) -> Duration {
        Duration::from_secs_f32(self.camera_reset_secs)
    }

    pub fn intro_transition(&self) -> Duration {
        Duration::from_secs_f32(self.intro_transition_secs)
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 1.0,
            first_slide_cooldown_secs: 3.0,
            camera_restore_secs: 0.75,
            camera_reset_secs: 0.5,
            intro_transition_secs: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReelOptions {
    pub skip_intro: bool,
    pub seed: u64,
    /// Touch hosts report drags with the X tilt axis flipped.
    pub invert_tilt_x: bool,
}

impl Default for ReelOptions {
    fn default() -> Self {
        Self {
            skip_intro: false,
            seed: 0x5EED,
            invert_tilt_x: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f32,
    pub height: f32,
    pub button_margin: f32,
    pub button_size: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            button_margin: 60.0,
            button_size: 64.0,
        }
    }
}

//=== ReelConfig ==========================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReelConfig {
    pub runtime: RuntimeConfig,
    pub navigation: NavigationConfig,
    pub reel: ReelOptions,
    pub viewport: ViewportConfig,
}

impl ReelConfig {
    /// Reads and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Parses and validates TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let tps = self.runtime.tps;
        if !(tps > 0.0) || Duration::try_from_secs_f64(1.0 / tps).is_err() {
            return Err(ConfigError::invalid(
                "runtime.tps",
                format!("must be positive with a representable frame time, got {}", tps),
            ));
        }
        if self.runtime.channel_capacity == 0 {
            return Err(ConfigError::invalid(
                "runtime.channel_capacity",
                "must be positive",
            ));
        }

        let nav = &self.navigation;
        for (field, value) in [
            ("navigation.cooldown_secs", nav.cooldown_secs),
            ("navigation.first_slide_cooldown_secs", nav.first_slide_cooldown_secs),
            ("navigation.camera_restore_secs", nav.camera_restore_secs),
            ("navigation.camera_reset_secs", nav.camera_reset_secs),
            ("navigation.intro_transition_secs", nav.intro_transition_secs),
        ] {
            if value > MAX_DURATION_SECS || Duration::try_from_secs_f32(value).is_err() {
                return Err(ConfigError::invalid(
                    field,
                    format!(
                        "must be a duration between 0 and {} seconds, got {}",
                        MAX_DURATION_SECS, value
                    ),
                ));
            }
        }

        let view = &self.viewport;
        if !(view.width > 0.0 && view.height > 0.0) {
            return Err(ConfigError::invalid(
                "viewport",
                format!("size must be positive, got {}x{}", view.width, view.height),
            ));
        }
        if !(view.button_size > 0.0) || view.button_margin < 0.0 {
            return Err(ConfigError::invalid(
                "viewport.button_size",
                "buttons need a positive size and non-negative margin",
            ));
        }

        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
