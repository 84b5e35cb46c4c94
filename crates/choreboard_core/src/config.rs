//! Runtime configuration for the household app core.
//!
//! # Responsibility
//! - Define sheet geometry/timing knobs and app-level settings with defaults.
//! - Resolve overrides from `CHOREBOARD_*` environment variables.
//!
//! # Invariants
//! - Blank environment values fall back to defaults.
//! - A `SheetConfig` that passes `validate()` keeps `0 < half <= full <= viewport`,
//!   a positive fling threshold and opacity/dismiss ratios within `[0, 1]`.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_LOG_LEVEL: &str = "CHOREBOARD_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CHOREBOARD_LOG_DIR";
pub const ENV_SEED: &str = "CHOREBOARD_SEED";
pub const ENV_VIEWPORT_HEIGHT: &str = "CHOREBOARD_VIEWPORT_HEIGHT";
pub const ENV_GESTURES: &str = "CHOREBOARD_GESTURES";

const DEFAULT_VIEWPORT_HEIGHT: f64 = 800.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment override could not be parsed.
    InvalidValue { key: &'static str, value: String },
    /// Sheet geometry or thresholds are out of range.
    InvalidSheetGeometry(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for `{key}`")
            }
            Self::InvalidSheetGeometry(details) => write!(f, "invalid sheet geometry: {details}"),
        }
    }
}

impl Error for ConfigError {}

/// Geometry and timing of the bottom sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Height of the visible window in logical pixels.
    pub viewport_height: f64,
    /// Open height of the default snap point, as a share of the viewport.
    pub half_ratio: f64,
    /// Open height of the expanded snap point, as a share of the viewport.
    pub full_ratio: f64,
    pub open_duration_ms: u64,
    pub close_duration_ms: u64,
    /// Backdrop opacity while the sheet is open.
    pub backdrop_opacity: f64,
    /// Release speed (px/s) above which a drag counts as a fling.
    pub fling_velocity: f64,
    /// Releasing below `half height * dismiss_ratio` dismisses the sheet.
    pub dismiss_ratio: f64,
    /// Platforms without native pan gestures set this to `false`.
    pub gestures_enabled: bool,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            half_ratio: 0.5,
            full_ratio: 0.8,
            open_duration_ms: 300,
            close_duration_ms: 250,
            backdrop_opacity: 0.5,
            fling_velocity: 1000.0,
            dismiss_ratio: 0.5,
            gestures_enabled: true,
        }
    }
}

impl SheetConfig {
    /// Default geometry for a viewport of `viewport_height`.
    pub fn for_viewport(viewport_height: f64) -> Self {
        Self {
            viewport_height,
            ..Self::default()
        }
    }

    pub fn half_height(&self) -> f64 {
        self.viewport_height * self.half_ratio
    }

    pub fn full_height(&self) -> f64 {
        self.viewport_height * self.full_ratio
    }

    /// Checks geometry ordering and that thresholds are usable.
    ///
    /// # Errors
    /// - `InvalidSheetGeometry` naming the first offending field group.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.geometry_is_valid() {
            return Err(ConfigError::InvalidSheetGeometry(format!(
                "expected viewport_height > 0 and 0 < half_ratio <= full_ratio <= 1, got {}, {} and {}",
                self.viewport_height, self.half_ratio, self.full_ratio
            )));
        }
        if !is_unit_interval(self.backdrop_opacity) {
            return Err(ConfigError::InvalidSheetGeometry(format!(
                "backdrop_opacity must be within [0, 1], got {}",
                self.backdrop_opacity
            )));
        }
        if !self.fling_is_valid() {
            return Err(ConfigError::InvalidSheetGeometry(format!(
                "fling_velocity must be positive, got {}",
                self.fling_velocity
            )));
        }
        if !is_unit_interval(self.dismiss_ratio) {
            return Err(ConfigError::InvalidSheetGeometry(format!(
                "dismiss_ratio must be within [0, 1], got {}",
                self.dismiss_ratio
            )));
        }
        Ok(())
    }

    /// Copy with every invalid field group reset to its default.
    ///
    /// Valid fields and `gestures_enabled` are kept as given.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut config = self.clone();
        if !self.geometry_is_valid() {
            config.viewport_height = defaults.viewport_height;
            config.half_ratio = defaults.half_ratio;
            config.full_ratio = defaults.full_ratio;
        }
        if !is_unit_interval(self.backdrop_opacity) {
            config.backdrop_opacity = defaults.backdrop_opacity;
        }
        if !self.fling_is_valid() {
            config.fling_velocity = defaults.fling_velocity;
        }
        if !is_unit_interval(self.dismiss_ratio) {
            config.dismiss_ratio = defaults.dismiss_ratio;
        }
        config
    }

    fn geometry_is_valid(&self) -> bool {
        self.viewport_height.is_finite()
            && self.viewport_height > 0.0
            && self.half_ratio > 0.0
            && self.half_ratio <= self.full_ratio
            && self.full_ratio <= 1.0
    }

    fn fling_is_valid(&self) -> bool {
        self.fling_velocity.is_finite() && self.fling_velocity > 0.0
    }
}

fn is_unit_interval(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

/// Process-level settings resolved at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub log_level: String,
    /// File logging is enabled only when a directory is configured.
    pub log_dir: Option<PathBuf>,
    pub seed_sample_data: bool,
    pub sheet: SheetConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            seed_sample_data: true,
            sheet: SheetConfig::default(),
        }
    }
}

impl AppConfig {
    /// Resolves settings from process environment variables.
    ///
    /// # Errors
    /// - `ConfigError::InvalidValue` when an override cannot be parsed.
    /// - `ConfigError::InvalidSheetGeometry` when the viewport is not usable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`, which maps a variable name to its
    /// raw value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);
        if let Some(raw) = read(ENV_SEED) {
            config.seed_sample_data = parse_flag(ENV_SEED, &raw)?;
        }
        if let Some(raw) = read(ENV_VIEWPORT_HEIGHT) {
            config.sheet.viewport_height =
                raw.parse::<f64>().map_err(|_| ConfigError::InvalidValue {
                    key: ENV_VIEWPORT_HEIGHT,
                    value: raw.clone(),
                })?;
        }
        if let Some(raw) = read(ENV_GESTURES) {
            config.sheet.gestures_enabled = parse_flag(ENV_GESTURES, &raw)?;
        }

        config.sheet.validate()?;
        Ok(config)
    }
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}
