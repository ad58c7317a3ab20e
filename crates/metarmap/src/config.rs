//! Configuration management for metarmap.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::animation::Palette;
use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::state::DisplayState;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "metarmap";

/// Default report file name.
const REPORTS_FILE_NAME: &str = "metars.txt";

/// Environment variable prefix.
const ENV_PREFIX: &str = "METARMAP_";

/// Accepted range for the wind warning threshold, in knots.
const WIND_THRESHOLD_RANGE: std::ops::RangeInclusive<u16> = 5..=100;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{4}$").expect("Invalid identifier regex"));

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `METARMAP_`, nested keys split on `__`)
/// 2. TOML config file at `~/.config/metarmap/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Display configuration.
    pub display: DisplayConfig,
    /// High-wind warning configuration.
    pub wind: WindConfig,
    /// Thunderstorm flash configuration.
    pub thunderstorm: ThunderstormConfig,
    /// Airports shown on the display.
    pub airports: AirportsConfig,
    /// Report feed configuration.
    pub feed: FeedConfig,
    /// Animation timing.
    pub animation: AnimationConfig,
    /// Display colors.
    pub colors: Palette,
}

/// Display-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Global brightness, 0 to 255.
    pub brightness: u8,
    /// Whether the display starts powered on.
    pub power: bool,
    /// Number of positions the display has.
    pub max_slots: usize,
}

/// High-wind warning configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    /// Show high-wind warnings.
    pub enabled: bool,
    /// Sustained wind speed above which a warning is shown, in knots.
    pub threshold_kt: u16,
}

/// Thunderstorm flash configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThunderstormConfig {
    /// Show thunderstorm flashes.
    pub enabled: bool,
}

/// Airport list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirportsConfig {
    /// Identifiers in display order. An empty entry or `-` leaves the
    /// position unused.
    pub identifiers: Vec<String>,
}

/// Report feed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// File holding the latest reports, one per line.
    /// Defaults to `~/.local/share/metarmap/metars.txt`
    pub reports_path: Option<PathBuf>,
    /// Seconds between fetches.
    pub fetch_interval_secs: u64,
}

/// Animation timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Milliseconds between animation ticks.
    pub tick_interval_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            brightness: 40,
            power: true,
            max_slots: 100,
        }
    }
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_kt: 25,
        }
    }
}

impl Default for ThunderstormConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            reports_path: None, // Resolved at runtime
            fetch_interval_secs: 300,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 20,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if !WIND_THRESHOLD_RANGE.contains(&self.wind.threshold_kt) {
            return Err(Error::config_validation(format!(
                "wind threshold_kt ({}) must be between {} and {}",
                self.wind.threshold_kt,
                WIND_THRESHOLD_RANGE.start(),
                WIND_THRESHOLD_RANGE.end()
            )));
        }

        if self.feed.fetch_interval_secs == 0 {
            return Err(Error::config_validation(
                "fetch_interval_secs must be greater than 0",
            ));
        }

        if self.animation.tick_interval_ms == 0 {
            return Err(Error::config_validation(
                "tick_interval_ms must be greater than 0",
            ));
        }

        if self.display.max_slots == 0 {
            return Err(Error::config_validation(
                "max_slots must be greater than 0",
            ));
        }

        if self.airports.identifiers.len() > self.display.max_slots {
            return Err(Error::SlotCapacity {
                requested: self.airports.identifiers.len(),
                max: self.display.max_slots,
            });
        }

        for identifier in &self.airports.identifiers {
            let trimmed = identifier.trim();
            if !trimmed.is_empty() && trimmed != "-" && !IDENTIFIER.is_match(trimmed) {
                return Err(Error::config_validation(format!(
                    "invalid airport identifier: {identifier:?}"
                )));
            }
        }

        Ok(())
    }

    /// Get the report file path, resolving defaults if not set.
    #[must_use]
    pub fn reports_path(&self) -> PathBuf {
        self.feed
            .reports_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(REPORTS_FILE_NAME))
    }

    /// Get the fetch interval as a Duration.
    #[must_use]
    pub fn fetch_interval(&self) -> Duration {
        Duration::from_secs(self.feed.fetch_interval_secs)
    }

    /// Get the tick interval as a Duration.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.animation.tick_interval_ms)
    }

    /// Initial display state derived from the settings.
    #[must_use]
    pub fn display_state(&self) -> DisplayState {
        DisplayState {
            brightness: self.display.brightness,
            wind_enabled: self.wind.enabled,
            wind_threshold_kt: self.wind.threshold_kt,
            thunderstorm_enabled: self.thunderstorm.enabled,
            power_on: self.display.power,
            last_fetch_ok: false,
        }
    }

    /// Build the airport registry from the configured identifiers.
    ///
    /// # Errors
    ///
    /// Returns an error if more airports are configured than `max_slots`.
    pub fn registry(&self) -> Result<Registry> {
        Registry::new(&self.airports.identifiers, self.display.max_slots)
    }
}
