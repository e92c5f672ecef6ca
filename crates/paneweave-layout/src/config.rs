#![forbid(unsafe_code)]

//! Engine tuning knobs.
//!
//! Loadable from TOML or JSON (strings or files) and overridable from the
//! environment. Every field has a default, so partial documents are fine.
//!
//! ```toml
//! resize_floor = 8.0
//! pending_grace_passes = 2
//! default_browser_url = "https://example.org"
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Field |
//! |---|---|
//! | `PANEWEAVE_RESIZE_FLOOR` | `resize_floor` |
//! | `PANEWEAVE_PENDING_GRACE_PASSES` | `pending_grace_passes` |
//! | `PANEWEAVE_DROP_EDGE_BAND` | `drop_edge_band` |
//! | `PANEWEAVE_DEFAULT_BROWSER_URL` | `default_browser_url` |
//! | `PANEWEAVE_DEFAULT_SHELL` | `default_shell` |
//!
//! Unparsable values are ignored.

use std::path::Path;

use paneweave_core::geometry::DEFAULT_DROP_EDGE_BAND;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable overriding [`EngineConfig::resize_floor`].
pub const ENV_RESIZE_FLOOR: &str = "PANEWEAVE_RESIZE_FLOOR";
/// Environment variable overriding [`EngineConfig::pending_grace_passes`].
pub const ENV_PENDING_GRACE_PASSES: &str = "PANEWEAVE_PENDING_GRACE_PASSES";
/// Environment variable overriding [`EngineConfig::drop_edge_band`].
pub const ENV_DROP_EDGE_BAND: &str = "PANEWEAVE_DROP_EDGE_BAND";
/// Environment variable overriding [`EngineConfig::default_browser_url`].
pub const ENV_DEFAULT_BROWSER_URL: &str = "PANEWEAVE_DEFAULT_BROWSER_URL";
/// Environment variable overriding [`EngineConfig::default_shell`].
pub const ENV_DEFAULT_SHELL: &str = "PANEWEAVE_DEFAULT_SHELL";

/// Minimum share a divider neighbour may shrink to.
pub const DEFAULT_RESIZE_FLOOR: f64 = 5.0;
/// Default address for new browser tabs.
pub const DEFAULT_BROWSER_URL: &str = "https://google.com";

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum size (of 100) either neighbour of a divider may reach.
    pub resize_floor: f64,
    /// Sync passes a tree-absent pending entry survives.
    pub pending_grace_passes: u32,
    /// Fraction of a pane's width/height forming each edge drop band.
    pub drop_edge_band: f64,
    /// Pointer distance in pixels that still grabs a divider.
    pub divider_hit_tolerance: f64,
    /// Address given to new browser tabs.
    pub default_browser_url: String,
    /// Shell recorded on new terminal tabs.
    pub default_shell: Option<String>,
    /// Tolerance for "sizes sum to 100".
    pub size_epsilon: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            resize_floor: DEFAULT_RESIZE_FLOOR,
            pending_grace_passes: 1,
            drop_edge_band: DEFAULT_DROP_EDGE_BAND,
            divider_hit_tolerance: 3.0,
            default_browser_url: DEFAULT_BROWSER_URL.to_owned(),
            default_shell: None,
            size_epsilon: 1e-6,
        }
    }
}

impl EngineConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Defaults with environment overrides applied.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup` (normally `std::env::var`).
    #[must_use]
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(floor) = lookup(ENV_RESIZE_FLOOR).and_then(|v| v.trim().parse().ok()) {
            self.resize_floor = floor;
        }
        if let Some(passes) = lookup(ENV_PENDING_GRACE_PASSES).and_then(|v| v.trim().parse().ok())
        {
            self.pending_grace_passes = passes;
        }
        if let Some(band) = lookup(ENV_DROP_EDGE_BAND).and_then(|v| v.trim().parse().ok()) {
            self.drop_edge_band = band;
        }
        if let Some(url) = lookup(ENV_DEFAULT_BROWSER_URL).filter(|v| !v.trim().is_empty()) {
            self.default_browser_url = url.trim().to_owned();
        }
        if let Some(shell) = lookup(ENV_DEFAULT_SHELL).filter(|v| !v.trim().is_empty()) {
            self.default_shell = Some(shell.trim().to_owned());
        }
        self
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !self.resize_floor.is_finite() || !(0.0..50.0).contains(&self.resize_floor) {
            errors.push(format!(
                "resize_floor must be in [0, 50), got {}",
                self.resize_floor
            ));
        }
        if !self.drop_edge_band.is_finite() || !(0.0..=0.5).contains(&self.drop_edge_band) {
            errors.push(format!(
                "drop_edge_band must be in [0, 0.5], got {}",
                self.drop_edge_band
            ));
        }
        if !self.divider_hit_tolerance.is_finite() || self.divider_hit_tolerance < 0.0 {
            errors.push(format!(
                "divider_hit_tolerance must be >= 0, got {}",
                self.divider_hit_tolerance
            ));
        }
        if !self.size_epsilon.is_finite() || self.size_epsilon <= 0.0 || self.size_epsilon >= 1.0 {
            errors.push(format!(
                "size_epsilon must be in (0, 1), got {}",
                self.size_epsilon
            ));
        }
        if self.default_browser_url.trim().is_empty() {
            errors.push("default_browser_url must not be empty".to_owned());
        }
        errors
    }

    /// Clamp out-of-range values into their valid ranges.
    #[must_use]
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        self.resize_floor = if self.resize_floor.is_finite() {
            self.resize_floor.clamp(0.0, 49.0)
        } else {
            defaults.resize_floor
        };
        self.drop_edge_band = if self.drop_edge_band.is_finite() {
            self.drop_edge_band.clamp(0.0, 0.5)
        } else {
            defaults.drop_edge_band
        };
        self.divider_hit_tolerance = if self.divider_hit_tolerance.is_finite() {
            self.divider_hit_tolerance.max(0.0)
        } else {
            defaults.divider_hit_tolerance
        };
        if !self.size_epsilon.is_finite() || self.size_epsilon <= 0.0 || self.size_epsilon >= 1.0 {
            self.size_epsilon = defaults.size_epsilon;
        }
        if self.default_browser_url.trim().is_empty() {
            self.default_browser_url = defaults.default_browser_url;
        }
        self
    }

    /// Parse, then reject the document if validation fails.
    pub fn from_toml_str_strict(s: &str) -> Result<Self, ConfigError> {
        let config = Self::from_toml_str(s)?;
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}
