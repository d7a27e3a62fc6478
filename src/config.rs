//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treectl/treectl.toml`
//! 3. Explicit config file: `--config <file>`
//! 4. Environment variables: `TREECTL_*` prefix (`__` separates nested keys)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::api::normalize_base_url;
use crate::application::ApplicationError;
use crate::domain::layout::{DEFAULT_HORIZONTAL_SPACING, DEFAULT_VERTICAL_SPACING};
use crate::domain::LayoutSpacing;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Diagram spacing settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutSettings {
    /// Horizontal parent-child offset at depth 0; halves per level
    pub horizontal_spacing: f64,
    /// Vertical distance between levels
    pub vertical_spacing: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            horizontal_spacing: DEFAULT_HORIZONTAL_SPACING,
            vertical_spacing: DEFAULT_VERTICAL_SPACING,
        }
    }
}

impl LayoutSettings {
    pub fn spacing(&self) -> LayoutSpacing {
        LayoutSpacing {
            horizontal: self.horizontal_spacing,
            vertical: self.vertical_spacing,
        }
    }
}

/// Raw layout settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLayoutSettings {
    pub horizontal_spacing: Option<f64>,
    pub vertical_spacing: Option<f64>,
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub api_url: Option<String>,
    pub session_file: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub layout: RawLayoutSettings,
}

/// Unified configuration for treectl.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the tree service (a trailing `/api` is stripped)
    pub api_url: String,
    /// Where the session (tokens, selected tree) is persisted
    pub session_file: PathBuf,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Diagram layout
    pub layout: LayoutSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_file: default_session_file(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            layout: LayoutSettings::default(),
        }
    }
}

/// Default session file: `<data_dir>/treectl/session.json`.
fn default_session_file() -> PathBuf {
    ProjectDirs::from("", "", "treectl")
        .map(|dirs| dirs.data_dir().join("session.json"))
        .unwrap_or_else(|| PathBuf::from("~/.treectl/session.json"))
}

/// Get the XDG config directory for treectl.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treectl").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treectl.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    pub fn spacing(&self) -> LayoutSpacing {
        self.layout.spacing()
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let raw = self.session_file.to_string_lossy().to_string();
        let expanded = shellexpand::full(&raw)
            .map(|s| s.into_owned())
            .unwrap_or(raw);
        self.session_file = PathBuf::from(expanded);
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            api_url: overlay
                .api_url
                .clone()
                .unwrap_or_else(|| self.api_url.clone()),
            session_file: overlay
                .session_file
                .clone()
                .unwrap_or_else(|| self.session_file.clone()),
            timeout_secs: overlay.timeout_secs.unwrap_or(self.timeout_secs),
            layout: LayoutSettings {
                horizontal_spacing: overlay
                    .layout
                    .horizontal_spacing
                    .unwrap_or(self.layout.horizontal_spacing),
                vertical_spacing: overlay
                    .layout
                    .vertical_spacing
                    .unwrap_or(self.layout.vertical_spacing),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file (must exist)
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_layers(global_config_path().as_deref(), config_file)
    }

    /// Load from explicit layers; a missing global file is skipped.
    pub fn load_layers(global: Option<&Path>, config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global {
            if global_path.exists() {
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Explicit config file
        if let Some(path) = config_file {
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        current.api_url = normalize_base_url(&current.api_url);
        current.validate()?;

        Ok(current)
    }

    /// Apply TREECTL_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("TREECTL").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("api_url") {
            settings.api_url = val;
        }
        if let Ok(val) = config.get_string("session_file") {
            settings.session_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_int("timeout_secs") {
            settings.timeout_secs = u64::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("TREECTL_TIMEOUT_SECS must be positive, got {}", val),
            })?;
        }
        if let Ok(val) = config.get_float("layout.horizontal_spacing") {
            settings.layout.horizontal_spacing = val;
        }
        if let Ok(val) = config.get_float("layout.vertical_spacing") {
            settings.layout.vertical_spacing = val;
        }

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.api_url.is_empty() {
            return Err(ApplicationError::Config {
                message: "api_url must not be empty".into(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ApplicationError::Config {
                message: "timeout_secs must be greater than 0".into(),
            });
        }
        let spacing = self.layout.spacing();
        if !(spacing.horizontal > 0.0 && spacing.vertical > 0.0) {
            return Err(ApplicationError::Config {
                message: "layout spacing must be positive".into(),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# treectl configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/treectl/treectl.toml
#   Explicit: treectl --config <file>
#   Env:    TREECTL_* environment variables (e.g. TREECTL_API_URL,
#           TREECTL_LAYOUT__HORIZONTAL_SPACING)

# Base URL of the tree service; a trailing /api is ignored
# api_url = "http://localhost:8000"

# Session file holding tokens and the selected tree
# session_file = "~/.local/share/treectl/session.json"

# Request timeout in seconds
# timeout_secs = 30

[layout]
# Horizontal offset of the root's children; halves at each level
# horizontal_spacing = 220.0

# Vertical distance between levels
# vertical_spacing = 160.0
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
