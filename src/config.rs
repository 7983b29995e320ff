//! Controller configuration loaded from TOML.

use crate::rules::Color;
use crate::session::{EngineLevel, SearchBudget};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Environment variable that overrides [`ControllerConfig::service_url`].
pub const SERVICE_URL_ENV: &str = "STRICTLY_CHESS_SERVICE_URL";

/// Settings for one controller and its inference client.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Base URL of the move-inference service.
    #[serde(default = "default_service_url")]
    service_url: String,

    /// Seconds to wait for one engine answer.
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,

    /// Skill rating for new games.
    #[serde(default)]
    engine_level: EngineLevel,

    /// Node budget for new games.
    #[serde(default)]
    search_budget: SearchBudget,

    /// Side the human plays.
    #[serde(default = "default_player_color")]
    player_color: Color,
}

fn default_service_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_player_color() -> Color {
    Color::White
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            request_timeout_secs: default_request_timeout_secs(),
            engine_level: EngineLevel::default(),
            search_budget: SearchBudget::default(),
            player_color: default_player_color(),
        }
    }
}

impl ControllerConfig {
    /// Loads configuration from a TOML file.
    ///
    /// Missing keys take their defaults. The service URL environment override
    /// is applied afterwards.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        let config = config.validated()?.with_env_override();
        info!(service_url = %config.service_url, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise falls back to defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            debug!("No config file, using defaults");
            Ok(Self::default().with_env_override())
        }
    }

    /// Replaces the service URL.
    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = url.into();
        self
    }

    /// Replaces the human's side.
    pub fn with_player_color(mut self, color: Color) -> Self {
        self.player_color = color;
        self
    }

    /// Replaces the skill rating.
    pub fn with_engine_level(mut self, level: EngineLevel) -> Self {
        self.engine_level = level;
        self
    }

    /// Replaces the node budget.
    pub fn with_search_budget(mut self, budget: SearchBudget) -> Self {
        self.search_budget = budget;
        self
    }

    /// Per-request deadline.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.request_timeout_secs == 0 {
            warn!("Rejected zero request timeout");
            return Err(ConfigError::new(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }

    fn with_env_override(mut self) -> Self {
        match std::env::var(SERVICE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => {
                debug!(%url, "Service URL overridden from environment");
                self.service_url = url;
            }
            _ => {}
        }
        self
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
