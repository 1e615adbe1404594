use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::{Result, SpiritError};
use crate::mode::Mode;
use crate::self_model::IdentityProfile;

/// Machine Spirit configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Chat pipeline settings
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Overrides for the built-in identity (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityOverrides>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Mode used when the caller supplies none
    #[serde(default)]
    pub default_mode: Mode,
    /// Per-session history cap; oldest messages are evicted first
    #[serde(default = "default_max_history")]
    pub max_history_messages: usize,
    /// Reserved; nothing consults it yet
    #[serde(default = "default_enable_autonomy")]
    pub enable_autonomy: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            default_mode: Mode::Default,
            max_history_messages: default_max_history(),
            enable_autonomy: default_enable_autonomy(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityOverrides {
    pub name: Option<String>,
    pub version: Option<String>,
    pub build_codename: Option<String>,
    pub description: Option<String>,
}

fn default_max_history() -> usize {
    50
}

fn default_enable_autonomy() -> bool {
    true
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        info!(
            path = %path.as_ref().display(),
            default_mode = %config.orchestrator.default_mode,
            max_history = config.orchestrator.max_history_messages,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Load the file, or write and return the defaults if it does not exist yet.
    pub fn load_or_init<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }
        let config = Config::default();
        config.save(path)?;
        info!(path = %path.display(), "wrote default configuration");
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.orchestrator.max_history_messages == 0 {
            return Err(SpiritError::Config(
                "max_history_messages must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Built-in identity with any configured overrides applied.
    pub fn identity(&self) -> IdentityProfile {
        let mut identity = IdentityProfile::default();
        if let Some(o) = &self.identity {
            if let Some(name) = &o.name {
                identity.name = name.clone();
            }
            if let Some(version) = &o.version {
                identity.version = version.clone();
            }
            if let Some(codename) = &o.build_codename {
                identity.build_codename = codename.clone();
            }
            if let Some(description) = &o.description {
                identity.description = description.clone();
            }
        }
        identity
    }
}
