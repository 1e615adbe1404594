use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, SpiritError};

/// Environment variable that overrides the home directory root.
pub const HOME_ENV: &str = "MACHINE_SPIRIT_HOME";

const SUBDIRS: [&str; 9] = [
    "config",
    "logs",
    "models",
    "knowledge",
    "memory",
    "backups",
    "themes",
    "hive",
    "tmp",
];

/// On-disk layout rooted at `~/.machine_spirit/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    root: PathBuf,
}

impl Paths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the root from `MACHINE_SPIRIT_HOME`, falling back to
    /// `$HOME/.machine_spirit` (`%USERPROFILE%` on Windows).
    pub fn from_env() -> Result<Self> {
        if let Ok(root) = std::env::var(HOME_ENV) {
            if !root.is_empty() {
                return Ok(Self::new(root));
            }
        }
        let home_var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
        let home = std::env::var(home_var)
            .map_err(|_| SpiritError::Config(format!("{} is not set", home_var)))?;
        Ok(Self::new(Path::new(&home).join(".machine_spirit")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> PathBuf {
        self.root.join("config")
    }

    pub fn logs(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn models(&self) -> PathBuf {
        self.root.join("models")
    }

    pub fn knowledge(&self) -> PathBuf {
        self.root.join("knowledge")
    }

    pub fn memory(&self) -> PathBuf {
        self.root.join("memory")
    }

    pub fn backups(&self) -> PathBuf {
        self.root.join("backups")
    }

    pub fn themes(&self) -> PathBuf {
        self.root.join("themes")
    }

    pub fn hive(&self) -> PathBuf {
        self.root.join("hive")
    }

    pub fn tmp(&self) -> PathBuf {
        self.root.join("tmp")
    }

    pub fn config_file(&self) -> PathBuf {
        self.config().join("machine_spirit.toml")
    }

    /// Create every directory of the layout.
    pub fn ensure(&self) -> Result<()> {
        for sub in SUBDIRS {
            std::fs::create_dir_all(self.root.join(sub))?;
        }
        debug!(root = %self.root.display(), "home layout ready");
        Ok(())
    }
}
