use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::SpiritError;

/// Conversation operating mode. Alters how replies are framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "DEV")]
    Dev,
    #[serde(rename = "OPS")]
    Ops,
    #[serde(rename = "STORY")]
    Story,
    #[serde(rename = "ANALYST")]
    Analyst,
}

impl Mode {
    pub const ALL: [Mode; 5] = [Mode::Default, Mode::Dev, Mode::Ops, Mode::Story, Mode::Analyst];

    /// Wire name, e.g. `"DEV"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Dev => "DEV",
            Self::Ops => "OPS",
            Self::Story => "STORY",
            Self::Analyst => "ANALYST",
        }
    }

    /// Bracketed prefix put in front of replies. Empty for the default mode.
    pub fn reply_prefix(&self) -> &'static str {
        match self {
            Self::Default => "",
            Self::Dev => "[DEV] ",
            Self::Ops => "[OPS] ",
            Self::Story => "[STORY] ",
            Self::Analyst => "[ANALYST] ",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = SpiritError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .iter()
            .find(|m| m.as_str() == s)
            .copied()
            .ok_or_else(|| SpiritError::InvalidMode(s.to_string()))
    }
}
