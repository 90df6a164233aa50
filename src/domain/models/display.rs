//! Presentation settings supplied by the rendering layer.

use serde::{Deserialize, Serialize};

/// Casing applied when rendering a pronoun value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PronounStyle {
    #[default]
    Capitalized,
    Lowercase,
}

impl std::str::FromStr for PronounStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "capitalized" => Ok(Self::Capitalized),
            "lowercase" => Ok(Self::Lowercase),
            other => Err(format!("Invalid style: {other}. Must be one of: capitalized, lowercase")),
        }
    }
}

/// Read-only display configuration consumed by the formatting helpers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DisplayConfig {
    #[serde(default)]
    pub style: PronounStyle,

    /// Whether pronouns are rendered next to messages at all
    #[serde(default = "default_true")]
    pub show_in_messages: bool,

    /// Whether the viewer's own pronouns are rendered
    #[serde(default = "default_true")]
    pub show_self: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            style: PronounStyle::default(),
            show_in_messages: default_true(),
            show_self: default_true(),
        }
    }
}
