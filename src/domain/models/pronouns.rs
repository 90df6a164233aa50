//! Pronoun codes.
//!
//! The closed set mirrors the short codes used by PronounDB: a subject and
//! object pair (`hh` for he/him), the mixed pairs (`ht` for he/they), and four
//! meta answers that are not pronouns at all (`any`, `other`, `ask`, `avoid`).

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PronounCode {
    #[serde(rename = "hh")]
    HeHim,
    #[serde(rename = "hi")]
    HeIt,
    #[serde(rename = "hs")]
    HeShe,
    #[serde(rename = "ht")]
    HeThey,
    #[serde(rename = "ih")]
    ItHim,
    #[serde(rename = "ii")]
    ItIts,
    #[serde(rename = "is")]
    ItShe,
    #[serde(rename = "it")]
    ItThey,
    #[serde(rename = "shh")]
    SheHe,
    #[serde(rename = "sh")]
    SheHer,
    #[serde(rename = "si")]
    SheIt,
    #[serde(rename = "st")]
    SheThey,
    #[serde(rename = "th")]
    TheyHe,
    #[serde(rename = "ti")]
    TheyIt,
    #[serde(rename = "ts")]
    TheyShe,
    #[serde(rename = "tt")]
    TheyThem,
    #[serde(rename = "any")]
    Any,
    #[serde(rename = "other")]
    Other,
    #[serde(rename = "ask")]
    Ask,
    #[serde(rename = "avoid")]
    Avoid,
}

impl PronounCode {
    pub const ALL: [Self; 20] = [
        Self::HeHim,
        Self::HeIt,
        Self::HeShe,
        Self::HeThey,
        Self::ItHim,
        Self::ItIts,
        Self::ItShe,
        Self::ItThey,
        Self::SheHe,
        Self::SheHer,
        Self::SheIt,
        Self::SheThey,
        Self::TheyHe,
        Self::TheyIt,
        Self::TheyShe,
        Self::TheyThem,
        Self::Any,
        Self::Other,
        Self::Ask,
        Self::Avoid,
    ];

    /// Short storage/wire code.
    pub fn code(self) -> &'static str {
        match self {
            Self::HeHim => "hh",
            Self::HeIt => "hi",
            Self::HeShe => "hs",
            Self::HeThey => "ht",
            Self::ItHim => "ih",
            Self::ItIts => "ii",
            Self::ItShe => "is",
            Self::ItThey => "it",
            Self::SheHe => "shh",
            Self::SheHer => "sh",
            Self::SheIt => "si",
            Self::SheThey => "st",
            Self::TheyHe => "th",
            Self::TheyIt => "ti",
            Self::TheyShe => "ts",
            Self::TheyThem => "tt",
            Self::Any => "any",
            Self::Other => "other",
            Self::Ask => "ask",
            Self::Avoid => "avoid",
        }
    }

    /// Canonical, capitalized display string.
    pub fn canonical(self) -> &'static str {
        match self {
            Self::HeHim => "He/Him",
            Self::HeIt => "He/It",
            Self::HeShe => "He/She",
            Self::HeThey => "He/They",
            Self::ItHim => "It/Him",
            Self::ItIts => "It/Its",
            Self::ItShe => "It/She",
            Self::ItThey => "It/They",
            Self::SheHe => "She/He",
            Self::SheHer => "She/Her",
            Self::SheIt => "She/It",
            Self::SheThey => "She/They",
            Self::TheyHe => "They/He",
            Self::TheyIt => "They/It",
            Self::TheyShe => "They/She",
            Self::TheyThem => "They/Them",
            Self::Any => "Any pronouns",
            Self::Other => "Other pronouns",
            Self::Ask => "Ask me my pronouns",
            Self::Avoid => "Avoid pronouns, use my name",
        }
    }

    /// Meta answers read as phrases rather than pronouns.
    pub fn is_meta(self) -> bool {
        matches!(self, Self::Any | Self::Other | Self::Ask | Self::Avoid)
    }

    /// Decode a PronounDB v2 language set (e.g. `["he", "they"]`).
    ///
    /// Returns `None` for an empty or `unspecified` set. Combinations that
    /// have no code of their own collapse to [`PronounCode::Other`].
    pub fn from_pronoun_set<S: AsRef<str>>(set: &[S]) -> Option<Self> {
        let set: Vec<&str> = set.iter().map(AsRef::as_ref).collect();
        match set.as_slice() {
            [] | ["unspecified"] => None,
            ["he"] => Some(Self::HeHim),
            ["it"] => Some(Self::ItIts),
            ["she"] => Some(Self::SheHer),
            ["they"] => Some(Self::TheyThem),
            ["any"] => Some(Self::Any),
            ["ask"] => Some(Self::Ask),
            ["avoid"] => Some(Self::Avoid),
            ["he", "it"] => Some(Self::HeIt),
            ["he", "she"] => Some(Self::HeShe),
            ["he", "they"] => Some(Self::HeThey),
            ["it", "he"] => Some(Self::ItHim),
            ["it", "she"] => Some(Self::ItShe),
            ["it", "they"] => Some(Self::ItThey),
            ["she", "he"] => Some(Self::SheHe),
            ["she", "it"] => Some(Self::SheIt),
            ["she", "they"] => Some(Self::SheThey),
            ["they", "he"] => Some(Self::TheyHe),
            ["they", "it"] => Some(Self::TheyIt),
            ["they", "she"] => Some(Self::TheyShe),
            _ => Some(Self::Other),
        }
    }
}

impl std::fmt::Display for PronounCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.canonical())
    }
}

impl FromStr for PronounCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|code| code.code() == needle || code.canonical().to_lowercase() == needle)
            .ok_or_else(|| DomainError::UnknownPronounCode(s.to_string()))
    }
}
