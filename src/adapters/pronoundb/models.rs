//! PronounDB v2 wire types.

use serde::Deserialize;
use std::collections::HashMap;

use crate::domain::models::PronounCode;

/// Lookup response body: platform id -> entry. Ids without an account are
/// left out by the service.
pub type LookupResponse = HashMap<String, LookupEntry>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupEntry {
    /// Pronoun sets keyed by locale (`en`, ...)
    #[serde(default)]
    pub sets: HashMap<String, Vec<String>>,
}

impl LookupEntry {
    /// Decode the English set, the only locale the service populates today.
    pub fn pronouns(&self) -> Option<PronounCode> {
        self.sets
            .get("en")
            .and_then(|set| PronounCode::from_pronoun_set(set.as_slice()))
    }
}
