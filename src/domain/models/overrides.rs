//! Manual pronoun overrides.

use serde::{Deserialize, Serialize};

use super::pronouns::PronounCode;

/// A persisted override for one entity.
///
/// `Cleared` is an explicit "no preference" entry: it still short-circuits
/// remote resolution, and is different from having no override at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<PronounCode>", into = "Option<PronounCode>")]
pub enum OverrideRecord {
    Set(PronounCode),
    Cleared,
}

impl OverrideRecord {
    /// The value this override resolves to.
    pub fn value(self) -> Option<PronounCode> {
        match self {
            Self::Set(code) => Some(code),
            Self::Cleared => None,
        }
    }
}

impl From<Option<PronounCode>> for OverrideRecord {
    fn from(value: Option<PronounCode>) -> Self {
        value.map_or(Self::Cleared, Self::Set)
    }
}

impl From<OverrideRecord> for Option<PronounCode> {
    fn from(record: OverrideRecord) -> Self {
        record.value()
    }
}

/// What the in-memory override mirror knows about a key once primed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideSlot {
    /// Storage was consulted and holds no override.
    Absent,
    Present(OverrideRecord),
}

impl OverrideSlot {
    pub fn record(self) -> Option<OverrideRecord> {
        match self {
            Self::Absent => None,
            Self::Present(record) => Some(record),
        }
    }
}
