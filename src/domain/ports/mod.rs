//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the async trait interfaces that adapters implement:
//! - PronounSource: remote batch lookup of pronouns
//! - KeyValueStore: durable storage used for overrides
//!
//! These traits keep the resolver independent of the HTTP transport and of
//! the persistence backend.

pub mod key_value_store;
pub mod pronoun_source;

pub use key_value_store::KeyValueStore;
pub use pronoun_source::{LookupResult, PronounSource};
