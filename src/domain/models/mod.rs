//! Domain models.

pub mod config;
pub mod display;
pub mod entity;
pub mod overrides;
pub mod pronouns;

pub use config::{Config, DatabaseConfig, LoggingConfig, LookupConfig, LogFormat, RotationPolicy};
pub use display::{DisplayConfig, PronounStyle};
pub use entity::EntityId;
pub use overrides::{OverrideRecord, OverrideSlot};
pub use pronouns::PronounCode;
