//! Infrastructure layer
//!
//! Process-level plumbing shared by the binary and embedders:
//! - Configuration loading (figment)
//! - Logging setup (tracing-subscriber, tracing-appender)

pub mod config;
pub mod logging;
