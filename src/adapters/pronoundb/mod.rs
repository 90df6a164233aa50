//! PronounDB HTTP adapter.
//!
//! Implements [`PronounSource`](crate::domain::ports::PronounSource) against
//! the PronounDB v2 bulk lookup endpoint.

pub mod client;
pub mod models;

pub use client::PronounDbClient;
