//! Shared test utilities for the coord workspace.
//!
//! This crate provides standardised fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`sources`]: scripted, re-entrant and failing [`Source`](coord_core::Source)s
//! - [`hooks`]: recording malformed-value handler and counting arbiter

pub mod hooks;
pub mod sources;

pub use hooks::{CountingArbiter, RecordingHandler};
pub use sources::{FailingSource, ReentrantSource, ScriptedSource};

/// Parse coordinates from `{k=v, ...}` syntax, panicking on bad input.
pub fn coords(s: &str) -> coord_core::Coordinates {
    s.parse().expect("test coordinates must parse")
}
