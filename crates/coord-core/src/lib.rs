//! Coordinate-scoped configuration resolution
//!
//! This crate resolves a single named configuration property to one
//! authoritative value when several independent sources can each offer a
//! candidate. Candidates are scoped by [`Coordinates`], a set of named
//! dimensions such as `region`, `environment` or `phase`.
//!
//! - **Validation**: values whose coordinates are not drawn from the request
//!   are reported as malformed and never selected
//! - **Selection**: an exact coordinate match wins; otherwise the most
//!   specific values compete, with the authoritative flag as tie-breaker
//! - **Arbitration**: residual ties are handed to registered [`Arbiter`]s
//! - **Conversion**: the winning string is parsed by the [`Converter`]
//!   registered for the requested type
//!
//! # Architecture
//!
//! ```text
//!                      caller
//!                        |
//!                     Engine ---- ConverterRegistry
//!                        |
//!        +---------------+---------------+
//!        |               |               |
//!     Source(s)      Arbiter(s)   MalformedHandler
//! ```
//!
//! # Example
//!
//! ```ignore
//! use coord_core::{Coordinates, Engine};
//!
//! let engine = Engine::builder()
//!     .source(my_source)
//!     .coordinates(Coordinates::new())
//!     .build()?;
//!
//! let coordinates: Coordinates = "{environment=test}".parse()?;
//! let url: Option<String> = engine.get(&coordinates, "db.url")?;
//! ```

pub mod arbiter;
pub mod config;
pub mod convert;
pub mod coordinates;
pub mod engine;
pub mod error;
pub mod interpolate;
pub mod malformed;
pub mod select;
pub mod source;
pub mod value;

pub use arbiter::{Arbiter, RankedArbiter, RankedOrder};
pub use config::{EngineConfig, ExactMatchPolicy};
pub use convert::{Converter, ConverterRegistry};
pub use coordinates::{Coordinates, ParseCoordinatesError};
pub use engine::{CONFIGURATION_COORDINATES, Engine, EngineBuilder};
pub use error::{Error, Result};
pub use interpolate::{Interpolator, Verbatim};
pub use malformed::{DiscardMalformed, MalformedHandler, MalformedReason, MalformedValue};
pub use select::{Candidates, Selection};
pub use source::{Lookup, Source};
pub use value::{SourceInfo, Value};
