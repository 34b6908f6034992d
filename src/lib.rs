// src/lib.rs

//! Longitudinal swim-meet reports.
//!
//! Meet files are flattened into [`model::Record`]s, indexed by swimmer and
//! by event in an [`analyzer::AggregationIndex`], and rendered as trend
//! charts, event comparisons and animated sequences by [`renderer`].

pub mod analyzer;
pub mod animation;
pub mod cli;
pub mod error;
pub mod interpolate;
pub mod model;
pub mod records;
pub mod renderer;
pub mod sanitize;
pub mod source;

pub use analyzer::{AggregationIndex, DateAxis, EventBounds};
pub use cli::{Args, RenderConfig};
pub use error::{ReportError, ReportResult};
pub use model::{EventKey, Record, Stroke, SwimmerKey};
