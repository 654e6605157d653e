//! # gradescale
//!
//! Resolves scores to letter grades against a grading scale configured in a
//! Supabase table, falling back to a built-in scale whenever the configured
//! one cannot be loaded.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Environment-driven configuration and the shared PostgREST client
pub mod config;
/// Constant values used throughout, including the default scale
pub mod constants;
/// Error types
pub mod error;
/// Percentage validation and grade classification
pub mod resolver;
/// Grade bands and grading scales
pub mod scale;
/// Scale providers and the store row shape
pub mod store;

pub use error::{FetchFailure, GradeError, ScaleError};
pub use resolver::{Classification, GradeResolver, classify_with, percentage};
pub use scale::{BandMatch, GradeBand, GradingScale, ScaleIssue};
pub use store::{ScaleFetch, ScaleProvider, ScaleRow, StaticScaleProvider, SupabaseScaleProvider};
