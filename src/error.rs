#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Errors surfaced to callers of the resolver.
///
/// Fetch-layer failures never show up here; they are absorbed into the
/// default-scale fallback. Only bad input reaches the caller.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GradeError {
    /// The maximum marks were zero or negative.
    #[error("Maximum marks must be greater than zero, got {0}.")]
    NonPositiveMaxMarks(f64),
    /// The marks obtained were negative.
    #[error("Marks cannot be negative, got {0}.")]
    NegativeMarks(f64),
    /// One of the arguments was NaN or infinite.
    #[error("`{name}` must be a finite number, got {value}.")]
    NonFinite {
        /// Name of the offending argument.
        name:  &'static str,
        /// The value that was passed.
        value: f64,
    },
}

/// Reasons a set of bands cannot form a usable grading scale.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScaleError {
    /// No bands were supplied.
    #[error("A grading scale needs at least one band.")]
    Empty,
    /// A band bound was NaN or infinite.
    #[error("Band `{grade}` has a non-finite bound.")]
    NonFiniteBound {
        /// Label of the offending band.
        grade: String,
    },
    /// A band's minimum exceeds its maximum.
    #[error("Band `{grade}` has min_marks {min} above max_marks {max}.")]
    Inverted {
        /// Label of the offending band.
        grade: String,
        /// The band's minimum.
        min:   f64,
        /// The band's maximum.
        max:   f64,
    },
    /// A band reaches outside `[0, 100]`.
    #[error("Band `{grade}` spans {min}..={max}, outside 0..=100.")]
    OutOfRange {
        /// Label of the offending band.
        grade: String,
        /// The band's minimum.
        min:   f64,
        /// The band's maximum.
        max:   f64,
    },
}

/// Why a scale fetch did not produce usable rows.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FetchFailure {
    /// `SUPABASE_URL`/`SUPABASE_ANON_KEY` are not set.
    #[error("Supabase credentials are not configured.")]
    NotConfigured,
    /// The request never completed.
    #[error("Request to the grading scale store failed: {0}")]
    Transport(String),
    /// The store answered with a non-success status.
    #[error("Grading scale store returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, usually a PostgREST error object.
        body:   String,
    },
    /// The response body did not decode into scale rows.
    #[error("Could not decode grading scale rows: {0}")]
    Decode(String),
    /// The store returned zero active rows.
    #[error("Grading scale store returned no active bands.")]
    Empty,
    /// The rows decoded but do not form a valid scale.
    #[error("Grading scale rows are malformed: {0}")]
    Malformed(#[from] ScaleError),
    /// The fetch did not finish within the configured timeout.
    #[error("Grading scale fetch timed out after {0:?}.")]
    TimedOut(std::time::Duration),
}
