#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{fmt::Display, time::Duration};

use serde::Serialize;

use crate::{
    config,
    constants::DEFAULT_FETCH_TIMEOUT_SECS,
    error::{FetchFailure, GradeError},
    scale::{BandMatch, GradeBand, GradingScale},
    store::{ScaleProvider, SupabaseScaleProvider},
};

/// Result of classifying one score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// The band the score landed in.
    pub band:       GradeBand,
    /// `marks / max_marks * 100`
    pub percentage: f64,
    /// Whether the band contains the percentage or was the last-band
    /// fallback.
    pub matched:    BandMatch,
}

impl Classification {
    /// Letter grade of the band.
    pub fn grade(&self) -> &str {
        &self.band.grade
    }

    /// Point value of the band.
    pub fn points(&self) -> i32 {
        self.band.points
    }

    /// Remarks of the band.
    pub fn remarks(&self) -> &str {
        &self.band.remarks
    }
}

impl Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.2}% -> {} ({} points, {})",
            self.percentage, self.band.grade, self.band.points, self.band.remarks
        )
    }
}

/// Checks a score pair and returns its percentage.
pub fn percentage(marks: f64, max_marks: f64) -> Result<f64, GradeError> {
    if !marks.is_finite() {
        return Err(GradeError::NonFinite {
            name:  "marks",
            value: marks,
        });
    }
    if !max_marks.is_finite() {
        return Err(GradeError::NonFinite {
            name:  "max_marks",
            value: max_marks,
        });
    }
    if max_marks <= 0.0 {
        return Err(GradeError::NonPositiveMaxMarks(max_marks));
    }
    if marks < 0.0 {
        return Err(GradeError::NegativeMarks(marks));
    }
    let pct = marks / max_marks * 100.0;
    if !pct.is_finite() {
        return Err(GradeError::NonFinite {
            name:  "percentage",
            value: pct,
        });
    }
    Ok(pct)
}

/// Classifies a score against a scale already in hand. Never fetches.
///
/// Scans the bands in order and returns the first one containing the
/// percentage; if none does, returns the scale's last band.
pub fn classify_with(
    scale: &GradingScale,
    marks: f64,
    max_marks: f64,
) -> Result<Classification, GradeError> {
    let percentage = percentage(marks, max_marks)?;
    let (band, matched) = scale.locate(percentage);
    if matched == BandMatch::FallbackToLast {
        tracing::warn!(
            "No grade band contains {percentage:.2}%; using last band `{}`. Check the grading \
             scale for gaps.",
            band.grade
        );
    }
    Ok(Classification {
        band: band.clone(),
        percentage,
        matched,
    })
}

/// Maps scores to grade bands using a scale fetched from `P` on every call.
///
/// If the fetch fails, times out, or returns rows that do not form a scale,
/// the built-in default scale is used instead. Only invalid input is ever
/// reported to the caller.
#[derive(Debug, Clone)]
pub struct GradeResolver<P> {
    /// Where the active scale comes from.
    provider: P,
    /// Upper bound on how long a fetch may take.
    timeout:  Duration,
}

impl GradeResolver<SupabaseScaleProvider> {
    /// Resolver reading the scale from the configured Supabase table.
    pub fn from_config() -> Self {
        let cfg = config::get();
        Self::new(cfg.scale_provider()).with_timeout(cfg.fetch_timeout())
    }
}

impl<P: ScaleProvider> GradeResolver<P> {
    /// Creates a resolver around `provider` with the default fetch timeout.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }

    /// Overrides the fetch timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetches the active scale, or the reason it could not be used.
    pub async fn try_load_scale(&self) -> Result<GradingScale, FetchFailure> {
        match tokio::time::timeout(self.timeout, self.provider.fetch_scale()).await {
            Ok(fetch) => fetch.into_scale(),
            Err(_) => Err(FetchFailure::TimedOut(self.timeout)),
        }
    }

    /// Fetches the active scale, falling back to the default scale on any
    /// failure.
    pub async fn load_scale(&self) -> GradingScale {
        match self.try_load_scale().await {
            Ok(scale) => {
                let issues = scale.issues();
                if !issues.is_empty() {
                    tracing::warn!(
                        "Grading scale has {} issue(s): {}",
                        issues.len(),
                        itertools::join(&issues, "; ")
                    );
                }
                scale
            }
            Err(e) => {
                tracing::warn!("{e} Falling back to the default grading scale.");
                GradingScale::default_scale()
            }
        }
    }

    /// Classifies `marks` out of `max_marks` against a freshly loaded scale.
    pub async fn classify(&self, marks: f64, max_marks: f64) -> Result<Classification, GradeError> {
        // validate before paying for a fetch
        percentage(marks, max_marks)?;
        let scale = self.load_scale().await;
        classify_with(&scale, marks, max_marks)
    }

    /// Like [`GradeResolver::classify`], returning only the letter grade.
    pub async fn grade_letter(&self, marks: f64, max_marks: f64) -> Result<String, GradeError> {
        Ok(self.classify(marks, max_marks).await?.band.grade)
    }

    /// Grade for aggregate totals across subjects. Same algorithm as
    /// [`GradeResolver::classify`].
    pub async fn overall_grade(
        &self,
        total_marks: f64,
        total_max_marks: f64,
    ) -> Result<Classification, GradeError> {
        self.classify(total_marks, total_max_marks).await
    }

    /// Loads the scale once and classifies every `(marks, max_marks)` pair
    /// against it. Results keep the input order.
    pub async fn classify_batch<I>(&self, scores: I) -> Vec<Result<Classification, GradeError>>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let scale = self.load_scale().await;
        scores
            .into_iter()
            .map(|(marks, max_marks)| classify_with(&scale, marks, max_marks))
            .collect()
    }
}
