#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use bon::Builder;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::{constants::DEFAULT_BANDS, error::ScaleError};

#[derive(Tabled, Clone, Debug, PartialEq, Builder, Serialize, Deserialize)]
#[builder(on(String, into))]
/// One row of a grading scale
pub struct GradeBand {
    #[tabled(rename = "Grade")]
    /// * `grade`: short label, eg. `B+`
    #[builder(getter)]
    pub grade:     String,
    #[tabled(rename = "Min")]
    /// * `min_marks`: inclusive lower percentage bound
    #[builder(getter)]
    pub min_marks: f64,
    #[tabled(rename = "Max")]
    /// * `max_marks`: inclusive upper percentage bound
    #[builder(getter)]
    pub max_marks: f64,
    #[tabled(rename = "Points")]
    /// * `points`: weight used when aggregating grades elsewhere
    #[builder(getter)]
    pub points:    i32,
    #[tabled(rename = "Remarks")]
    /// * `remarks`: human readable descriptor
    #[builder(getter)]
    pub remarks:   String,
}

impl GradeBand {
    /// Creates a new band -
    /// * `grade` - the letter grade
    /// * `min_marks`, `max_marks` - inclusive percentage bounds
    /// * `points` - the band's point value
    /// * `remarks` - descriptor shown next to the grade
    pub fn new(
        grade: impl Into<String>,
        min_marks: f64,
        max_marks: f64,
        points: i32,
        remarks: impl Into<String>,
    ) -> Self {
        Self {
            grade: grade.into(),
            min_marks,
            max_marks,
            points,
            remarks: remarks.into(),
        }
    }

    /// Whether `percentage` lies within this band, both ends inclusive.
    pub fn contains(&self, percentage: f64) -> bool {
        percentage >= self.min_marks && percentage <= self.max_marks
    }

    /// Checks the band's bounds on their own, without regard to neighbours.
    fn check(&self) -> Result<(), ScaleError> {
        if !self.min_marks.is_finite() || !self.max_marks.is_finite() {
            return Err(ScaleError::NonFiniteBound {
                grade: self.grade.clone(),
            });
        }
        if self.min_marks > self.max_marks {
            return Err(ScaleError::Inverted {
                grade: self.grade.clone(),
                min:   self.min_marks,
                max:   self.max_marks,
            });
        }
        if self.min_marks < 0.0 || self.max_marks > 100.0 {
            return Err(ScaleError::OutOfRange {
                grade: self.grade.clone(),
                min:   self.min_marks,
                max:   self.max_marks,
            });
        }
        Ok(())
    }
}

impl Display for GradeBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}..={}, {} points, {})",
            self.grade, self.min_marks, self.max_marks, self.points, self.remarks
        )
    }
}

/// How a percentage was matched to a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BandMatch {
    /// The percentage lies inside the returned band.
    Contained,
    /// No band contained the percentage, so the last band of the scale was
    /// returned.
    FallbackToLast,
}

/// Shape problems in a scale that do not stop it from being used.
///
/// Bands are treated as whole-percentage ranges, so `75..=79` followed by
/// `80..=100` is contiguous.
#[derive(Debug, Clone, PartialEq)]
pub enum ScaleIssue {
    /// Band at `index` has a higher `min_marks` than the band before it.
    OutOfOrder {
        /// Position of the band in the scale.
        index: usize,
    },
    /// Percentages strictly between `below` and `above` are not covered.
    ///
    /// Only whole-percentage gaps are reported. The fractional space between
    /// `75..=79` and `80..=100` is not, even though `79.5` falls through to
    /// the last band.
    Gap {
        /// Upper bound of the lower band.
        below: f64,
        /// Lower bound of the upper band.
        above: f64,
    },
    /// Two bands share percentages.
    Overlap {
        /// The higher band.
        upper: String,
        /// The lower band.
        lower: String,
    },
    /// The highest band stops short of 100.
    UncoveredTop(f64),
    /// The lowest band starts above 0.
    UncoveredBottom(f64),
}

impl Display for ScaleIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaleIssue::OutOfOrder { index } => {
                write!(f, "band #{index} is not in descending min_marks order")
            }
            ScaleIssue::Gap { below, above } => {
                write!(f, "no band covers percentages between {below} and {above}")
            }
            ScaleIssue::Overlap { upper, lower } => {
                write!(f, "bands `{upper}` and `{lower}` overlap")
            }
            ScaleIssue::UncoveredTop(max) => write!(f, "no band covers percentages above {max}"),
            ScaleIssue::UncoveredBottom(min) => {
                write!(f, "no band covers percentages below {min}")
            }
        }
    }
}

/// An ordered, non-empty sequence of grade bands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradingScale {
    /// Bands in the order they are scanned.
    bands: Vec<GradeBand>,
}

impl GradingScale {
    /// Builds a scale, rejecting empty input and bands with unusable bounds.
    /// Ordering, gaps and overlaps are left to [`GradingScale::issues`].
    pub fn new(bands: Vec<GradeBand>) -> Result<Self, ScaleError> {
        if bands.is_empty() {
            return Err(ScaleError::Empty);
        }
        bands.iter().try_for_each(GradeBand::check)?;
        Ok(Self { bands })
    }

    /// The built-in twelve band scale.
    pub fn default_scale() -> Self {
        let bands = DEFAULT_BANDS
            .iter()
            .map(|&(grade, min, max, points, remarks)| {
                GradeBand::new(grade, min, max, points, remarks)
            })
            .collect();
        Self { bands }
    }

    /// Bands in scan order.
    pub fn bands(&self) -> &[GradeBand] {
        &self.bands
    }

    /// The band returned when nothing else matches.
    pub fn last(&self) -> &GradeBand {
        // never empty, see `new`
        &self.bands[self.bands.len() - 1]
    }

    /// Returns the first band containing `percentage`, or the last band when
    /// none does.
    pub fn locate(&self, percentage: f64) -> (&GradeBand, BandMatch) {
        match self.bands.iter().find(|band| band.contains(percentage)) {
            Some(band) => (band, BandMatch::Contained),
            None => (self.last(), BandMatch::FallbackToLast),
        }
    }

    /// Lists ordering, coverage and overlap problems.
    pub fn issues(&self) -> Vec<ScaleIssue> {
        let mut issues: Vec<ScaleIssue> = self
            .bands
            .iter()
            .tuple_windows()
            .enumerate()
            .filter(|(_, (prev, next))| next.min_marks > prev.min_marks)
            .map(|(i, _)| ScaleIssue::OutOfOrder { index: i + 1 })
            .collect();

        let sorted: Vec<&GradeBand> = self
            .bands
            .iter()
            .sorted_by(|a, b| b.min_marks.total_cmp(&a.min_marks))
            .collect();

        for (upper, lower) in sorted.iter().tuple_windows() {
            if lower.max_marks >= upper.min_marks {
                issues.push(ScaleIssue::Overlap {
                    upper: upper.grade.clone(),
                    lower: lower.grade.clone(),
                });
            } else if upper.min_marks - lower.max_marks > 1.0 {
                issues.push(ScaleIssue::Gap {
                    below: lower.max_marks,
                    above: upper.min_marks,
                });
            }
        }

        let top = sorted.iter().map(|b| b.max_marks).fold(f64::MIN, f64::max);
        if top < 100.0 {
            issues.push(ScaleIssue::UncoveredTop(top));
        }
        let bottom = sorted.iter().map(|b| b.min_marks).fold(f64::MAX, f64::min);
        if bottom > 0.0 {
            issues.push(ScaleIssue::UncoveredBottom(bottom));
        }

        issues
    }
}

impl Default for GradingScale {
    fn default() -> Self {
        Self::default_scale()
    }
}
