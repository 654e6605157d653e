#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Default table holding grade band configuration rows.
pub const DEFAULT_SCALE_TABLE: &str = "grading_system";

/// Columns selected from the grade band table.
pub const SCALE_COLUMNS: &str = "grade_letter,min_marks,max_marks,points,remarks";

/// Default timeout, in seconds, around the grading scale fetch.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Built-in grading scale, highest band first.
///
/// Columns: grade, min marks, max marks, points, remarks. Used whenever the
/// configured scale cannot be loaded, so it must stay identical to what
/// existing deployments ship.
pub const DEFAULT_BANDS: [(&str, f64, f64, i32, &str); 12] = [
    ("A", 80.0, 100.0, 12, "Excellent"),
    ("A–", 75.0, 79.0, 11, "Very Good"),
    ("B+", 70.0, 74.0, 10, "Good"),
    ("B", 65.0, 69.0, 9, "Above Average"),
    ("B–", 60.0, 64.0, 8, "Average"),
    ("C+", 55.0, 59.0, 7, "Fairly Good"),
    ("C", 50.0, 54.0, 6, "Fair"),
    ("C–", 45.0, 49.0, 5, "Fair but Weak"),
    ("D+", 40.0, 44.0, 4, "Poor"),
    ("D", 35.0, 39.0, 3, "Very Poor"),
    ("D–", 30.0, 34.0, 2, "Weak"),
    ("E", 0.0, 29.0, 1, "Fail"),
];
