//! Tests for scale loading and the default-scale fallback.

use std::time::Duration;

use gradescale::{
    BandMatch, FetchFailure, GradeBand, GradeError, GradeResolver, GradingScale, ScaleFetch,
    ScaleProvider, ScaleRow, StaticScaleProvider, SupabaseScaleProvider,
};

/// Provider returning a canned outcome.
struct Canned(ScaleFetch);

impl ScaleProvider for Canned {
    async fn fetch_scale(&self) -> ScaleFetch {
        self.0.clone()
    }
}

/// Provider that never answers in time.
struct Stalled;

impl ScaleProvider for Stalled {
    async fn fetch_scale(&self) -> ScaleFetch {
        tokio::time::sleep(Duration::from_secs(30)).await;
        ScaleFetch::Rows(vec![])
    }
}

fn row(grade: &str, min: f64, max: f64, points: i32) -> ScaleRow {
    ScaleRow {
        grade_letter: grade.into(),
        min_marks: min,
        max_marks: max,
        points,
        remarks: format!("{grade} remarks"),
    }
}

#[tokio::test]
async fn network_failure_loads_exact_default_scale() {
    let resolver = GradeResolver::new(Canned(ScaleFetch::Failed(FetchFailure::Transport(
        "connection refused".into(),
    ))));

    assert_eq!(resolver.load_scale().await, GradingScale::default_scale());

    let err = resolver.try_load_scale().await.unwrap_err();
    assert!(matches!(err, FetchFailure::Transport(_)));
}

#[tokio::test]
async fn default_scale_matches_published_table() {
    let expected = [
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
    let expected: Vec<GradeBand> = expected
        .into_iter()
        .map(|(g, min, max, p, r)| GradeBand::new(g, min, max, p, r))
        .collect();

    let resolver = GradeResolver::new(Canned(ScaleFetch::Failed(FetchFailure::NotConfigured)));
    assert_eq!(resolver.load_scale().await.bands(), expected.as_slice());
}

#[tokio::test]
async fn store_error_status_falls_back() {
    let resolver = GradeResolver::new(Canned(ScaleFetch::Failed(FetchFailure::Status {
        status: 404,
        body:   r#"{"message":"relation does not exist"}"#.into(),
    })));

    let c = resolver.classify(80.0, 100.0).await.unwrap();
    assert_eq!(c.grade(), "A");
    assert_eq!(c.points(), 12);
}

#[tokio::test]
async fn empty_and_malformed_rows_fall_back() {
    let empty = GradeResolver::new(Canned(ScaleFetch::Rows(vec![])));
    assert_eq!(empty.try_load_scale().await, Err(FetchFailure::Empty));
    assert_eq!(empty.load_scale().await, GradingScale::default_scale());

    let inverted = GradeResolver::new(Canned(ScaleFetch::Rows(vec![
        row("P", 50.0, 100.0, 2),
        row("F", 49.0, 0.0, 1),
    ])));
    assert_eq!(inverted.load_scale().await, GradingScale::default_scale());
}

#[tokio::test]
async fn slow_provider_times_out_to_default() {
    let resolver = GradeResolver::new(Stalled).with_timeout(Duration::from_millis(20));

    assert_eq!(
        resolver.try_load_scale().await,
        Err(FetchFailure::TimedOut(Duration::from_millis(20)))
    );
    assert_eq!(resolver.grade_letter(0.0, 100.0).await.unwrap(), "E");
}

#[tokio::test]
async fn unconfigured_supabase_grades_with_default_scale() {
    let resolver = GradeResolver::new(SupabaseScaleProvider::new(None, "grading_system"));
    assert_eq!(resolver.grade_letter(79.0, 100.0).await.unwrap(), "A–");
}

#[tokio::test]
async fn configured_scale_is_used_in_given_order() {
    let resolver = GradeResolver::new(Canned(ScaleFetch::Rows(vec![
        row("Distinction", 70.0, 100.0, 3),
        row("Pass", 40.0, 69.0, 2),
        row("Fail", 0.0, 39.0, 1),
    ])));

    let c = resolver.classify(35.0, 50.0).await.unwrap();
    assert_eq!(c.grade(), "Distinction");
    assert_eq!(c.matched, BandMatch::Contained);
    assert_eq!(resolver.grade_letter(20.0, 50.0).await.unwrap(), "Pass");
}

#[tokio::test]
async fn gap_in_configured_scale_uses_last_band() {
    let resolver = GradeResolver::new(Canned(ScaleFetch::Rows(vec![
        row("A", 70.0, 100.0, 3),
        row("B", 40.0, 59.0, 2),
        row("F", 0.0, 29.0, 1),
    ])));

    let c = resolver.classify(65.0, 100.0).await.unwrap();
    assert_eq!(c.grade(), "F");
    assert_eq!(c.matched, BandMatch::FallbackToLast);
}

#[tokio::test]
async fn invalid_input_is_rejected_before_fetching() {
    let resolver = GradeResolver::new(Stalled).with_timeout(Duration::from_secs(30));

    // would hang for 30s if the scale were fetched first
    let err = resolver.classify(10.0, 0.0).await.unwrap_err();
    assert_eq!(err, GradeError::NonPositiveMaxMarks(0.0));

    assert!(resolver.overall_grade(f64::NAN, 100.0).await.is_err());
    assert!(resolver.grade_letter(-3.0, 10.0).await.is_err());
}

#[tokio::test]
async fn batch_keeps_order_and_per_entry_errors() {
    let resolver = GradeResolver::new(StaticScaleProvider::default());
    let results = resolver
        .classify_batch([(80.0, 100.0), (5.0, 0.0), (33.0, 50.0), (58.0, 100.0)])
        .await;

    assert_eq!(results.len(), 4);
    assert_eq!(results[0].as_ref().unwrap().grade(), "A");
    assert_eq!(results[1], Err(GradeError::NonPositiveMaxMarks(0.0)));
    assert_eq!(results[2].as_ref().unwrap().grade(), "B");
    assert_eq!(results[3].as_ref().unwrap().grade(), "C+");
}
