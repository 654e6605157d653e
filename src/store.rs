#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::future::Future;

use postgrest::Postgrest;
use serde::{Deserialize, Serialize};

use crate::{
    constants::SCALE_COLUMNS,
    error::FetchFailure,
    scale::{GradeBand, GradingScale},
};

/// Schema for the grade band configuration table
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScaleRow {
    /// Letter grade, eg. `A` or `B+`
    pub grade_letter: String,
    /// Inclusive lower percentage bound
    pub min_marks:    f64,
    /// Inclusive upper percentage bound
    pub max_marks:    f64,
    /// Point value of the band
    pub points:       i32,
    /// Descriptor shown next to the grade
    pub remarks:      String,
}

impl From<ScaleRow> for GradeBand {
    fn from(row: ScaleRow) -> Self {
        GradeBand::new(row.grade_letter, row.min_marks, row.max_marks, row.points, row.remarks)
    }
}

/// Outcome of asking a provider for the active scale.
#[derive(Debug, Clone, PartialEq)]
pub enum ScaleFetch {
    /// Rows came back, in the order the store returned them.
    Rows(Vec<ScaleRow>),
    /// A scale the provider already had in hand.
    Ready(GradingScale),
    /// The fetch failed.
    Failed(FetchFailure),
}

impl ScaleFetch {
    /// Turns the outcome into a usable scale or the reason there is none.
    ///
    /// Zero rows and rows that do not form a valid scale are failures, same
    /// as a transport error.
    pub fn into_scale(self) -> Result<GradingScale, FetchFailure> {
        match self {
            ScaleFetch::Rows(rows) if rows.is_empty() => Err(FetchFailure::Empty),
            ScaleFetch::Rows(rows) => {
                let bands = rows.into_iter().map(GradeBand::from).collect();
                Ok(GradingScale::new(bands)?)
            }
            ScaleFetch::Ready(scale) => Ok(scale),
            ScaleFetch::Failed(reason) => Err(reason),
        }
    }
}

/// Something that can produce the active grading scale.
pub trait ScaleProvider {
    /// Fetches the active scale. Failures are reported through
    /// [`ScaleFetch::Failed`] instead of an `Err`.
    fn fetch_scale(&self) -> impl Future<Output = ScaleFetch> + Send;
}

/// Reads the active scale from a Supabase PostgREST table.
#[derive(Clone)]
pub struct SupabaseScaleProvider {
    /// Client pointed at `<project>/rest/v1`; `None` if Supabase is not
    /// configured.
    client: Option<Postgrest>,
    /// Table holding the band rows.
    table:  String,
}

impl SupabaseScaleProvider {
    /// Creates a provider reading from `table`.
    pub fn new(client: Option<Postgrest>, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// Table this provider reads from.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Issues the read; any failure is returned as `Err` for
    /// [`ScaleProvider::fetch_scale`] to fold into [`ScaleFetch::Failed`].
    async fn read_rows(&self) -> Result<Vec<ScaleRow>, FetchFailure> {
        let client = self.client.as_ref().ok_or(FetchFailure::NotConfigured)?;

        let resp = client
            .from(&self.table)
            .select(SCALE_COLUMNS)
            .eq("is_active", "true")
            .order("min_marks.desc")
            .execute()
            .await
            .map_err(|e| FetchFailure::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| FetchFailure::Transport(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| FetchFailure::Decode(e.to_string()))
    }
}

impl ScaleProvider for SupabaseScaleProvider {
    async fn fetch_scale(&self) -> ScaleFetch {
        match self.read_rows().await {
            Ok(rows) => {
                tracing::debug!("Fetched {} grade bands from `{}`", rows.len(), self.table);
                ScaleFetch::Rows(rows)
            }
            Err(e) => ScaleFetch::Failed(e),
        }
    }
}

/// Hands out a scale the caller already holds.
#[derive(Debug, Clone, Default)]
pub struct StaticScaleProvider {
    /// The scale to return.
    scale: GradingScale,
}

impl StaticScaleProvider {
    /// Wraps `scale`.
    pub fn new(scale: GradingScale) -> Self {
        Self { scale }
    }
}

impl ScaleProvider for StaticScaleProvider {
    async fn fetch_scale(&self) -> ScaleFetch {
        ScaleFetch::Ready(self.scale.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScaleError;

    fn row(grade: &str, min: f64, max: f64) -> ScaleRow {
        ScaleRow {
            grade_letter: grade.into(),
            min_marks:    min,
            max_marks:    max,
            points:       1,
            remarks:      "r".into(),
        }
    }

    #[test]
    fn rows_decode_from_postgrest_json() {
        let body = r#"[
            {"grade_letter": "A", "min_marks": 80, "max_marks": 100, "points": 12, "remarks": "Excellent"},
            {"grade_letter": "E", "min_marks": 0, "max_marks": 79.5, "points": 1, "remarks": "Fail"}
        ]"#;
        let rows: Vec<ScaleRow> = serde_json::from_str(body).expect("decode rows");
        let scale = ScaleFetch::Rows(rows).into_scale().expect("valid scale");

        assert_eq!(scale.bands()[0].grade, "A");
        assert_eq!(scale.bands()[0].points, 12);
        assert_eq!(scale.last().max_marks, 79.5);
    }

    #[test]
    fn empty_and_malformed_rows_are_failures() {
        assert_eq!(ScaleFetch::Rows(vec![]).into_scale(), Err(FetchFailure::Empty));
        assert!(matches!(
            ScaleFetch::Rows(vec![row("A", 90.0, 80.0)]).into_scale(),
            Err(FetchFailure::Malformed(ScaleError::Inverted { .. }))
        ));
    }

    #[tokio::test]
    async fn unconfigured_supabase_reports_not_configured() {
        let provider = SupabaseScaleProvider::new(None, "grading_system");
        assert_eq!(provider.table(), "grading_system");
        assert_eq!(
            provider.fetch_scale().await,
            ScaleFetch::Failed(FetchFailure::NotConfigured)
        );
    }
}
