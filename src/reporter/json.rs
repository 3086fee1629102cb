//! JSON reporter for machine-readable output

use crate::grader::{ClassStats, Gradebook, SkippedRecord};
use crate::{GradeReport, QuestionScore};
use serde::Serialize;

/// Reporter for JSON output
pub struct JsonReporter {
    /// Whether to pretty-print JSON
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Enable pretty-printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Report a graded submission as JSON
    pub fn report(&self, report: &GradeReport) -> String {
        self.to_json(report, "{}")
    }

    /// Report one question score as JSON
    pub fn report_question(&self, score: &QuestionScore) -> String {
        self.to_json(score, "{}")
    }

    /// Report a whole gradebook: one entry per student plus class summary
    pub fn report_gradebook(&self, book: &Gradebook) -> String {
        let output = JsonGradebook {
            results: book
                .rows
                .iter()
                .map(|row| JsonRow {
                    source: row.source.display().to_string(),
                    report: &row.report,
                })
                .collect(),
            summary: &book.stats,
            skipped: &book.skipped,
        };
        self.to_json(&output, "{}")
    }

    fn to_json<T: Serialize + ?Sized>(&self, value: &T, fallback: &str) -> String {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        json.unwrap_or_else(|_| fallback.to_string())
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonGradebook<'a> {
    results: Vec<JsonRow<'a>>,
    summary: &'a ClassStats,
    skipped: &'a [SkippedRecord],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonRow<'a> {
    source: String,
    #[serde(flatten)]
    report: &'a GradeReport,
}
