//! CSV gradebook export for LMS import

use crate::error::{GradeError, Result};
use crate::grader::Gradebook;
use crate::rubric::Rubric;
use chrono::{DateTime, Local, NaiveDateTime};
use std::borrow::Cow;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Writes RFC 4180 rows: comma separated, CRLF terminated, fields quoted
/// when they contain a comma, quote or line break.
pub struct CsvWriter<W: Write> {
    out: W,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write_row<S: AsRef<str>>(&mut self, fields: &[S]) -> io::Result<()> {
        let line = fields
            .iter()
            .map(|f| quote(f.as_ref()))
            .collect::<Vec<_>>()
            .join(",");
        self.out.write_all(line.as_bytes())?;
        self.out.write_all(b"\r\n")
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn quote(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Header row: identity, then Score/Max/Percent per rubric question, then totals
pub fn header(rubric: &Rubric) -> Vec<String> {
    let mut header = vec![
        "Student Name".to_string(),
        "Student ID".to_string(),
        "Submission Date".to_string(),
    ];
    for q in rubric.questions() {
        header.push(format!("Q{} Score", q.number));
        header.push(format!("Q{} Max", q.number));
        header.push(format!("Q{} Percent", q.number));
    }
    header.extend([
        "Total Score".to_string(),
        "Total Possible".to_string(),
        "Final Percentage".to_string(),
    ]);
    header
}

/// Write the gradebook as CSV
pub fn write_gradebook<W: Write>(book: &Gradebook, rubric: &Rubric, out: W) -> io::Result<W> {
    let mut writer = CsvWriter::new(out);
    writer.write_row(&header(rubric))?;

    for row in &book.rows {
        let report = &row.report;
        let mut fields = vec![
            report.student.display_name(),
            report.student.id.clone(),
            format_submission_date(&report.submitted_at),
        ];
        for q in rubric.questions() {
            match report.question(&q.id) {
                Some(score) => fields.extend([
                    score.earned.to_string(),
                    score.max_points.to_string(),
                    format!("{:.1}%", score.percentage),
                ]),
                None => fields.extend([String::new(), q.max_points.to_string(), String::new()]),
            }
        }
        fields.extend([
            report.total_earned.to_string(),
            report.total_possible.to_string(),
            format!("{:.1}%", report.percentage),
        ]);
        writer.write_row(&fields)?;
    }

    Ok(writer.into_inner())
}

/// Export the gradebook to a CSV file
pub fn export_gradebook(book: &Gradebook, rubric: &Rubric, path: &Path) -> Result<()> {
    let to_write_error = |source| GradeError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = fs::File::create(path).map_err(to_write_error)?;
    let mut file = write_gradebook(book, rubric, io::BufWriter::new(file)).map_err(to_write_error)?;
    file.flush().map_err(to_write_error)?;
    tracing::debug!(path = %path.display(), rows = book.rows.len(), "gradebook exported");
    Ok(())
}

/// Timestamped export name, e.g. `csci1436_assignment1_grades_20240901_100000.csv`
pub fn default_export_path(dir: &Path, course: &str, assignment: &str) -> PathBuf {
    let slug = |s: &str| -> String {
        s.chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase()
    };
    dir.join(format!(
        "{}_{}_grades_{}.csv",
        slug(course),
        slug(assignment),
        Local::now().format("%Y%m%d_%H%M%S")
    ))
}

/// Render a record timestamp as `MM/DD/YYYY HH:MM AM`; unparseable values pass through
pub fn format_submission_date(raw: &str) -> String {
    const DISPLAY: &str = "%m/%d/%Y %I:%M %p";
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DISPLAY).to_string();
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(dt) => dt.format(DISPLAY).to_string(),
        Err(_) => raw.to_string(),
    }
}
