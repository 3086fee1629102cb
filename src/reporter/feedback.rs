//! Plain-text feedback reports, one file per student

use crate::error::{GradeError, Result};
use crate::grader::{Gradebook, ScoreCalculator};
use crate::rubric::Rubric;
use crate::submission::sanitize_name;
use crate::GradeReport;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// `Ada_Lovelace_feedback.txt`
pub fn feedback_file_name(report: &GradeReport) -> String {
    format!("{}_feedback.txt", sanitize_name(&report.student.display_name()))
}

pub fn render_feedback(report: &GradeReport, rubric: &Rubric, title: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "Student: {} (ID: {})", report.student.display_name(), report.student.id);
    let _ = writeln!(out, "Submission Time: {}", report.submitted_at);
    let _ = writeln!(
        out,
        "Total Score: {}/{} ({:.1}%) - Grade {}",
        report.total_earned, report.total_possible, report.percentage, report.grade
    );
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out);

    for q in &report.questions {
        let _ = writeln!(
            out,
            "Question {}: {}/{} points",
            q.question_number, q.earned, q.max_points
        );
        if !q.answered {
            let _ = writeln!(out, "(no answer submitted)");
        }
        let _ = writeln!(out, "{}", q.feedback());
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "Suggestions for Improvement:");
    for suggestion in ScoreCalculator::suggestions(report, rubric) {
        let _ = writeln!(out, "- {}", suggestion);
    }
    out
}

/// Write a feedback file for every graded row into `dir`, creating it if needed
pub fn write_feedback_reports(
    book: &Gradebook,
    rubric: &Rubric,
    title: &str,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|source| GradeError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(book.rows.len());
    for row in &book.rows {
        let path = dir.join(feedback_file_name(&row.report));
        if written.contains(&path) {
            tracing::warn!(path = %path.display(), "two students share a feedback file name; later one wins");
        }
        fs::write(&path, render_feedback(&row.report, rubric, title)).map_err(|source| {
            GradeError::Write {
                path: path.clone(),
                source,
            }
        })?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grader::{ClassStats, GradebookRow, GradingEngine};
    use crate::submission::{AssignmentInfo, StudentInfo, Submission};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn report(first: &str, last: &str) -> GradeReport {
        let submission = Submission {
            student: StudentInfo::new(first, last, "S9"),
            assignment: AssignmentInfo {
                course: "CSCI 1436".to_string(),
                name: "Assignment #1".to_string(),
                total_points: 100,
                submitted_at: "2024-09-01T10:00:00".to_string(),
            },
            answers: BTreeMap::new(),
        };
        GradingEngine::new(Rubric::builtin().unwrap()).grade(&submission)
    }

    #[test]
    fn test_feedback_file_name() {
        assert_eq!(
            feedback_file_name(&report("Mary Ann", "Evans")),
            "Mary_Ann_Evans_feedback.txt"
        );
    }

    #[test]
    fn test_render_feedback_sections() {
        let rubric = Rubric::builtin().unwrap();
        let text = render_feedback(&report("Ada", "Lovelace"), &rubric, "CSCI 1436 - Assignment #1");
        assert!(text.starts_with("CSCI 1436 - Assignment #1\n"));
        assert!(text.contains("Student: Ada Lovelace (ID: S9)"));
        assert!(text.contains("Total Score: 0/100 (0.0%) - Grade F"));
        assert!(text.contains("Question 1: 0/40 points"));
        assert!(text.contains("(no answer submitted)"));
        assert!(text.contains("Suggestions for Improvement:\n- Q1: no answer was submitted"));
    }

    #[test]
    fn test_write_feedback_reports() {
        let dir = TempDir::new().unwrap();
        let out_dir = dir.path().join("feedback_reports");
        let rubric = Rubric::builtin().unwrap();
        let reports = [report("Ada", "Lovelace"), report("Alan", "Turing")];
        let book = Gradebook {
            rows: reports
                .iter()
                .map(|r| GradebookRow {
                    source: PathBuf::new(),
                    report: r.clone(),
                })
                .collect(),
            skipped: vec![],
            stats: ClassStats::from_reports(&reports, 60.0),
        };

        let written = write_feedback_reports(&book, &rubric, "title", &out_dir).unwrap();
        assert_eq!(written.len(), 2);
        assert!(out_dir.join("Ada_Lovelace_feedback.txt").is_file());
        let text = fs::read_to_string(out_dir.join("Alan_Turing_feedback.txt")).unwrap();
        assert!(text.contains("Alan Turing"));
    }
}
