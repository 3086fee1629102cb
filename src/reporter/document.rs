//! Document output used for submission proofs

use crate::error::{GradeError, Result};
use crate::rubric::Rubric;
use crate::submission::Submission;
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Writes a titled document made of plain paragraphs
pub trait DocumentWriter {
    fn render(&self, heading: &str, paragraphs: &[String], path: &Path) -> Result<()>;

    /// File extension (without dot) of the documents this writer produces
    fn extension(&self) -> &'static str;
}

/// Markdown-flavoured plain text: `# heading`, then blank-line separated paragraphs
#[derive(Debug, Default, Clone, Copy)]
pub struct TextDocumentWriter;

impl TextDocumentWriter {
    pub fn to_text(heading: &str, paragraphs: &[String]) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# {}", heading);
        for paragraph in paragraphs {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", paragraph);
        }
        out
    }
}

impl DocumentWriter for TextDocumentWriter {
    fn render(&self, heading: &str, paragraphs: &[String], path: &Path) -> Result<()> {
        fs::write(path, Self::to_text(heading, paragraphs)).map_err(|source| GradeError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn extension(&self) -> &'static str {
        "md"
    }
}

/// Heading and paragraphs of the proof-of-submission document: identity and
/// timestamp first, then every rubric question followed by the recorded answer
pub fn submission_proof(
    submission: &Submission,
    rubric: &Rubric,
    submitted: DateTime<Local>,
) -> (String, Vec<String>) {
    let heading = format!(
        "{} {} - Submission Proof",
        submission.assignment.course, submission.assignment.name
    );
    let mut paragraphs = vec![
        format!("Student: {}", submission.student.display_name()),
        format!("Student ID: {}", submission.student.id),
        format!("Submitted: {}", submitted.format("%B %d, %Y at %I:%M %p")),
        "This document serves as proof of assignment submission. \
         Answers have been recorded for autograding."
            .to_string(),
        format!(
            "Questions answered: {} of {} | Total Points: {}",
            submission.answers.len(),
            rubric.questions().len(),
            rubric.total_points()
        ),
    ];

    for question in rubric.questions() {
        let answer = submission
            .answers
            .get(&question.id)
            .map(|entry| entry.answer.trim_end())
            .filter(|a| !a.trim().is_empty())
            .unwrap_or("(no answer)");
        paragraphs.push(format!("Question {}:\n{}", question.number, question.prompt));
        paragraphs.push(format!("Answer:\n{}", answer));
    }
    (heading, paragraphs)
}
