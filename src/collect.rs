//! Interactive answer collection: the student side of the workflow

use crate::reporter::document::submission_proof;
use crate::reporter::DocumentWriter;
use crate::rubric::{Question, Rubric};
use crate::submission::{save_submission, AnswerEntry, AssignmentInfo, StudentInfo, Submission};
use anyhow::{Context, Result};
use chrono::Local;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Line that ends a multi-line (code) answer
pub const END_MARKER: &str = "END";

/// Prompts on `output` and reads answers from `input`
pub struct Collector<R, W> {
    input: R,
    output: W,
}

/// Files written by a completed submission
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub submission: Submission,
    pub record: PathBuf,
    pub proof: PathBuf,
}

impl<R: BufRead, W: Write> Collector<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Read one line without its terminator. `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let n = self
            .input
            .read_line(&mut line)
            .context("Failed to read from input")?;
        if n == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Prompt until a non-empty value is entered
    fn ask_required(&mut self, label: &str) -> Result<String> {
        loop {
            write!(self.output, "Enter your {}: ", label)?;
            self.output.flush()?;
            match self.read_line()? {
                Some(value) if !value.trim().is_empty() => return Ok(value.trim().to_string()),
                Some(_) => writeln!(self.output, "A {} is required.", label)?,
                None => anyhow::bail!("Input ended before {} was entered", label),
            }
        }
    }

    pub fn collect_student(&mut self) -> Result<StudentInfo> {
        let first = self.ask_required("first name")?;
        let last = self.ask_required("last name")?;
        let id = self.ask_required("student ID")?;
        Ok(StudentInfo::new(&first, &last, &id))
    }

    /// Read the answer to one question. Code questions take lines until `END`;
    /// end of input finishes whatever was typed so far.
    pub fn collect_answer(&mut self, question: &Question) -> Result<String> {
        writeln!(
            self.output,
            "\nQuestion {} ({} points):",
            question.number, question.max_points
        )?;
        writeln!(self.output, "{}", question.prompt)?;
        writeln!(self.output, "{}", "-".repeat(40))?;

        if question.expects_code() {
            writeln!(
                self.output,
                "For code, type multiple lines then '{}' on a new line:",
                END_MARKER
            )?;
            let mut lines = Vec::new();
            while let Some(line) = self.read_line()? {
                if line.trim() == END_MARKER {
                    break;
                }
                lines.push(line);
            }
            Ok(lines.join("\n"))
        } else {
            write!(self.output, "Your answer: ")?;
            self.output.flush()?;
            Ok(self.read_line()?.unwrap_or_default())
        }
    }

    /// Run the whole questionnaire and build the record
    pub fn collect(&mut self, rubric: &Rubric, course: &str, assignment: &str) -> Result<Submission> {
        writeln!(self.output, "=== {} - {} ===", course, assignment)?;
        writeln!(self.output, "Complete all questions. Your answers will be auto-graded.")?;
        writeln!(self.output, "{}", "=".repeat(60))?;

        let student = self.collect_student()?;
        writeln!(
            self.output,
            "\nAnswer all {} questions (Total: {} points):",
            rubric.questions().len(),
            rubric.total_points()
        )?;

        let mut answers = BTreeMap::new();
        for question in rubric.questions() {
            let answer = self.collect_answer(question)?;
            answers.insert(
                question.id.clone(),
                AnswerEntry {
                    question_number: question.number,
                    answer,
                    max_points: question.max_points,
                    timestamp: Some(Local::now().to_rfc3339()),
                },
            );
            writeln!(self.output, "Answer saved.")?;
        }

        Ok(Submission {
            student,
            assignment: AssignmentInfo {
                course: course.to_string(),
                name: assignment.to_string(),
                total_points: rubric.total_points(),
                submitted_at: Local::now().to_rfc3339(),
            },
            answers,
        })
    }

    /// Collect, then write the JSON record and the proof document into `out_dir`
    pub fn submit(
        &mut self,
        rubric: &Rubric,
        course: &str,
        assignment: &str,
        pattern: &str,
        out_dir: &Path,
        writer: &dyn DocumentWriter,
    ) -> Result<SubmitOutcome> {
        let submission = self.collect(rubric, course, assignment)?;
        let record = save_submission(&submission, out_dir, pattern)?;

        let stem = record
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "submission".to_string());
        let proof = out_dir.join(format!("{}_proof.{}", stem, writer.extension()));
        let (heading, paragraphs) = submission_proof(&submission, rubric, Local::now());
        writer.render(&heading, &paragraphs, &proof)?;
        tracing::debug!(record = %record.display(), proof = %proof.display(), "submission written");

        writeln!(self.output, "\nSubmission saved: {}", record.display())?;
        writeln!(self.output, "Submission proof: {}", proof.display())?;

        Ok(SubmitOutcome {
            submission,
            record,
            proof,
        })
    }
}
