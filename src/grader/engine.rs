//! Grading engine - runs every rubric rule over one submission

use crate::error::{GradeError, Result};
use crate::rubric::{Question, Rubric};
use crate::submission::{load_submission, Submission};
use crate::{GradeReport, QuestionScore};
use std::path::Path;

use super::ScoreCalculator;

/// Grades submissions against a fixed rubric. Holds no mutable state, so the
/// same engine can grade any number of records (or be shared across threads).
pub struct GradingEngine {
    rubric: Rubric,
}

impl GradingEngine {
    pub fn new(rubric: Rubric) -> Self {
        Self { rubric }
    }

    pub fn rubric(&self) -> &Rubric {
        &self.rubric
    }

    /// Grade every question in rubric order
    pub fn grade(&self, submission: &Submission) -> GradeReport {
        let questions = self
            .rubric
            .questions()
            .iter()
            .map(|q| self.score_question(q, submission))
            .collect();

        GradeReport::new(
            submission.student.clone(),
            submission.assignment.submitted_at.clone(),
            questions,
        )
    }

    /// Grade a single question by id
    pub fn grade_question(&self, submission: &Submission, question_id: &str) -> Result<QuestionScore> {
        let question =
            self.rubric
                .question(question_id)
                .ok_or_else(|| GradeError::UnknownQuestion {
                    id: question_id.to_string(),
                    known: self.rubric.known_ids(),
                })?;
        Ok(self.score_question(question, submission))
    }

    /// Load a submission file and grade it
    pub fn grade_file(&self, path: &Path) -> Result<GradeReport> {
        let submission = load_submission(path)?;
        Ok(self.grade(&submission))
    }

    fn score_question(&self, question: &Question, submission: &Submission) -> QuestionScore {
        let answer = match submission.answers.get(&question.id) {
            Some(entry) => {
                if entry.max_points != 0 && entry.max_points != question.max_points {
                    tracing::debug!(
                        question = %question.id,
                        recorded = entry.max_points,
                        rubric = question.max_points,
                        "record point budget differs from rubric; using rubric"
                    );
                }
                Some(entry.answer.as_str())
            }
            None => {
                tracing::warn!(
                    student = %submission.student.id,
                    question = %question.id,
                    "no answer recorded; grading as empty"
                );
                None
            }
        };

        let outcome = question
            .rule
            .evaluate(answer.unwrap_or(""), question.max_points);
        ScoreCalculator::question_score(question, outcome, answer.is_some())
    }
}
