//! Rubric: the fixed question set and the scoring rule attached to each question

pub mod builtin;
pub mod rules;

pub use rules::{RuleKind, RuleOutcome, RuleSpec, ScoringRule};

use crate::error::{GradeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A question as written in config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSpec {
    pub id: String,
    /// Display number; defaults to position in the list
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub prompt: String,
    pub points: u32,
    pub rule: RuleSpec,
}

/// A question with its compiled scoring rule
#[derive(Debug, Clone)]
pub struct Question {
    pub id: String,
    pub number: u32,
    pub prompt: String,
    pub max_points: u32,
    pub rule: ScoringRule,
}

impl Question {
    /// Questions whose answer is source code and spans several lines.
    /// Matches whole words, so "write programs in" stays a prose question.
    pub fn expects_code(&self) -> bool {
        self.prompt
            .split(|c: char| !c.is_alphanumeric())
            .any(|w| w.eq_ignore_ascii_case("program") || w.eq_ignore_ascii_case("code"))
    }
}

/// Ordered, immutable set of questions. Built per invocation from config.
#[derive(Debug, Clone)]
pub struct Rubric {
    questions: Vec<Question>,
}

impl Rubric {
    /// Validate and compile question specs
    pub fn from_specs(specs: &[QuestionSpec]) -> Result<Self> {
        if specs.is_empty() {
            return Err(GradeError::InvalidConfig(
                "rubric has no questions".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut total: u32 = 0;
        let mut questions = Vec::with_capacity(specs.len());
        for (idx, spec) in specs.iter().enumerate() {
            let id = spec.id.trim();
            if id.is_empty() {
                return Err(GradeError::InvalidConfig(format!(
                    "question #{} has an empty id",
                    idx + 1
                )));
            }
            if id.eq_ignore_ascii_case("all") {
                return Err(GradeError::InvalidConfig(
                    "`all` is reserved and cannot be a question id".to_string(),
                ));
            }
            if !seen.insert(id.to_string()) {
                return Err(GradeError::InvalidConfig(format!(
                    "duplicate question id `{}`",
                    id
                )));
            }
            if spec.points == 0 {
                return Err(GradeError::InvalidConfig(format!(
                    "question `{}` must be worth at least one point",
                    id
                )));
            }
            total = total.checked_add(spec.points).ok_or_else(|| {
                GradeError::InvalidConfig(format!(
                    "total points overflow at question `{}` (limit {})",
                    id,
                    u32::MAX
                ))
            })?;

            questions.push(Question {
                id: id.to_string(),
                number: if spec.number == 0 {
                    idx as u32 + 1
                } else {
                    spec.number
                },
                prompt: spec.prompt.clone(),
                max_points: spec.points,
                rule: ScoringRule::compile(id, &spec.rule)?,
            });
        }

        Ok(Self { questions })
    }

    /// The built-in Assignment #1 rubric
    pub fn builtin() -> Result<Self> {
        Self::from_specs(&builtin::assignment_one())
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn total_points(&self) -> u32 {
        self.questions
            .iter()
            .fold(0u32, |acc, q| acc.saturating_add(q.max_points))
    }

    /// Question ids joined for error messages
    pub fn known_ids(&self) -> String {
        self.questions
            .iter()
            .map(|q| q.id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
