//! gradekit: heuristic autograder for short-answer coursework
//!
//! Students answer a fixed set of questions, their answers are stored as a JSON
//! submission record, and the grading engine scores every answer against
//! keyword, regex and literal heuristics to produce points and feedback.
//! The gradebook aggregates many records into a class-wide export.

pub mod collect;
pub mod config;
pub mod error;
pub mod grader;
pub mod reporter;
pub mod rubric;
pub mod submission;

pub use error::GradeError;

use serde::{Deserialize, Serialize};
use submission::StudentInfo;

/// Outcome of one check inside a scoring rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingStatus {
    /// Requirement satisfied
    Met,
    /// Mentioned but incomplete
    Partial,
    /// Not found in the answer
    Missing,
}

impl FindingStatus {
    /// Marker used in plain-text feedback
    pub fn marker(&self) -> &'static str {
        match self {
            FindingStatus::Met => "✓",
            FindingStatus::Partial => "~",
            FindingStatus::Missing => "✗",
        }
    }
}

/// A single line of feedback produced by a scoring rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub status: FindingStatus,
    pub message: String,
}

impl Finding {
    pub fn met(message: impl Into<String>) -> Self {
        Self {
            status: FindingStatus::Met,
            message: message.into(),
        }
    }

    pub fn partial(message: impl Into<String>) -> Self {
        Self {
            status: FindingStatus::Partial,
            message: message.into(),
        }
    }

    pub fn missing(message: impl Into<String>) -> Self {
        Self {
            status: FindingStatus::Missing,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status.marker(), self.message)
    }
}

/// Score for one question of one submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionScore {
    pub question_id: String,
    pub question_number: u32,
    /// Points earned, never above `max_points`
    pub earned: u32,
    pub max_points: u32,
    /// earned / max as 0-100
    pub percentage: f64,
    pub findings: Vec<Finding>,
    /// False when the record had no answer for this question
    pub answered: bool,
}

impl QuestionScore {
    /// Findings joined into the plain-text feedback block
    pub fn feedback(&self) -> String {
        self.findings
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_full_credit(&self) -> bool {
        self.earned >= self.max_points
    }

    /// Short label such as "Q3"
    pub fn label(&self) -> String {
        format!("Q{}", self.question_number)
    }
}

/// Letter grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 90.0 {
            Grade::A
        } else if percentage >= 80.0 {
            Grade::B
        } else if percentage >= 70.0 {
            Grade::C
        } else if percentage >= 60.0 {
            Grade::D
        } else {
            Grade::F
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Grade::A => write!(f, "A"),
            Grade::B => write!(f, "B"),
            Grade::C => write!(f, "C"),
            Grade::D => write!(f, "D"),
            Grade::F => write!(f, "F"),
        }
    }
}

/// The graded result of one submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeReport {
    pub student: StudentInfo,
    pub submitted_at: String,
    /// Per-question scores in rubric order
    pub questions: Vec<QuestionScore>,
    pub total_earned: u32,
    pub total_possible: u32,
    pub percentage: f64,
    pub grade: Grade,
    /// Rubric question ids with no answer in the record
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

impl GradeReport {
    /// Build a report from per-question scores; totals and grade are derived
    pub fn new(student: StudentInfo, submitted_at: String, questions: Vec<QuestionScore>) -> Self {
        let total_earned = questions
            .iter()
            .fold(0u32, |acc, q| acc.saturating_add(q.earned));
        let total_possible = questions
            .iter()
            .fold(0u32, |acc, q| acc.saturating_add(q.max_points));
        let pct = percentage(total_earned, total_possible);
        let missing = questions
            .iter()
            .filter(|q| !q.answered)
            .map(|q| q.question_id.clone())
            .collect();
        Self {
            student,
            submitted_at,
            questions,
            total_earned,
            total_possible,
            percentage: pct,
            grade: Grade::from_percentage(pct),
            missing,
        }
    }

    pub fn question(&self, question_id: &str) -> Option<&QuestionScore> {
        self.questions.iter().find(|q| q.question_id == question_id)
    }

    pub fn is_full_credit(&self) -> bool {
        self.total_earned >= self.total_possible
    }
}

/// `earned / possible` as 0-100; 0 when nothing is possible
pub fn percentage(earned: u32, possible: u32) -> f64 {
    if possible == 0 {
        0.0
    } else {
        earned as f64 * 100.0 / possible as f64
    }
}

/// Public API: grade one submission file with the rubric from `config_path`
/// (or the nearest `.gradekit.json`, or the built-in rubric).
pub fn grade_file(
    path: &std::path::Path,
    config_path: Option<&std::path::Path>,
) -> anyhow::Result<GradeReport> {
    let work_dir = path.parent().unwrap_or(std::path::Path::new("."));
    let config = crate::config::load_config(work_dir, config_path)?;
    let engine = crate::grader::GradingEngine::new(config.rubric()?);
    Ok(engine.grade_file(path)?)
}
