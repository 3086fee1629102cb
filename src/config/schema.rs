//! Config schema and deserialization

use crate::error::Result;
use crate::rubric::{builtin, QuestionSpec, Rubric};
use crate::submission::DEFAULT_SUBMISSION_PATTERN;
use serde::{Deserialize, Serialize};

/// Gradebook pass mark when the config does not set one
pub const DEFAULT_PASS_THRESHOLD: f64 = 60.0;

/// Root config structure for .gradekit.json
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Extend another config file (path relative to this config)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment: Option<String>,

    /// File name glob for submission records. Default: assignment1_*.json
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_pattern: Option<String>,

    /// Glob patterns for submission files to leave out of the gradebook
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,

    /// Percentage counted as passing in class statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_threshold: Option<f64>,

    /// Question tables. The built-in Assignment #1 rubric when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<QuestionSpec>>,
}

impl Config {
    /// Config carrying the built-in rubric as editable data (for `init`)
    pub fn builtin() -> Self {
        Self {
            extends: None,
            course: Some(builtin::COURSE.to_string()),
            assignment: Some(builtin::ASSIGNMENT.to_string()),
            submission_pattern: Some(DEFAULT_SUBMISSION_PATTERN.to_string()),
            ignore: Vec::new(),
            pass_threshold: Some(DEFAULT_PASS_THRESHOLD),
            questions: Some(builtin::assignment_one()),
        }
    }

    /// Compile the configured questions into a rubric
    pub fn rubric(&self) -> Result<Rubric> {
        match &self.questions {
            Some(specs) => Rubric::from_specs(specs),
            None => Rubric::builtin(),
        }
    }

    pub fn submission_pattern(&self) -> &str {
        self.submission_pattern
            .as_deref()
            .unwrap_or(DEFAULT_SUBMISSION_PATTERN)
    }

    pub fn pass_threshold(&self) -> f64 {
        self.pass_threshold.unwrap_or(DEFAULT_PASS_THRESHOLD)
    }

    pub fn course(&self) -> &str {
        self.course.as_deref().unwrap_or(builtin::COURSE)
    }

    pub fn assignment(&self) -> &str {
        self.assignment.as_deref().unwrap_or(builtin::ASSIGNMENT)
    }

    /// Merge another config into this one (for extends)
    pub fn merge_from(&mut self, base: Config) {
        // Base values are overridden by this config's values
        if self.extends.is_none() {
            self.extends = base.extends;
        }
        if self.course.is_none() {
            self.course = base.course;
        }
        if self.assignment.is_none() {
            self.assignment = base.assignment;
        }
        if self.submission_pattern.is_none() {
            self.submission_pattern = base.submission_pattern;
        }
        if self.pass_threshold.is_none() {
            self.pass_threshold = base.pass_threshold;
        }
        // Question tables are replaced as a whole, never merged per question
        if self.questions.is_none() {
            self.questions = base.questions;
        }

        let mut all_ignores = base.ignore;
        all_ignores.append(&mut self.ignore);
        self.ignore = all_ignores;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.submission_pattern(), "assignment1_*.json");
        assert_eq!(config.pass_threshold(), 60.0);
        assert_eq!(config.course(), "CSCI 1436");
        assert_eq!(config.rubric().unwrap().total_points(), 100);
    }

    #[test]
    fn test_builtin_config_roundtrips_through_json() {
        let json = serde_json::to_string_pretty(&Config::builtin()).unwrap();
        assert!(json.contains("\"submissionPattern\""));
        assert!(json.contains("\"keyword-coverage\""));
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Config::builtin());
        assert_eq!(parsed.rubric().unwrap().questions().len(), 6);
    }

    #[test]
    fn test_merge_keeps_child_values() {
        let mut child = Config {
            pass_threshold: Some(70.0),
            ignore: vec!["*_late.json".to_string()],
            ..Config::default()
        };
        let base = Config {
            course: Some("CSCI 2436".to_string()),
            pass_threshold: Some(50.0),
            ignore: vec!["*_draft.json".to_string()],
            ..Config::builtin()
        };
        child.merge_from(base);
        assert_eq!(child.pass_threshold(), 70.0);
        assert_eq!(child.course(), "CSCI 2436");
        assert_eq!(child.ignore, vec!["*_draft.json", "*_late.json"]);
        assert_eq!(child.questions.as_ref().map(Vec::len), Some(6));
    }

    #[test]
    fn test_custom_questions_replace_builtin() {
        let config: Config = serde_json::from_str(
            r#"{
                "questions": [
                    {"id": "q1", "points": 10, "rule": {"kind": "literal-presence",
                        "literals": [{"expected": "42"}], "pointsEach": 10}}
                ]
            }"#,
        )
        .unwrap();
        let rubric = config.rubric().unwrap();
        assert_eq!(rubric.questions().len(), 1);
        assert_eq!(rubric.total_points(), 10);
    }
}
