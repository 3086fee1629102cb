//! Submission records: the JSON file a student produces and the grader reads

use crate::error::{GradeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default glob for submission files in a student repository
pub const DEFAULT_SUBMISSION_PATTERN: &str = "assignment1_*.json";

/// One student's submitted answers plus identity and timestamp metadata.
///
/// Records are never mutated by grading; scores are derived fresh on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub student: StudentInfo,
    pub assignment: AssignmentInfo,
    /// Question id -> answer, ordered by id
    #[serde(default)]
    pub answers: BTreeMap<String, AnswerEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfo {
    /// Full name; derived from first/last name when absent
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "first_name")]
    pub first_name: String,
    #[serde(default, alias = "last_name")]
    pub last_name: String,
    pub id: String,
}

impl StudentInfo {
    pub fn new(first_name: &str, last_name: &str, id: &str) -> Self {
        Self {
            name: format!("{} {}", first_name, last_name).trim().to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            id: id.to_string(),
        }
    }

    /// Name to show in reports
    pub fn display_name(&self) -> String {
        if !self.name.trim().is_empty() {
            return self.name.trim().to_string();
        }
        let joined = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let joined = joined.trim();
        if joined.is_empty() {
            self.id.clone()
        } else {
            joined.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentInfo {
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "total_points")]
    pub total_points: u32,
    /// RFC 3339 / ISO 8601 timestamp of the submission
    #[serde(alias = "submitted_at")]
    pub submitted_at: String,
}

/// A single answer with its point budget at submission time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEntry {
    #[serde(default, alias = "question_number")]
    pub question_number: u32,
    #[serde(default)]
    pub answer: String,
    #[serde(default, alias = "max_points")]
    pub max_points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Submission {
    /// Answer text for a question, if the record has one
    pub fn answer(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id).map(|a| a.answer.as_str())
    }

    /// Parse a submission from JSON text. `path` is only used for error messages.
    pub fn from_json(content: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(content).map_err(|source| GradeError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Pretty JSON with stable key order
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// File name for this record, derived from a `prefix_*.json` style pattern
    pub fn file_name(&self, pattern: &str) -> String {
        let stem = format!(
            "{}_{}",
            sanitize_name(&self.student.first_name),
            sanitize_name(&self.student.last_name)
        );
        if pattern.contains('*') {
            pattern.replacen('*', &stem, 1)
        } else {
            format!("{}.json", stem)
        }
    }
}

/// Replace whitespace and path separators so a name can be used in a file name
pub fn sanitize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Load and parse a submission record
pub fn load_submission(path: &Path) -> Result<Submission> {
    let content = fs::read_to_string(path).map_err(|source| GradeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Submission::from_json(&content, path)
}

/// Write a submission into `dir`, naming it from `pattern`. Returns the path written.
pub fn save_submission(submission: &Submission, dir: &Path, pattern: &str) -> Result<PathBuf> {
    let path = dir.join(submission.file_name(pattern));
    fs::write(&path, submission.to_json()).map_err(|source| GradeError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Files matching the submission pattern, plus matches that could not be read
#[derive(Debug, Default)]
pub struct SubmissionScan {
    pub files: Vec<PathBuf>,
    /// Matched paths whose metadata could not be read, with the reason
    pub unreadable: Vec<(PathBuf, String)>,
}

/// Scan `dir` for `pattern`. Directories that happen to match are not records and are left out.
pub fn scan_submissions(dir: &Path, pattern: &str) -> Result<SubmissionScan> {
    let full = format!(
        "{}/{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        pattern
    );
    let paths = glob::glob(&full).map_err(|e| {
        GradeError::InvalidConfig(format!("invalid submission pattern `{}`: {}", pattern, e))
    })?;

    let mut scan = SubmissionScan::default();
    for entry in paths {
        match entry {
            Ok(path) => match fs::metadata(&path) {
                Ok(meta) if meta.is_file() => scan.files.push(path),
                Ok(_) => {}
                Err(e) => scan.unreadable.push((path, e.to_string())),
            },
            Err(e) => {
                let reason = e.error().to_string();
                scan.unreadable.push((e.path().to_path_buf(), reason));
            }
        }
    }
    scan.files.sort();
    scan.unreadable.sort();
    Ok(scan)
}

/// All readable files in `dir` matching `pattern`, sorted by path
pub fn list_submissions(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    Ok(scan_submissions(dir, pattern)?.files)
}

/// Locate the single submission a per-student grading run should use (first match by name)
pub fn find_submission(dir: &Path, pattern: &str) -> Result<PathBuf> {
    list_submissions(dir, pattern)?
        .into_iter()
        .next()
        .ok_or_else(|| GradeError::NoSubmission {
            dir: dir.to_path_buf(),
            pattern: pattern.to_string(),
        })
}
