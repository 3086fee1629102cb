//! Gradebook - grades a batch of submission files and summarizes the class

use crate::config::is_ignored;
use crate::error::Result;
use crate::submission::scan_submissions;
use crate::GradeReport;
use globset::GlobSet;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::GradingEngine;

/// One graded student, with the file it came from
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradebookRow {
    pub source: PathBuf,
    pub report: GradeReport,
}

/// A record that could not be loaded or parsed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRecord {
    pub path: PathBuf,
    pub reason: String,
}

/// Class-level statistics over total percentages
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassStats {
    pub graded: usize,
    pub mean: f64,
    pub highest: f64,
    pub lowest: f64,
    /// Students at or above `pass_threshold`
    pub passing: usize,
    pub pass_threshold: f64,
}

impl ClassStats {
    pub fn from_reports<'a>(
        reports: impl IntoIterator<Item = &'a GradeReport>,
        pass_threshold: f64,
    ) -> Self {
        let percentages: Vec<f64> = reports.into_iter().map(|r| r.percentage).collect();
        if percentages.is_empty() {
            return Self {
                pass_threshold,
                ..Self::default()
            };
        }

        let sum: f64 = percentages.iter().sum();
        Self {
            graded: percentages.len(),
            mean: sum / percentages.len() as f64,
            highest: percentages.iter().cloned().fold(f64::MIN, f64::max),
            lowest: percentages.iter().cloned().fold(f64::MAX, f64::min),
            passing: percentages.iter().filter(|p| **p >= pass_threshold).count(),
            pass_threshold,
        }
    }
}

/// Graded rows in input order, plus the records that were skipped
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gradebook {
    pub rows: Vec<GradebookRow>,
    pub skipped: Vec<SkippedRecord>,
    pub stats: ClassStats,
}

impl Gradebook {
    /// Grade every file. A file that fails to load is skipped and reported,
    /// never aborting the batch. Row order always matches `paths`.
    pub fn from_paths(
        engine: &GradingEngine,
        paths: &[PathBuf],
        parallel: bool,
        pass_threshold: f64,
    ) -> Self {
        let outcomes: Vec<(PathBuf, Result<GradeReport>)> = if parallel {
            use rayon::prelude::*;
            paths
                .par_iter()
                .map(|p| (p.clone(), engine.grade_file(p)))
                .collect()
        } else {
            paths
                .iter()
                .map(|p| (p.clone(), engine.grade_file(p)))
                .collect()
        };

        let mut rows = Vec::with_capacity(outcomes.len());
        let mut skipped = Vec::new();
        for (path, outcome) in outcomes {
            match outcome {
                Ok(report) => rows.push(GradebookRow {
                    source: path,
                    report,
                }),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable submission");
                    skipped.push(SkippedRecord {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let stats = ClassStats::from_reports(rows.iter().map(|r| &r.report), pass_threshold);
        Self {
            rows,
            skipped,
            stats,
        }
    }

    /// Collect submission files from `dir` (sorted by path, minus ignored ones) and grade them
    pub fn collect(
        engine: &GradingEngine,
        dir: &Path,
        pattern: &str,
        ignore: Option<&GlobSet>,
        parallel: bool,
        pass_threshold: f64,
    ) -> Result<Self> {
        let mut scan = scan_submissions(dir, pattern)?;
        if let Some(set) = ignore {
            let keep = |p: &Path| !is_ignored(p.strip_prefix(dir).unwrap_or(p), set);
            scan.files.retain(|p| keep(p.as_path()));
            scan.unreadable.retain(|(p, _)| keep(p.as_path()));
        }

        let mut book = Self::from_paths(engine, &scan.files, parallel, pass_threshold);
        for (path, reason) in scan.unreadable {
            tracing::warn!(path = %path.display(), error = %reason, "skipping unreadable submission");
            book.skipped.push(SkippedRecord { path, reason });
        }
        book.skipped.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(book)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
