//! Grader module - applies a rubric to submissions

pub mod engine;
pub mod gradebook;
pub mod scoring;

pub use engine::GradingEngine;
pub use gradebook::{ClassStats, Gradebook, GradebookRow, SkippedRecord};
pub use scoring::ScoreCalculator;
