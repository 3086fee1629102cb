//! Edge case tests: degenerate records must not panic.

use gradekit::grader::GradingEngine;
use gradekit::rubric::Rubric;
use gradekit::{GradeError, GradeReport};
use std::io::Write;
use tempfile::NamedTempFile;

fn grade_text(content: &str) -> Result<GradeReport, GradeError> {
    let mut file = NamedTempFile::with_suffix(".json").unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    GradingEngine::new(Rubric::builtin().unwrap()).grade_file(file.path())
}

fn record(answers: &str) -> String {
    format!(
        r#"{{"student": {{"id": "S1"}},
            "assignment": {{"submittedAt": "2024-09-01T10:00:00"}},
            "answers": {{{}}}}}"#,
        answers
    )
}

#[test]
fn empty_file_is_malformed() {
    assert!(matches!(grade_text(""), Err(GradeError::Malformed { .. })));
}

#[test]
fn json_array_is_malformed() {
    assert!(matches!(grade_text("[1, 2, 3]"), Err(GradeError::Malformed { .. })));
}

#[test]
fn missing_student_id_is_malformed() {
    let err = grade_text(r#"{"student": {}, "assignment": {"submittedAt": "x"}}"#).unwrap_err();
    assert!(err.to_string().contains("id"));
}

#[test]
fn no_answers_object_scores_zero() {
    let report = grade_text(r#"{"student": {"id": "S1"}, "assignment": {"submittedAt": ""}}"#).unwrap();
    assert_eq!(report.total_earned, 0);
    assert_eq!(report.total_possible, 100);
    assert_eq!(report.missing.len(), 6);
    assert_eq!(report.student.display_name(), "S1");
}

#[test]
fn unknown_answer_keys_are_ignored() {
    let report = grade_text(&record(
        r#""q7_bonus": {"questionNumber": 7, "answer": "6 0 23", "maxPoints": 50}"#,
    ))
    .unwrap();
    assert_eq!(report.questions.len(), 6);
    assert_eq!(report.total_earned, 0);
}

#[test]
fn null_answer_is_malformed() {
    let result = grade_text(&record(r#""q4_modulo": {"questionNumber": 4, "answer": null, "maxPoints": 12}"#));
    assert!(matches!(result, Err(GradeError::Malformed { .. })));
}

#[test]
fn inflated_max_points_use_rubric() {
    let report = grade_text(&record(
        r#""q4_modulo": {"questionNumber": 4, "answer": "6 0 23 6", "maxPoints": 1000}"#,
    ))
    .unwrap();
    let q4 = report.question("q4_modulo").unwrap();
    assert_eq!(q4.max_points, 12);
    assert_eq!(q4.earned, 12);
}

#[test]
fn whitespace_only_answers_score_zero() {
    let report = grade_text(&record(
        r#""q1_definitions": {"questionNumber": 1, "answer": "   \n\t  ", "maxPoints": 40},
           "q5_programming": {"questionNumber": 5, "answer": "\n\n", "maxPoints": 12}"#,
    ))
    .unwrap();
    assert_eq!(report.total_earned, 0);
    assert_eq!(report.missing.len(), 4);
}

#[test]
fn unicode_answers_no_panic() {
    let report = grade_text(&record(
        r#""q2_languages": {"questionNumber": 2, "answer": "Hochsprachen sind portabel 🚀 und lesbar — ÄÖÜ", "maxPoints": 12}"#,
    ))
    .unwrap();
    assert!(report.question("q2_languages").unwrap().earned <= 12);
}

#[test]
fn very_long_answer_no_panic() {
    let long = "overflow ".repeat(20_000);
    let report = grade_text(&record(&format!(
        r#""q6_debugging": {{"questionNumber": 6, "answer": "{}", "maxPoints": 12}}"#,
        long
    )))
    .unwrap();
    assert_eq!(report.question("q6_debugging").unwrap().earned, 4);
}
