//! Library-level tests against the fixture class and scoring properties.

use gradekit::grader::{Gradebook, GradingEngine};
use gradekit::rubric::Rubric;
use gradekit::submission::{list_submissions, load_submission, Submission};
use gradekit::{FindingStatus, Grade};
use proptest::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CLASS_DIR: &str = "tests/fixtures/class";

fn engine() -> GradingEngine {
    GradingEngine::new(Rubric::builtin().unwrap())
}

fn fixture(name: &str) -> Submission {
    load_submission(&Path::new(CLASS_DIR).join(name)).unwrap()
}

#[test]
fn full_credit_fixture_scores_100() {
    let report = engine().grade(&fixture("assignment1_Ada_Lovelace.json"));
    assert_eq!(report.total_earned, 100);
    assert_eq!(report.grade, Grade::A);
    assert!(report.questions.iter().all(|q| q.is_full_credit()));
}

#[test]
fn snake_case_fixture_is_accepted() {
    let submission = fixture("assignment1_Alan_Turing.json");
    assert_eq!(submission.student.first_name, "Alan");
    assert_eq!(submission.assignment.total_points, 100);
    assert_eq!(submission.answers["q4_modulo"].max_points, 12);
}

#[test]
fn partial_fixture_breakdown() {
    let report = engine().grade(&fixture("assignment1_Alan_Turing.json"));
    assert_eq!(report.question("q3_declarations").unwrap().earned, 6);
    assert_eq!(report.question("q4_modulo").unwrap().earned, 9);
    assert_eq!(report.total_earned, 15);
    assert_eq!(
        report.missing,
        vec!["q1_definitions", "q2_languages", "q5_programming", "q6_debugging"]
    );
}

#[test]
fn literal_findings_name_each_expression() {
    let report = engine().grade(&fixture("assignment1_Alan_Turing.json"));
    let q4 = report.question("q4_modulo").unwrap();
    let missing: Vec<_> = q4
        .findings
        .iter()
        .filter(|f| f.status == FindingStatus::Missing)
        .collect();
    assert_eq!(missing.len(), 1);
    assert!(missing[0].message.contains("23"));
}

#[test]
fn fixture_dir_lists_only_matching_records() {
    let files = list_submissions(Path::new(CLASS_DIR), "assignment1_*.json").unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "assignment1_Ada_Lovelace.json",
            "assignment1_Alan_Turing.json",
            "assignment1_Broken_Record.json"
        ]
    );
}

#[test]
fn gradebook_with_five_valid_and_one_corrupt() {
    let dir = TempDir::new().unwrap();
    let template = fs::read_to_string(Path::new(CLASS_DIR).join("assignment1_Alan_Turing.json")).unwrap();
    for i in 1..=5 {
        let record = template.replace("S002", &format!("S10{}", i));
        fs::write(dir.path().join(format!("assignment1_Student_{}.json", i)), record).unwrap();
    }
    fs::write(dir.path().join("assignment1_Student_6.json"), "not json at all").unwrap();

    let book = Gradebook::collect(&engine(), dir.path(), "assignment1_*.json", None, true, 60.0).unwrap();
    assert_eq!(book.rows.len(), 5);
    assert_eq!(book.skipped.len(), 1);
    assert_eq!(book.stats.graded, 5);
    assert_eq!(book.stats.mean, 15.0);
    let ids: Vec<_> = book.rows.iter().map(|r| r.report.student.id.as_str()).collect();
    assert_eq!(ids, vec!["S101", "S102", "S103", "S104", "S105"]);
}

#[test]
fn grade_file_uses_config_questions() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".gradekit.json"),
        r#"{"questions": [
            {"id": "q4_modulo", "points": 4, "rule": {"kind": "literal-presence",
                "literals": [{"expected": "6"}, {"expected": "23"}], "pointsEach": 2}}
        ]}"#,
    )
    .unwrap();
    let record = dir.path().join("assignment1_Alan_Turing.json");
    fs::copy(Path::new(CLASS_DIR).join("assignment1_Alan_Turing.json"), &record).unwrap();

    let report = gradekit::grade_file(&record, None).unwrap();
    assert_eq!(report.questions.len(), 1);
    assert_eq!(report.total_earned, 2);
    assert_eq!(report.total_possible, 4);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn earned_never_exceeds_max(answer in ".{0,400}") {
        let engine = engine();
        let mut submission = fixture("assignment1_Ada_Lovelace.json");
        for entry in submission.answers.values_mut() {
            entry.answer = answer.clone();
        }
        let report = engine.grade(&submission);
        for q in &report.questions {
            prop_assert!(q.earned <= q.max_points);
            prop_assert!((0.0..=100.0).contains(&q.percentage));
        }
        prop_assert!(report.total_earned <= report.total_possible);
    }

    #[test]
    fn grading_is_deterministic(answer in "[a-z0-9 =;%.]{0,200}") {
        let engine = engine();
        let mut submission = fixture("assignment1_Alan_Turing.json");
        if let Some(entry) = submission.answers.get_mut("q4_modulo") {
            entry.answer = answer;
        }
        prop_assert_eq!(engine.grade(&submission), engine.grade(&submission));
    }

    #[test]
    fn appending_text_never_lowers_literal_score(base in "[0-9 ,%=]{0,40}", extra in "[0-9 ,]{0,20}") {
        let engine = engine();
        let mut submission = fixture("assignment1_Alan_Turing.json");
        submission.answers.get_mut("q4_modulo").unwrap().answer = base.clone();
        let before = engine.grade_question(&submission, "q4_modulo").unwrap().earned;
        submission.answers.get_mut("q4_modulo").unwrap().answer = format!("{} {}", base, extra);
        let after = engine.grade_question(&submission, "q4_modulo").unwrap().earned;
        prop_assert!(after >= before);
    }
}
