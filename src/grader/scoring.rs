//! Score calculation and feedback wording

use crate::rubric::{Question, Rubric, RuleKind, RuleOutcome};
use crate::{percentage, Grade, GradeReport, QuestionScore};

/// Questions below this percentage get an improvement suggestion
const SUGGESTION_THRESHOLD: f64 = 75.0;

/// Calculator for question and submission scores
pub struct ScoreCalculator;

impl ScoreCalculator {
    /// Turn a rule outcome into a question score
    pub fn question_score(question: &Question, outcome: RuleOutcome, answered: bool) -> QuestionScore {
        let earned = outcome.points.min(question.max_points);
        QuestionScore {
            question_id: question.id.clone(),
            question_number: question.number,
            earned,
            max_points: question.max_points,
            percentage: percentage(earned, question.max_points),
            findings: outcome.findings,
            answered,
        }
    }

    /// Get a description for a grade
    pub fn grade_description(grade: Grade) -> &'static str {
        match grade {
            Grade::A => "Excellent - thorough, accurate answers",
            Grade::B => "Good - minor gaps in a few answers",
            Grade::C => "Fair - several answers need more detail",
            Grade::D => "Poor - review the core concepts",
            Grade::F => "Failing - most answers are missing or incomplete",
        }
    }

    /// Improvement suggestions for the weakest questions, by rule kind
    pub fn suggestions(report: &GradeReport, rubric: &Rubric) -> Vec<String> {
        let mut suggestions = Vec::new();

        for q in &report.questions {
            if q.percentage >= SUGGESTION_THRESHOLD {
                continue;
            }
            let kind = rubric.question(&q.question_id).map(|rq| rq.rule.kind());
            let advice = if !q.answered {
                "no answer was submitted; make sure every question is answered"
            } else {
                match kind {
                    Some(RuleKind::KeywordCoverage) => {
                        "define every term and use the key vocabulary from the lectures"
                    }
                    Some(RuleKind::PatternMatch) => {
                        "check declaration syntax: type, name, = and the exact value"
                    }
                    Some(RuleKind::LiteralPresence) => {
                        "recheck each calculation and write every result explicitly"
                    }
                    Some(RuleKind::ConceptGroups) | None => {
                        "cover each expected concept explicitly in your answer"
                    }
                }
            };
            suggestions.push(format!("{}: {}", q.label(), advice));
        }

        if suggestions.is_empty() {
            suggestions.push("All answers are in good shape - keep it up".to_string());
        }
        suggestions
    }
}
