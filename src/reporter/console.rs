//! Console reporter with colored output

use crate::grader::{Gradebook, ScoreCalculator};
use crate::rubric::Rubric;
use crate::{FindingStatus, Grade, GradeReport, QuestionScore};
use colored::{ColoredString, Colorize};
use std::fmt::Write as _;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Panel, Style, Width},
    Table, Tabled,
};

/// Reporter for terminal output
pub struct ConsoleReporter {
    /// Whether to use colors
    use_colors: bool,
    /// Whether to show verbose output
    verbose: bool,
}

#[derive(Tabled)]
struct GradebookLine {
    #[tabled(rename = "Student")]
    student: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Questions")]
    questions: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Percent")]
    percent: String,
    #[tabled(rename = "Grade")]
    grade: String,
}

#[derive(Tabled)]
struct RubricLine {
    #[tabled(rename = "#")]
    number: u32,
    #[tabled(rename = "Question")]
    id: String,
    #[tabled(rename = "Points")]
    points: u32,
    #[tabled(rename = "Rule")]
    rule: String,
}

impl ConsoleReporter {
    /// Create a new console reporter
    pub fn new() -> Self {
        Self {
            use_colors: true,
            verbose: false,
        }
    }

    /// Disable colors
    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    /// Enable verbose output
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Report a single question: the score line and its feedback
    pub fn report_question(&self, score: &QuestionScore) {
        print!("{}", self.render_question(score));
    }

    pub fn render_question(&self, score: &QuestionScore) -> String {
        let mut out = String::new();
        let score_line = format!(
            "Score: {}/{} ({:.1}%)",
            score.earned, score.max_points, score.percentage
        );
        let _ = writeln!(out, "{}", self.score_color(&score_line, score.percentage));
        for finding in &score.findings {
            let marker = match finding.status {
                FindingStatus::Met => self.paint(finding.status.marker(), |s| s.green()),
                FindingStatus::Partial => self.paint(finding.status.marker(), |s| s.yellow()),
                FindingStatus::Missing => self.paint(finding.status.marker(), |s| s.red()),
            };
            let _ = writeln!(out, "  {} {}", marker, finding.message);
        }
        out
    }

    /// Report a full submission: every question, the total and the estimated grade
    pub fn report(&self, report: &GradeReport, rubric: &Rubric) {
        print!("{}", self.render(report, rubric));
    }

    pub fn render(&self, report: &GradeReport, rubric: &Rubric) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{}",
            self.paint(
                &format!(
                    "Student: {} (ID: {})",
                    report.student.display_name(),
                    report.student.id
                ),
                |s| s.bold()
            )
        );
        let _ = writeln!(out, "{}", "=".repeat(60));

        for score in &report.questions {
            let heading = match rubric.question(&score.question_id) {
                Some(q) if self.verbose && !q.prompt.is_empty() => {
                    format!("{} {}: {}", score.label(), score.question_id, q.prompt)
                }
                _ => format!("{} {}", score.label(), score.question_id),
            };
            let _ = writeln!(out, "{}", self.paint(&heading, |s| s.bold()));
            out.push_str(&self.render_question(score));
            out.push('\n');
        }

        let _ = writeln!(out, "{}", "=".repeat(60));
        let overall = format!(
            "Overall Score: {}/{} ({:.1}%)",
            report.total_earned, report.total_possible, report.percentage
        );
        let _ = writeln!(out, "{}", self.score_color(&overall, report.percentage));
        let _ = writeln!(
            out,
            "Estimated Grade: {} {}",
            self.colorize_grade(report.grade),
            self.paint(ScoreCalculator::grade_description(report.grade), |s| s
                .dimmed())
        );

        if !report.is_full_credit() || self.verbose {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", self.paint("Suggestions:", |s| s.bold()));
            for suggestion in ScoreCalculator::suggestions(report, rubric) {
                let _ = writeln!(out, "  {} {}", self.paint("→", |s| s.cyan()), suggestion);
            }
        }
        out
    }

    /// Report in quiet mode (one line per submission)
    pub fn report_quiet(&self, report: &GradeReport) {
        println!("{}", self.render_quiet(report));
    }

    pub fn render_quiet(&self, report: &GradeReport) -> String {
        format!(
            "{} ({}): {}/{} ({:.1}%) {}",
            report.student.display_name(),
            report.student.id,
            report.total_earned,
            report.total_possible,
            report.percentage,
            self.colorize_grade(report.grade)
        )
    }

    /// Report the class table and statistics. Skipped records go to stderr.
    pub fn report_gradebook(&self, book: &Gradebook) {
        println!("{}", self.render_gradebook(book));
        for skipped in &book.skipped {
            eprintln!(
                "{}: skipped {}: {}",
                self.paint("Warning", |s| s.yellow()),
                skipped.path.display(),
                skipped.reason
            );
        }
    }

    pub fn render_gradebook(&self, book: &Gradebook) -> String {
        let lines: Vec<GradebookLine> = book
            .rows
            .iter()
            .map(|row| {
                let r = &row.report;
                GradebookLine {
                    student: r.student.display_name(),
                    id: r.student.id.clone(),
                    questions: r
                        .questions
                        .iter()
                        .map(|q| format!("{} {}/{}", q.label(), q.earned, q.max_points))
                        .collect::<Vec<_>>()
                        .join("\n"),
                    total: format!("{}/{}", r.total_earned, r.total_possible),
                    percent: format!("{:.1}%", r.percentage),
                    grade: r.grade.to_string(),
                }
            })
            .collect();

        let stats = &book.stats;
        let mut out = Table::new(&lines)
            .with(Panel::header("Gradebook"))
            .with(Panel::footer(format!(
                "Graded: {} | Skipped: {}",
                stats.graded,
                book.skipped.len()
            )))
            .with(Modify::new(Rows::new(1..)).with(Width::wrap(32).keep_words(true)))
            .with(Modify::new(Rows::first()).with(Alignment::center()))
            .with(Modify::new(Rows::last()).with(Alignment::center()))
            .with(Style::modern())
            .to_string();

        out.push_str("\n\n");
        let _ = writeln!(out, "{}", self.paint("Class Statistics:", |s| s.bold()));
        let _ = writeln!(out, "   Average: {:.1}%", stats.mean);
        let _ = writeln!(out, "   Highest: {:.1}%", stats.highest);
        let _ = writeln!(out, "   Lowest: {:.1}%", stats.lowest);
        let _ = writeln!(
            out,
            "   Passing (>= {:.0}%): {}/{}",
            stats.pass_threshold, stats.passing, stats.graded
        );
        let _ = write!(out, "   Total Submissions: {}", stats.graded);
        out
    }

    /// Table of the rubric questions
    pub fn render_rubric(&self, rubric: &Rubric) -> String {
        let lines: Vec<RubricLine> = rubric
            .questions()
            .iter()
            .map(|q| RubricLine {
                number: q.number,
                id: q.id.clone(),
                points: q.max_points,
                rule: q.rule.kind().to_string(),
            })
            .collect();
        Table::new(&lines)
            .with(Panel::footer(format!("Total: {} points", rubric.total_points())))
            .with(Style::modern())
            .to_string()
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.use_colors {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn score_color(&self, text: &str, percentage: f64) -> String {
        if percentage >= 80.0 {
            self.paint(text, |s| s.green())
        } else if percentage >= 60.0 {
            self.paint(text, |s| s.yellow())
        } else {
            self.paint(text, |s| s.red())
        }
    }

    fn colorize_grade(&self, grade: Grade) -> String {
        let s = grade.to_string();
        match grade {
            Grade::A => self.paint(&s, |s| s.green().bold()),
            Grade::B => self.paint(&s, |s| s.green()),
            Grade::C => self.paint(&s, |s| s.yellow()),
            Grade::D => self.paint(&s, |s| s.red()),
            Grade::F => self.paint(&s, |s| s.red().bold()),
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}
