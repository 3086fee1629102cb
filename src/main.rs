//! gradekit: heuristic autograder CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use gradekit::collect::Collector;
use gradekit::config::{build_ignore_set, load_config, write_config, Config, CONFIG_FILENAME};
use gradekit::grader::{Gradebook, GradingEngine, SkippedRecord};
use gradekit::reporter::csv::{default_export_path, export_gradebook};
use gradekit::reporter::feedback::write_feedback_reports;
use gradekit::reporter::{ConsoleReporter, JsonReporter, TextDocumentWriter};
use gradekit::rubric::builtin;
use gradekit::submission::find_submission;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

/// gradekit: heuristic autograder for short-answer coursework
#[derive(Parser, Debug)]
#[command(name = "gradekit")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
#[command(subcommand_negates_reqs = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Question id to grade, or `all` (omit when using a subcommand)
    #[arg(required = true, value_name = "QUESTION|all")]
    question: Option<String>,

    /// Directory holding the submission record (default: current)
    #[arg(long, short)]
    dir: Option<PathBuf>,

    /// Grade this submission file instead of searching --dir
    #[arg(long, short)]
    submission: Option<PathBuf>,

    /// Path to config file (default: search .gradekit.json in current dir and parents)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format as JSON
    #[arg(long, short)]
    json: bool,

    /// Quiet mode (score line only)
    #[arg(long, short, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose output (question prompts, debug logging)
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Grade every submission in a directory and summarize the class
    Gradebook {
        /// Directory of submission records (default: current)
        dir: Option<PathBuf>,

        /// Export a CSV gradebook (default name: <course>_<assignment>_grades_<timestamp>.csv)
        #[arg(long, value_name = "CSV", num_args = 0..=1)]
        export: Option<Option<PathBuf>>,

        /// Write one feedback .txt per student into this directory
        #[arg(long, value_name = "DIR")]
        feedback_dir: Option<PathBuf>,

        /// Output format as JSON
        #[arg(long, short)]
        json: bool,

        /// Grade records in parallel
        #[arg(long)]
        parallel: bool,

        /// Number of parallel threads (default: number of CPU cores)
        #[arg(long, value_name = "N", requires = "parallel")]
        jobs: Option<usize>,

        /// Path to config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Quiet mode (one line per student)
        #[arg(long, short, conflicts_with = "verbose")]
        quiet: bool,

        /// Verbose output
        #[arg(long, short)]
        verbose: bool,
    },

    /// Answer the assignment interactively and save the submission record
    Submit {
        /// Where to write the record and proof document (default: current)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Path to config file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create .gradekit.json containing the built-in rubric
    Init {
        /// Directory in which to create config (default: current)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// List the rubric questions
    Questions {
        /// Print the question tables as JSON
        #[arg(long, short)]
        json: bool,

        /// Path to config file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn init_logging(quiet: bool, verbose: bool) {
    let level = if quiet {
        LevelFilter::OFF
    } else if verbose {
        LevelFilter::from_level(Level::DEBUG)
    } else {
        LevelFilter::from_level(Level::WARN)
    };
    let fmt = fmt::layer()
        .with_writer(io::stderr)
        .without_time()
        .with_target(false)
        .with_file(false)
        .with_line_number(false);
    tracing_subscriber::registry().with(fmt).with(level).init();
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();

    if let Some(cmd) = args.command {
        return match cmd {
            Commands::Gradebook {
                dir,
                export,
                feedback_dir,
                json,
                parallel,
                jobs,
                config,
                quiet,
                verbose,
            } => {
                init_logging(quiet, verbose);
                run_gradebook(GradebookOptions {
                    dir,
                    export,
                    feedback_dir,
                    json,
                    parallel,
                    jobs,
                    config,
                    quiet,
                    verbose,
                })
            }
            Commands::Submit { out_dir, config } => {
                init_logging(false, false);
                run_submit(out_dir.as_deref(), config.as_deref())
            }
            Commands::Init { dir } => run_init(dir.as_deref()),
            Commands::Questions { json, config } => {
                init_logging(false, false);
                run_questions(json, config.as_deref())
            }
        };
    }

    init_logging(args.quiet, args.verbose);
    let question = args
        .question
        .clone()
        .context("a question id or `all` is required")?;
    run_grade(&args, &question)
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to get current directory")
}

/// Grade one question (or all of them) for a single submission
fn run_grade(args: &Args, question: &str) -> Result<ExitCode> {
    let cwd = current_dir()?;
    let search_dir = args.dir.clone().unwrap_or_else(|| cwd.clone());
    let config_dir = match &args.submission {
        Some(file) => file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.clone()),
        None => search_dir.clone(),
    };

    let config = load_config(&config_dir, args.config.as_deref())?;
    let engine = GradingEngine::new(config.rubric()?);

    let path = match &args.submission {
        Some(file) => file.clone(),
        None => find_submission(&search_dir, config.submission_pattern())?,
    };
    tracing::debug!(path = %path.display(), "grading submission");
    let submission = gradekit::submission::load_submission(&path)?;

    let console = if args.verbose {
        ConsoleReporter::new().verbose()
    } else {
        ConsoleReporter::new()
    };

    let full_credit = if question.eq_ignore_ascii_case("all") {
        let report = engine.grade(&submission);
        if args.json {
            println!("{}", JsonReporter::new().pretty().report(&report));
        } else if args.quiet {
            console.report_quiet(&report);
        } else {
            console.report(&report, engine.rubric());
        }
        report.is_full_credit()
    } else {
        let score = engine.grade_question(&submission, question)?;
        if args.json {
            println!("{}", JsonReporter::new().pretty().report_question(&score));
        } else if args.quiet {
            println!(
                "Score: {}/{} ({:.1}%)",
                score.earned, score.max_points, score.percentage
            );
        } else {
            console.report_question(&score);
        }
        score.is_full_credit()
    };

    Ok(if full_credit {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

struct GradebookOptions {
    dir: Option<PathBuf>,
    export: Option<Option<PathBuf>>,
    feedback_dir: Option<PathBuf>,
    json: bool,
    parallel: bool,
    jobs: Option<usize>,
    config: Option<PathBuf>,
    quiet: bool,
    verbose: bool,
}

fn run_gradebook(opts: GradebookOptions) -> Result<ExitCode> {
    let cwd = current_dir()?;
    let dir = opts.dir.clone().unwrap_or_else(|| cwd.clone());
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    let config = load_config(&dir, opts.config.as_deref())?;
    let engine = GradingEngine::new(config.rubric()?);
    let ignore_set = if config.ignore.is_empty() {
        None
    } else {
        Some(build_ignore_set(&config.ignore)?)
    };

    if let Some(jobs) = opts.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    let book = Gradebook::collect(
        &engine,
        &dir,
        config.submission_pattern(),
        ignore_set.as_ref(),
        opts.parallel,
        config.pass_threshold(),
    )?;

    if book.is_empty() {
        warn_skipped(&book.skipped);
        eprintln!(
            "{}: No submissions matching `{}` could be graded in {}",
            "Warning".yellow(),
            config.submission_pattern(),
            dir.display()
        );
        return Ok(ExitCode::from(2));
    }

    let console = if opts.verbose {
        ConsoleReporter::new().verbose()
    } else {
        ConsoleReporter::new()
    };
    if opts.json {
        println!("{}", JsonReporter::new().pretty().report_gradebook(&book));
        warn_skipped(&book.skipped);
    } else if opts.quiet {
        for row in &book.rows {
            console.report_quiet(&row.report);
        }
        warn_skipped(&book.skipped);
    } else {
        console.report_gradebook(&book);
    }

    if let Some(export) = &opts.export {
        let path = match export {
            Some(p) => p.clone(),
            None => default_export_path(&cwd, config.course(), config.assignment()),
        };
        export_gradebook(&book, engine.rubric(), &path)?;
        if !opts.quiet {
            eprintln!("{}: Grades exported to {}", "Info".blue(), path.display());
        }
    }

    if let Some(feedback_dir) = &opts.feedback_dir {
        let title = format!("{} - {}", config.course(), config.assignment());
        let written = write_feedback_reports(&book, engine.rubric(), &title, feedback_dir)?;
        if !opts.quiet {
            eprintln!(
                "{}: Wrote {} feedback reports to {}",
                "Info".blue(),
                written.len(),
                feedback_dir.display()
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Skipped records are always reported, whatever the output mode
fn warn_skipped(skipped: &[SkippedRecord]) {
    for record in skipped {
        eprintln!(
            "{}: skipped {}: {}",
            "Warning".yellow(),
            record.path.display(),
            record.reason
        );
    }
}

fn run_submit(out_dir: Option<&Path>, config_path: Option<&Path>) -> Result<ExitCode> {
    let cwd = current_dir()?;
    let out_dir = out_dir.unwrap_or(&cwd);
    let config = load_config(out_dir, config_path)?;
    let rubric = config.rubric()?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let outcome = Collector::new(stdin.lock(), stdout.lock()).submit(
        &rubric,
        config.course(),
        config.assignment(),
        config.submission_pattern(),
        out_dir,
        &TextDocumentWriter,
    )?;

    println!(
        "{}: {} answers recorded for {}",
        "Done".green().bold(),
        outcome.submission.answers.len(),
        outcome.submission.student.display_name()
    );
    Ok(ExitCode::SUCCESS)
}

fn run_init(dir: Option<&Path>) -> Result<ExitCode> {
    let cwd = current_dir()?;
    let dir = dir.unwrap_or(&cwd);
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() {
        eprintln!(
            "{}: {} already exists; use --dir to write elsewhere or remove it first",
            "Warning".yellow(),
            config_path.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let config = Config::builtin();
    let written = write_config(dir, &config)?;
    println!(
        "{}: Created {} with {} questions ({} points)",
        "Done".green().bold(),
        written.display(),
        builtin::assignment_one().len(),
        config.rubric()?.total_points()
    );
    Ok(ExitCode::SUCCESS)
}

fn run_questions(json: bool, config_path: Option<&Path>) -> Result<ExitCode> {
    let cwd = current_dir()?;
    let config = load_config(&cwd, config_path)?;
    let rubric = config.rubric()?;

    if json {
        let specs = config
            .questions
            .clone()
            .unwrap_or_else(builtin::assignment_one);
        let out = serde_json::to_string_pretty(&specs).context("Failed to serialize questions")?;
        println!("{}", out);
    } else {
        println!("{}", ConsoleReporter::new().render_rubric(&rubric));
    }
    Ok(ExitCode::SUCCESS)
}
