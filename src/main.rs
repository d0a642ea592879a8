//! CLI entry point for the student grade ledger.
//!
//! Runs the interactive menu by default, or a single action given as a
//! subcommand. Record errors are reported and the process still exits
//! normally.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use student_grades::{
    analyzers::aggregate::aggregate,
    config::StoreConfig,
    editor::GradeEditor,
    error::RecordError,
    output::{write_aggregates, write_json, write_student, write_student_table},
    record::StudentRecord,
    repository::{Repository, Selection},
    session::Session,
    storage::{CsvStorage, Storage},
};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "student_grades")]
#[command(about = "Record student grades and compute group averages", long_about = None)]
struct Cli {
    /// Directory holding students.csv and averages.csv
    #[arg(
        short,
        long,
        global = true,
        env = "STUDENTS_DATA_DIR",
        default_value = "data"
    )]
    data_dir: PathBuf,

    /// Override the student table path
    #[arg(long, global = true, env = "STUDENTS_FILE")]
    students_file: Option<PathBuf>,

    /// Override the aggregate table path
    #[arg(long, global = true, env = "AVERAGES_FILE")]
    averages_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create empty tables if none exist
    Init,
    /// List all students in stored order
    List,
    /// Show one student's details and grades
    Show {
        #[command(flatten)]
        target: Target,
    },
    /// Append grades to a student and update their average
    AddGrades {
        #[command(flatten)]
        target: Target,

        /// Whitespace-separated grades, e.g. "80 95 71"
        #[arg(short, long, allow_hyphen_values = true)]
        grades: String,
    },
    /// Recompute group and overall averages and store them
    Aggregate {
        /// Print the report as JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run the interactive menu (default)
    Interactive,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct Target {
    /// 1-based student number as shown by `list`
    #[arg(short, long)]
    position: Option<String>,

    /// Exact full name
    #[arg(short, long)]
    name: Option<String>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _log_guard = init_logging()?;

    let cli = Cli::parse();
    let config = StoreConfig::in_dir(&cli.data_dir)
        .with_overrides(cli.students_file, cli.averages_file);
    info!(
        students = %config.students_file.display(),
        averages = %config.averages_file.display(),
        "Using data files"
    );

    let repo = Repository::new(CsvStorage::from_config(&config));
    let command = cli.command.unwrap_or(Commands::Interactive);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match run_command(repo, command, &mut out) {
        Ok(()) => Ok(()),
        Err(e) => match e.downcast_ref::<RecordError>() {
            Some(record_error) => {
                error!(error = %record_error, "Command failed");
                writeln!(out, "Error: {record_error}")?;
                Ok(())
            }
            None => Err(e),
        },
    }
}

/// Logging setup: colored stderr + JSON rolling log file.
///
/// The returned guard flushes the file writer when dropped.
fn init_logging() -> Result<WorkerGuard> {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/student_grades.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("student_grades.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    // stderr stays quiet by default so it does not interleave with the menu
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("warn".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(file_guard)
}

#[tracing::instrument(skip(repo, out))]
fn run_command<S: Storage>(
    mut repo: Repository<S>,
    command: Commands,
    out: &mut impl Write,
) -> Result<()> {
    repo.initialize()?;

    match command {
        Commands::Init => {
            writeln!(out, "Data files are ready.")?;
        }
        Commands::List => {
            let records = repo.load()?;
            write_student_table(out, &records)?;
        }
        Commands::Show { target } => {
            let records = repo.load()?;
            let selection = select(&repo, &target, &records)?;
            write_student(out, selection.record)?;
        }
        Commands::AddGrades { target, grades } => {
            let mut records = repo.load()?;
            let position = select(&repo, &target, &records)?.position;
            let updated = GradeEditor::new(&mut repo).apply(&mut records, position, &grades)?;
            writeln!(out, "Grades added for {}.", updated.full_name)?;
            write_student(out, updated)?;
        }
        Commands::Aggregate { json } => {
            let records = repo.load()?;
            let report = aggregate(&records);
            repo.save_aggregates(&report.rows)?;

            if json {
                write_json(out, &report)?;
            } else {
                write_aggregates(out, &report)?;
            }
        }
        Commands::Interactive => {
            let stdin = std::io::stdin();
            Session::new(repo, stdin.lock(), out).run()?;
        }
    }

    Ok(())
}

fn select<'a, S: Storage>(
    repo: &Repository<S>,
    target: &Target,
    records: &'a [StudentRecord],
) -> Result<Selection<'a>, RecordError> {
    match &target.position {
        Some(position) => repo.find_by_position(position, records),
        None => repo.find_by_name(target.name.as_deref().unwrap_or_default(), records),
    }
}
