//! Command-line transport binding for the cadence core.
//!
//! # Responsibility
//! - Parse user commands and resolve "today" in the configured
//!   timezone before calling the date-only core.
//! - Enforce the ownership check at the boundary: another user's
//!   assignment is reported exactly like a missing one.
//!
//! # Invariants
//! - Settings and the service are built once and passed by reference;
//!   no global state.

use cadence_core::db::open_db;
use cadence_core::{
    default_rules, init_logging, load_settings, Settings, SqliteLedgerRepository, TaskService,
    TaskStatus,
};
use chrono::{Datelike, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use std::error::Error;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "cadence", about = "Daily self-improvement task tracker")]
struct Cli {
    /// Acting user id.
    #[arg(long, env = "CADENCE_USER_ID")]
    user: i64,

    /// Override the resolved calendar date (YYYY-MM-DD).
    #[arg(long)]
    date: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register the user.
    Start,
    /// Show today's assignments, generating them on first call.
    Day,
    /// Record an assignment as completed.
    Done {
        assignment_id: String,
        /// Optional free-form note attached to the outcome event.
        #[arg(long)]
        note: Option<String>,
    },
    /// Record an assignment as failed.
    Fail {
        assignment_id: String,
        #[arg(long)]
        note: Option<String>,
    },
    /// Today's outcome counts.
    Status,
    /// Current week's summary and workload adjustment.
    Week,
    /// Current month's summary and level decision.
    Month,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let settings = load_settings()?;
    if let Some(log_dir) = &settings.log_dir {
        init_logging(&settings.log_level, log_dir)?;
    }

    let conn = open_db(&settings.db_path)?;
    let service = TaskService::new(SqliteLedgerRepository::new(&conn));
    service.seed_templates()?;

    let today = cli.date.map(Ok).unwrap_or_else(|| resolve_today(&settings))?;
    let rules = default_rules();

    match &cli.command {
        Command::Start => {
            service.ensure_user(cli.user)?;
            println!("Registered. From here on, only facts. Use `day` for assignments.");
        }
        Command::Day => {
            let mut assignments = service.assignments_for_date(cli.user, today)?;
            if assignments.is_empty() {
                assignments = service.generate_daily_plan(cli.user, today, &rules)?.assignments;
            }
            println!("Assignments for {today}:");
            for item in &assignments {
                println!("{} | {} | {}", item.assignment_id, item.skill.as_str(), item.title);
            }
        }
        Command::Done { assignment_id, note } => {
            record_outcome(&service, cli.user, assignment_id, TaskStatus::Done, note.clone())?;
            println!("Recorded: done.");
        }
        Command::Fail { assignment_id, note } => {
            record_outcome(&service, cli.user, assignment_id, TaskStatus::Failed, note.clone())?;
            println!("Recorded: failed.");
        }
        Command::Status => {
            let summary = service.daily_summary(cli.user, today)?;
            println!(
                "Day {}: {}/{} done, {} failed.",
                summary.date_value, summary.done, summary.assigned, summary.failed
            );
        }
        Command::Week => {
            let week_start = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
            let summary = service.weekly_summary(cli.user, week_start)?;
            let adjustment = service.weekly_adjustment(&summary);
            println!("Week {} .. {}", summary.week_start, summary.week_end);
            println!("Completion: {:.0}%", summary.completion_rate * 100.0);
            println!("Overload: {}", yes_no(summary.overload_flag));
            println!("Stagnation: {}", yes_no(summary.stagnation_flag));
            println!("Adjustment: {}", adjustment.adjustment_note);
        }
        Command::Month => {
            let month_start = today.with_day(1).unwrap_or(today);
            let summary = service.monthly_summary(cli.user, month_start, rules.level)?;
            println!("Month {} .. {}", summary.month_start, summary.month_end);
            println!("Completion: {:.0}%", summary.completion_rate * 100.0);
            println!("Closed weeks: {}", summary.closed_weeks);
            println!("Critical failures: {}", summary.critical_failures);
            println!("Level decision: {}", summary.level_change);
        }
    }

    Ok(())
}

/// Boundary-level outcome recording with the ownership check.
fn record_outcome(
    service: &TaskService<SqliteLedgerRepository<'_>>,
    user_id: i64,
    assignment_id: &str,
    status: TaskStatus,
    note: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let owned = service
        .fetch_assignment(assignment_id)?
        .is_some_and(|assignment| assignment.user_id == user_id);
    if !owned {
        return Err(format!("assignment not found: {assignment_id}").into());
    }

    service.record_result(user_id, assignment_id, status, note)?;
    Ok(())
}

/// Resolves today's calendar date in the configured timezone.
fn resolve_today(settings: &Settings) -> Result<NaiveDate, Box<dyn Error>> {
    let tz: Tz = settings
        .timezone
        .parse()
        .map_err(|_| format!("unknown timezone `{}`", settings.timezone))?;
    Ok(Utc::now().with_timezone(&tz).date_naive())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
