//! Task domain model.
//!
//! # Responsibility
//! - Define the closed skill/status vocabularies and the template,
//!   assignment and event records built from them.
//! - Provide the pure day-level aggregation helpers shared by reports.
//!
//! # Invariants
//! - `Skill` and `TaskStatus` are closed sets; persistence round-trips
//!   them through their snake_case string tag.
//! - `TaskAssignment::assignment_id` is a pure function of
//!   `(user_id, date_assigned, template_id)` and is never regenerated.
//! - `completion_rate` always lands in `[0.0, 1.0]`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category of self-improvement activity. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Body,
    Capital,
    Productivity,
    GameThinking,
    Psyche,
    Language,
}

impl Skill {
    /// All skills in declaration order.
    pub const ALL: [Skill; 6] = [
        Skill::Body,
        Skill::Capital,
        Skill::Productivity,
        Skill::GameThinking,
        Skill::Psyche,
        Skill::Language,
    ];

    /// Stable string tag used by persistence and transports.
    pub fn as_str(self) -> &'static str {
        match self {
            Skill::Body => "body",
            Skill::Capital => "capital",
            Skill::Productivity => "productivity",
            Skill::GameThinking => "game_thinking",
            Skill::Psyche => "psyche",
            Skill::Language => "language",
        }
    }

    /// Parses a stored tag back into a skill. `None` for unknown tags.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "body" => Some(Skill::Body),
            "capital" => Some(Skill::Capital),
            "productivity" => Some(Skill::Productivity),
            "game_thinking" => Some(Skill::GameThinking),
            "psyche" => Some(Skill::Psyche),
            "language" => Some(Skill::Language),
            _ => None,
        }
    }
}

/// Outcome state of an assignment. Starts as `Assigned`; outcome events
/// move it to `Done` or `Failed` (last recorded event wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Assigned,
    Done,
    Failed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Assigned => "assigned",
            TaskStatus::Done => "done",
            TaskStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "assigned" => Some(TaskStatus::Assigned),
            "done" => Some(TaskStatus::Done),
            "failed" => Some(TaskStatus::Failed),
            _ => None,
        }
    }
}

/// Immutable catalog entry. Seeded once, uniquely keyed by `template_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub template_id: String,
    pub skill: Skill,
    pub title: String,
    /// Suggested effort floor in minutes.
    pub min_minutes: u32,
    /// Suggested effort ceiling in minutes.
    pub max_minutes: u32,
}

impl TaskTemplate {
    pub fn new(
        template_id: impl Into<String>,
        skill: Skill,
        title: impl Into<String>,
        min_minutes: u32,
        max_minutes: u32,
    ) -> Self {
        Self {
            template_id: template_id.into(),
            skill,
            title: title.into(),
            min_minutes,
            max_minutes,
        }
    }
}

/// A template instantiated for one user on one date.
///
/// `assignment_id` is the first 16 lowercase hex characters of
/// SHA-256(`"{user_id}:{date_assigned}:{template_id}"`), so regenerating
/// the same day yields identical rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAssignment {
    pub assignment_id: String,
    pub user_id: i64,
    pub template_id: String,
    pub title: String,
    pub skill: Skill,
    pub date_assigned: NaiveDate,
    pub status: TaskStatus,
}

/// Append-only outcome record. Recording one updates the referenced
/// assignment's stored status; the event log itself is never pruned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEvent {
    pub event_id: Uuid,
    pub assignment_id: String,
    pub user_id: i64,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub note: Option<String>,
}

/// Per-day outcome counts for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date_value: NaiveDate,
    pub assigned: usize,
    pub done: usize,
    pub failed: usize,
}

/// Seven-day outcome rollup with the flags the weekly policy consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeekSummary {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub completion_rate: f64,
    pub overload_flag: bool,
    pub stagnation_flag: bool,
    pub critical_failures: usize,
}

/// Thirty-day outcome rollup feeding the level decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    pub completion_rate: f64,
    pub closed_weeks: u32,
    pub critical_failures: usize,
    pub level_change: crate::policy::LevelDecision,
}

/// Workload adjustment derived from a week summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyAdjustment {
    pub week_start: NaiveDate,
    pub adjustment_note: String,
}

/// Difficulty-tier configuration selecting eligible skills and daily
/// task counts. A value, not persisted state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelRules {
    pub level: u32,
    pub active_skills: Vec<Skill>,
    pub max_daily_tasks: u32,
    pub min_daily_tasks: u32,
}

/// Share of completed assignments, rounded to 4 decimal places.
///
/// Returns `0.0` for an empty window instead of dividing by zero.
pub fn completion_rate(done: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = done as f64 / total as f64;
    (raw * 10_000.0).round() / 10_000.0
}

/// Counts outcomes among one day's assignments.
///
/// The date is taken from the first assignment; an empty slice reports
/// today's date with all counts zero.
pub fn summarize_day(assignments: &[TaskAssignment]) -> DaySummary {
    let assigned = assignments.len();
    let done = assignments
        .iter()
        .filter(|item| item.status == TaskStatus::Done)
        .count();
    let failed = assignments
        .iter()
        .filter(|item| item.status == TaskStatus::Failed)
        .count();
    let date_value = assignments
        .first()
        .map(|item| item.date_assigned)
        .unwrap_or_else(|| Utc::now().date_naive());

    DaySummary {
        date_value,
        assigned,
        done,
        failed,
    }
}
