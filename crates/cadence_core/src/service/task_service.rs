//! Task use-case service.
//!
//! # Responsibility
//! - Expose the operations the transport layer binds to: plan
//!   generation, outcome recording and period summaries.
//! - Delegate persistence to the ledger repository contract.
//!
//! # Invariants
//! - Regenerating a plan for the same `(user, date)` with an unchanged
//!   catalog produces identical assignment rows.
//! - `record_result` records nothing for an unknown assignment id.
//! - Summaries are derived from current ledger content only.

use crate::catalog::{default_rules, default_templates};
use crate::model::task::{
    completion_rate, summarize_day, DaySummary, LevelRules, MonthSummary, TaskAssignment,
    TaskEvent, TaskStatus, WeekSummary, WeeklyAdjustment,
};
use crate::picker::build_daily_assignments;
use crate::policy;
use crate::repo::ledger_repo::{LedgerRepository, RepoError, RepoResult};
use chrono::{Days, NaiveDate, Utc};
use log::info;
use uuid::Uuid;

/// Failed-count floor before a week's failures count as critical.
const WEEK_CRITICAL_FAILURES: usize = 5;
/// Failed-count floor before a month's failures count as critical.
const MONTH_CRITICAL_FAILURES: usize = 15;

/// One generated day of assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyPlan {
    pub date_value: NaiveDate,
    pub assignments: Vec<TaskAssignment>,
}

/// Use-case facade over the ledger. Constructed once at process start
/// and passed by reference into command handlers.
pub struct TaskService<R: LedgerRepository> {
    repo: R,
}

impl<R: LedgerRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a user row if it does not exist yet.
    pub fn ensure_user(&self, user_id: i64) -> RepoResult<()> {
        self.repo.ensure_user(user_id)
    }

    /// Loads the default catalog. Idempotent: re-running refreshes the
    /// same template rows in place.
    pub fn seed_templates(&self) -> RepoResult<()> {
        let templates = default_templates();
        for template in &templates {
            self.repo.upsert_template(template)?;
        }
        info!(
            "event=seed_templates module=service status=ok count={}",
            templates.len()
        );
        Ok(())
    }

    /// Generates and persists the day's plan for one user.
    ///
    /// # Contract
    /// - Templates are filtered to `rules.active_skills`; an empty
    ///   filter result falls back to the full default catalog.
    /// - The draw is deterministic per `(user, date)`; re-running with
    ///   an unchanged catalog re-inserts the same ids, which the ledger
    ///   absorbs as a no-op.
    pub fn generate_daily_plan(
        &self,
        user_id: i64,
        date: NaiveDate,
        rules: &LevelRules,
    ) -> RepoResult<DailyPlan> {
        let mut templates: Vec<_> = self
            .repo
            .list_templates()?
            .into_iter()
            .filter(|template| rules.active_skills.contains(&template.skill))
            .collect();
        if templates.is_empty() {
            templates = default_templates();
        }

        let assignments = build_daily_assignments(user_id, date, rules, &templates);
        // Assignments carry a user foreign key; make the row exist even
        // when the transport skipped explicit registration.
        self.repo.ensure_user(user_id)?;
        self.repo.create_assignments(&assignments)?;

        info!(
            "event=daily_plan module=service status=ok user_id={user_id} date={date} count={}",
            assignments.len()
        );

        Ok(DailyPlan {
            date_value: date,
            assignments,
        })
    }

    /// Records an outcome event and mirrors it onto the assignment.
    ///
    /// # Errors
    /// - `NotFound` when the assignment id is unknown; no event is
    ///   recorded in that case.
    pub fn record_result(
        &self,
        user_id: i64,
        assignment_id: &str,
        status: TaskStatus,
        note: Option<String>,
    ) -> RepoResult<TaskEvent> {
        if self.repo.fetch_assignment(assignment_id)?.is_none() {
            return Err(RepoError::NotFound(assignment_id.to_string()));
        }

        let event = TaskEvent {
            event_id: Uuid::new_v4(),
            assignment_id: assignment_id.to_string(),
            user_id,
            status,
            created_at: Utc::now(),
            note,
        };
        self.repo.record_event(&event)?;

        info!(
            "event=record_result module=service status=ok user_id={user_id} assignment_id={assignment_id} outcome={}",
            status.as_str()
        );
        Ok(event)
    }

    /// Ownership-bearing lookup used by transport boundaries to treat
    /// another user's assignment exactly like a missing one.
    pub fn fetch_assignment(&self, assignment_id: &str) -> RepoResult<Option<TaskAssignment>> {
        self.repo.fetch_assignment(assignment_id)
    }

    /// Assignments for one user on one date, ordered by assignment id.
    pub fn assignments_for_date(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> RepoResult<Vec<TaskAssignment>> {
        self.repo.list_assignments_for_date(user_id, date)
    }

    /// Outcome counts among the user's assignments dated exactly `date`.
    pub fn daily_summary(&self, user_id: i64, date: NaiveDate) -> RepoResult<DaySummary> {
        let assignments = self.repo.list_assignments_for_date(user_id, date)?;
        Ok(summarize_day(&assignments))
    }

    /// Seven-day rollup over `[week_start, week_start+6]`.
    pub fn weekly_summary(&self, user_id: i64, week_start: NaiveDate) -> RepoResult<WeekSummary> {
        let week_end = week_start + Days::new(6);
        let assignments = self
            .repo
            .list_assignments_between(user_id, week_start, week_end)?;
        let (done, failed, total) = count_outcomes(&assignments);

        let critical_failures = if failed >= WEEK_CRITICAL_FAILURES {
            failed
        } else {
            0
        };

        Ok(WeekSummary {
            week_start,
            week_end,
            completion_rate: completion_rate(done, total),
            overload_flag: total > 7 * default_rules().max_daily_tasks as usize,
            stagnation_flag: done == 0 && total > 0,
            critical_failures,
        })
    }

    /// Week summary turned into its single adjustment note.
    pub fn weekly_adjustment(&self, summary: &WeekSummary) -> WeeklyAdjustment {
        policy::weekly_adjustment(summary)
    }

    /// Thirty-day rollup over `[month_start, month_start+29]`, embedding
    /// the level decision.
    ///
    /// The window is calendar-approximate by design, not month-exact.
    pub fn monthly_summary(
        &self,
        user_id: i64,
        month_start: NaiveDate,
        level: u32,
    ) -> RepoResult<MonthSummary> {
        let month_end = month_start + Days::new(29);
        let assignments = self
            .repo
            .list_assignments_between(user_id, month_start, month_end)?;
        let (done, failed, total) = count_outcomes(&assignments);

        let completion = completion_rate(done, total);
        // TODO: derive closed_weeks from recorded weekly closures once
        // the ledger tracks them; until then every month reports 4.
        let closed_weeks = 4;
        let critical_failures = if failed >= MONTH_CRITICAL_FAILURES {
            failed
        } else {
            0
        };
        let level_change = policy::level_decision(completion, closed_weeks, critical_failures, level);

        Ok(MonthSummary {
            month_start,
            month_end,
            completion_rate: completion,
            closed_weeks,
            critical_failures,
            level_change,
        })
    }
}

fn count_outcomes(assignments: &[TaskAssignment]) -> (usize, usize, usize) {
    let done = assignments
        .iter()
        .filter(|item| item.status == TaskStatus::Done)
        .count();
    let failed = assignments
        .iter()
        .filter(|item| item.status == TaskStatus::Failed)
        .count();
    (done, failed, assignments.len())
}
