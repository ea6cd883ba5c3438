//! Ledger repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist templates, assignments and outcome events.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `create_assignments` tolerates duplicate assignment ids silently.
//! - `record_event` rejects duplicate event ids (events are unique) and
//!   mirrors the event status onto the referenced assignment.
//! - Read paths reject malformed persisted state instead of masking it.

use crate::db::DbError;
use crate::model::task::{Skill, TaskAssignment, TaskEvent, TaskStatus, TaskTemplate};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ASSIGNMENT_SELECT_SQL: &str = "SELECT
    assignment_id,
    user_id,
    template_id,
    title,
    skill,
    date_assigned,
    status
FROM task_assignments";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for ledger persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// No assignment with the given id (or not visible to the caller).
    NotFound(String),
    /// Persisted row failed domain validation on read.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "assignment not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted ledger data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Abstract ledger collaborator required by the core services.
pub trait LedgerRepository {
    fn ensure_user(&self, user_id: i64) -> RepoResult<()>;
    fn upsert_template(&self, template: &TaskTemplate) -> RepoResult<()>;
    fn list_templates(&self) -> RepoResult<Vec<TaskTemplate>>;
    fn create_assignments(&self, assignments: &[TaskAssignment]) -> RepoResult<()>;
    fn record_event(&self, event: &TaskEvent) -> RepoResult<()>;
    fn fetch_assignment(&self, assignment_id: &str) -> RepoResult<Option<TaskAssignment>>;
    fn list_assignments_for_date(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> RepoResult<Vec<TaskAssignment>>;
    fn list_assignments_between(
        &self,
        user_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> RepoResult<Vec<TaskAssignment>>;
}

/// SQLite-backed ledger repository.
pub struct SqliteLedgerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLedgerRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl LedgerRepository for SqliteLedgerRepository<'_> {
    fn ensure_user(&self, user_id: i64) -> RepoResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO users (user_id, created_at) VALUES (?1, ?2);",
            params![user_id, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn upsert_template(&self, template: &TaskTemplate) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO task_templates (template_id, skill, title, min_minutes, max_minutes)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(template_id) DO UPDATE SET
                skill = excluded.skill,
                title = excluded.title,
                min_minutes = excluded.min_minutes,
                max_minutes = excluded.max_minutes;",
            params![
                template.template_id.as_str(),
                template.skill.as_str(),
                template.title.as_str(),
                template.min_minutes,
                template.max_minutes,
            ],
        )?;
        Ok(())
    }

    fn list_templates(&self) -> RepoResult<Vec<TaskTemplate>> {
        let mut stmt = self.conn.prepare(
            "SELECT template_id, skill, title, min_minutes, max_minutes
             FROM task_templates
             ORDER BY template_id;",
        )?;

        let mut rows = stmt.query([])?;
        let mut templates = Vec::new();
        while let Some(row) = rows.next()? {
            templates.push(parse_template_row(row)?);
        }
        Ok(templates)
    }

    fn create_assignments(&self, assignments: &[TaskAssignment]) -> RepoResult<()> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO task_assignments (
                assignment_id, user_id, template_id, title, skill, date_assigned, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(assignment_id) DO NOTHING;",
        )?;

        for assignment in assignments {
            stmt.execute(params![
                assignment.assignment_id.as_str(),
                assignment.user_id,
                assignment.template_id.as_str(),
                assignment.title.as_str(),
                assignment.skill.as_str(),
                assignment.date_assigned.to_string(),
                assignment.status.as_str(),
            ])?;
        }
        Ok(())
    }

    fn record_event(&self, event: &TaskEvent) -> RepoResult<()> {
        // Plain INSERT: a duplicate event id is a real fault and must
        // surface as a constraint error, unlike assignment re-inserts.
        self.conn.execute(
            "INSERT INTO task_events (
                event_id, assignment_id, user_id, status, created_at, note
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                event.event_id.to_string(),
                event.assignment_id.as_str(),
                event.user_id,
                event.status.as_str(),
                event.created_at.to_rfc3339(),
                event.note.as_deref(),
            ],
        )?;

        self.conn.execute(
            "UPDATE task_assignments SET status = ?1 WHERE assignment_id = ?2;",
            params![event.status.as_str(), event.assignment_id.as_str()],
        )?;
        Ok(())
    }

    fn fetch_assignment(&self, assignment_id: &str) -> RepoResult<Option<TaskAssignment>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ASSIGNMENT_SELECT_SQL} WHERE assignment_id = ?1;"))?;

        let mut rows = stmt.query([assignment_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_assignment_row(row)?));
        }
        Ok(None)
    }

    fn list_assignments_for_date(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> RepoResult<Vec<TaskAssignment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ASSIGNMENT_SELECT_SQL}
             WHERE user_id = ?1 AND date_assigned = ?2
             ORDER BY assignment_id;"
        ))?;

        let mut rows = stmt.query(params![user_id, date.to_string()])?;
        let mut assignments = Vec::new();
        while let Some(row) = rows.next()? {
            assignments.push(parse_assignment_row(row)?);
        }
        Ok(assignments)
    }

    fn list_assignments_between(
        &self,
        user_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> RepoResult<Vec<TaskAssignment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ASSIGNMENT_SELECT_SQL}
             WHERE user_id = ?1 AND date_assigned BETWEEN ?2 AND ?3
             ORDER BY date_assigned, assignment_id;"
        ))?;

        let mut rows = stmt.query(params![user_id, start_date.to_string(), end_date.to_string()])?;
        let mut assignments = Vec::new();
        while let Some(row) = rows.next()? {
            assignments.push(parse_assignment_row(row)?);
        }
        Ok(assignments)
    }
}

/// Fetches the full event history for one assignment, oldest first.
///
/// Diagnostic read path; the assignment row already mirrors the most
/// recent status.
pub fn list_events_for_assignment(
    conn: &Connection,
    assignment_id: &str,
) -> RepoResult<Vec<TaskEvent>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, assignment_id, user_id, status, created_at, note
         FROM task_events
         WHERE assignment_id = ?1
         ORDER BY created_at, event_id;",
    )?;

    let mut rows = stmt.query([assignment_id])?;
    let mut events = Vec::new();
    while let Some(row) = rows.next()? {
        events.push(parse_event_row(row)?);
    }
    Ok(events)
}

fn parse_template_row(row: &Row<'_>) -> RepoResult<TaskTemplate> {
    let skill_text: String = row.get("skill")?;
    let skill = parse_skill(&skill_text, "task_templates.skill")?;

    Ok(TaskTemplate {
        template_id: row.get("template_id")?,
        skill,
        title: row.get("title")?,
        min_minutes: row.get("min_minutes")?,
        max_minutes: row.get("max_minutes")?,
    })
}

fn parse_assignment_row(row: &Row<'_>) -> RepoResult<TaskAssignment> {
    let skill_text: String = row.get("skill")?;
    let status_text: String = row.get("status")?;
    let date_text: String = row.get("date_assigned")?;

    Ok(TaskAssignment {
        assignment_id: row.get("assignment_id")?,
        user_id: row.get("user_id")?,
        template_id: row.get("template_id")?,
        title: row.get("title")?,
        skill: parse_skill(&skill_text, "task_assignments.skill")?,
        date_assigned: parse_date(&date_text, "task_assignments.date_assigned")?,
        status: parse_status(&status_text, "task_assignments.status")?,
    })
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<TaskEvent> {
    let event_id_text: String = row.get("event_id")?;
    let event_id = Uuid::parse_str(&event_id_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{event_id_text}` in task_events.event_id"
        ))
    })?;

    let status_text: String = row.get("status")?;
    let created_at_text: String = row.get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_text)
        .map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid timestamp `{created_at_text}` in task_events.created_at"
            ))
        })?
        .with_timezone(&Utc);

    Ok(TaskEvent {
        event_id,
        assignment_id: row.get("assignment_id")?,
        user_id: row.get("user_id")?,
        status: parse_status(&status_text, "task_events.status")?,
        created_at,
        note: row.get("note")?,
    })
}

fn parse_skill(value: &str, column: &str) -> RepoResult<Skill> {
    Skill::parse(value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid skill `{value}` in {column}")))
}

fn parse_status(value: &str, column: &str) -> RepoResult<TaskStatus> {
    TaskStatus::parse(value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid status `{value}` in {column}")))
}

fn parse_date(value: &str, column: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| RepoError::InvalidData(format!("invalid date `{value}` in {column}")))
}
