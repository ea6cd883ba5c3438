//! Core domain logic for cadence, a daily self-improvement task engine.
//! This crate is the single source of truth for business invariants:
//! deterministic per-user/per-day task selection, outcome recording,
//! period summaries and the difficulty-adjustment policy.

pub mod catalog;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod picker;
pub mod policy;
pub mod repo;
pub mod service;

pub use catalog::{default_rules, default_templates};
pub use config::{load_settings, ConfigError, Settings};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{
    completion_rate, summarize_day, DaySummary, LevelRules, MonthSummary, Skill, TaskAssignment,
    TaskEvent, TaskStatus, TaskTemplate, WeekSummary, WeeklyAdjustment,
};
pub use picker::{assignment_fingerprint, build_daily_assignments};
pub use policy::{level_decision, weekly_adjustment, LevelDecision};
pub use repo::ledger_repo::{LedgerRepository, RepoError, RepoResult, SqliteLedgerRepository};
pub use service::task_service::{DailyPlan, TaskService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
