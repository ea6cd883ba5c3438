use cadence_core::db::open_db_in_memory;
use cadence_core::repo::ledger_repo::LedgerRepository;
use cadence_core::{
    assignment_fingerprint, default_templates, LevelDecision, SqliteLedgerRepository,
    TaskAssignment, TaskService, TaskStatus,
};
use chrono::{Days, NaiveDate};

fn week_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

/// Inserts `count` assignments for the user, walking the window day by
/// day and the default catalog template by template, then records the
/// requested number of done/failed outcomes oldest-first.
fn seed_window(
    service: &TaskService<SqliteLedgerRepository<'_>>,
    repo: &SqliteLedgerRepository<'_>,
    user_id: i64,
    start: NaiveDate,
    count: usize,
    done: usize,
    failed: usize,
) {
    assert!(done + failed <= count);
    let templates = default_templates();

    let mut rows = Vec::new();
    for index in 0..count {
        let date = start + Days::new((index / templates.len()) as u64);
        let template = &templates[index % templates.len()];
        rows.push(TaskAssignment {
            assignment_id: assignment_fingerprint(user_id, date, &template.template_id),
            user_id,
            template_id: template.template_id.clone(),
            title: template.title.clone(),
            skill: template.skill,
            date_assigned: date,
            status: TaskStatus::Assigned,
        });
    }
    repo.ensure_user(user_id).unwrap();
    repo.create_assignments(&rows).unwrap();

    for row in rows.iter().take(done) {
        service
            .record_result(user_id, &row.assignment_id, TaskStatus::Done, None)
            .unwrap();
    }
    for row in rows.iter().skip(done).take(failed) {
        service
            .record_result(user_id, &row.assignment_id, TaskStatus::Failed, None)
            .unwrap();
    }
}

#[test]
fn daily_summary_counts_only_that_date() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLedgerRepository::new(&conn);
    let service = TaskService::new(SqliteLedgerRepository::new(&conn));
    service.seed_templates().unwrap();

    // Twelve assignments spread over two days: 6 on day one, 6 on day
    // two; 3 done and 1 failed among the first six.
    seed_window(&service, &repo, 1, week_start(), 12, 3, 1);

    let summary = service.daily_summary(1, week_start()).unwrap();
    assert_eq!(summary.date_value, week_start());
    assert_eq!(summary.assigned, 6);
    assert_eq!(summary.done, 3);
    assert_eq!(summary.failed, 1);
}

#[test]
fn daily_summary_of_empty_day_is_zeroed() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteLedgerRepository::new(&conn));
    service.seed_templates().unwrap();

    let summary = service.daily_summary(1, week_start()).unwrap();
    assert_eq!(summary.assigned, 0);
    assert_eq!(summary.done, 0);
    assert_eq!(summary.failed, 0);
}

#[test]
fn stagnant_week_sets_stagnation_but_not_overload() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLedgerRepository::new(&conn);
    let service = TaskService::new(SqliteLedgerRepository::new(&conn));
    service.seed_templates().unwrap();

    // total=10, done=0: stagnation, and 10 <= 21 so no overload.
    seed_window(&service, &repo, 2, week_start(), 10, 0, 0);

    let summary = service.weekly_summary(2, week_start()).unwrap();
    assert_eq!(summary.completion_rate, 0.0);
    assert!(summary.stagnation_flag);
    assert!(!summary.overload_flag);
    assert_eq!(summary.critical_failures, 0);

    let adjustment = service.weekly_adjustment(&summary);
    assert_eq!(adjustment.adjustment_note, "reduce load: stagnation");
}

#[test]
fn overloaded_week_sets_overload_flag() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLedgerRepository::new(&conn);
    let service = TaskService::new(SqliteLedgerRepository::new(&conn));
    service.seed_templates().unwrap();

    // 22 assignments exceed 7 * 3; one done avoids the stagnation flag.
    seed_window(&service, &repo, 3, week_start(), 22, 1, 0);

    let summary = service.weekly_summary(3, week_start()).unwrap();
    assert!(summary.overload_flag);
    assert!(!summary.stagnation_flag);

    let adjustment = service.weekly_adjustment(&summary);
    assert_eq!(adjustment.adjustment_note, "reduce load: overload");
}

#[test]
fn week_critical_failures_apply_at_threshold_of_five() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLedgerRepository::new(&conn);
    let service = TaskService::new(SqliteLedgerRepository::new(&conn));
    service.seed_templates().unwrap();

    seed_window(&service, &repo, 4, week_start(), 10, 1, 4);
    let below = service.weekly_summary(4, week_start()).unwrap();
    assert_eq!(below.critical_failures, 0);

    seed_window(&service, &repo, 5, week_start(), 10, 1, 5);
    let at_threshold = service.weekly_summary(5, week_start()).unwrap();
    assert_eq!(at_threshold.critical_failures, 5);
}

#[test]
fn weekly_completion_rate_is_rounded_share_of_done() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLedgerRepository::new(&conn);
    let service = TaskService::new(SqliteLedgerRepository::new(&conn));
    service.seed_templates().unwrap();

    seed_window(&service, &repo, 6, week_start(), 12, 4, 2);

    let summary = service.weekly_summary(6, week_start()).unwrap();
    assert_eq!(summary.completion_rate, 0.3333);
    assert_eq!(summary.week_end, week_start() + Days::new(6));
}

#[test]
fn empty_week_reports_zero_rate_and_no_flags() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteLedgerRepository::new(&conn));
    service.seed_templates().unwrap();

    let summary = service.weekly_summary(7, week_start()).unwrap();
    assert_eq!(summary.completion_rate, 0.0);
    assert!(!summary.stagnation_flag);
    assert!(!summary.overload_flag);

    let adjustment = service.weekly_adjustment(&summary);
    assert_eq!(adjustment.adjustment_note, "no change");
}

#[test]
fn strong_month_promotes_to_next_level() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLedgerRepository::new(&conn);
    let service = TaskService::new(SqliteLedgerRepository::new(&conn));
    service.seed_templates().unwrap();

    // 17/20 done = 0.85; 3 failures stay below the monthly threshold.
    seed_window(&service, &repo, 8, week_start(), 20, 17, 3);

    let summary = service.monthly_summary(8, week_start(), 1).unwrap();
    assert_eq!(summary.completion_rate, 0.85);
    assert_eq!(summary.closed_weeks, 4);
    assert_eq!(summary.critical_failures, 0);
    assert_eq!(summary.level_change, LevelDecision::Promote(2));
    assert_eq!(summary.level_change.to_string(), "promote:2");
}

#[test]
fn month_with_critical_failures_holds_regardless_of_rate() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLedgerRepository::new(&conn);
    let service = TaskService::new(SqliteLedgerRepository::new(&conn));
    service.seed_templates().unwrap();

    // 16 failures cross the >=15 monthly threshold.
    seed_window(&service, &repo, 9, week_start(), 40, 24, 16);

    let summary = service.monthly_summary(9, week_start(), 1).unwrap();
    assert_eq!(summary.critical_failures, 16);
    assert_eq!(summary.level_change, LevelDecision::Hold);
}

#[test]
fn monthly_window_spans_thirty_days() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLedgerRepository::new(&conn);
    let service = TaskService::new(SqliteLedgerRepository::new(&conn));
    service.seed_templates().unwrap();

    // One done assignment on day 30 (inside) and one untouched on
    // day 31 (outside the window).
    let inside = week_start() + Days::new(29);
    let outside = week_start() + Days::new(30);
    seed_one(&service, &repo, 10, inside, TaskStatus::Done);
    seed_one(&service, &repo, 10, outside, TaskStatus::Assigned);

    let summary = service.monthly_summary(10, week_start(), 1).unwrap();
    assert_eq!(summary.month_end, inside);
    assert_eq!(summary.completion_rate, 1.0);
}

fn seed_one(
    service: &TaskService<SqliteLedgerRepository<'_>>,
    repo: &SqliteLedgerRepository<'_>,
    user_id: i64,
    date: NaiveDate,
    status: TaskStatus,
) {
    let template = &default_templates()[0];
    let assignment = TaskAssignment {
        assignment_id: assignment_fingerprint(user_id, date, &template.template_id),
        user_id,
        template_id: template.template_id.clone(),
        title: template.title.clone(),
        skill: template.skill,
        date_assigned: date,
        status: TaskStatus::Assigned,
    };
    repo.ensure_user(user_id).unwrap();
    repo.create_assignments(std::slice::from_ref(&assignment)).unwrap();
    if status != TaskStatus::Assigned {
        service
            .record_result(user_id, &assignment.assignment_id, status, None)
            .unwrap();
    }
}
