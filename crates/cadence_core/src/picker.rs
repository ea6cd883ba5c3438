//! Deterministic daily task selection.
//!
//! # Responsibility
//! - Derive a reproducible per-user/per-day template draw.
//! - Compute stable assignment fingerprints.
//!
//! # Invariants
//! - The draw is keyed only by `(user_id, date)` and the eligible
//!   template set; process restarts do not change it.
//! - Each call builds a fresh generator, so concurrent draws for
//!   different users never share mutable PRNG state.
//! - `assignment_fingerprint` is a pure function of
//!   `(user_id, date, template_id)`.

use crate::model::task::{LevelRules, TaskAssignment, TaskStatus, TaskTemplate};
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// Hex width of an assignment id: first 8 digest bytes.
const FINGERPRINT_BYTES: usize = 8;

/// Stable 16-character hex id for one `(user, date, template)` triple.
pub fn assignment_fingerprint(user_id: i64, date: NaiveDate, template_id: &str) -> String {
    let digest = Sha256::digest(format!("{user_id}:{date}:{template_id}").as_bytes());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

/// Seeded generator for one `(user, date)` draw.
///
/// The full SHA-256 digest of `"{user_id}:{date}"` seeds a ChaCha8
/// stream, pinning the algorithm instead of relying on the platform's
/// ambient generator.
fn plan_rng(user_id: i64, date: NaiveDate) -> ChaCha8Rng {
    let digest = Sha256::digest(format!("{user_id}:{date}").as_bytes());
    ChaCha8Rng::from_seed(digest.into())
}

/// Builds the day's assignments from the eligible template set.
///
/// # Contract
/// - Samples `min(k, |templates|)` distinct templates without
///   replacement, with `k` uniform in
///   `[rules.min_daily_tasks, rules.max_daily_tasks]`.
/// - The draw is independent of the incoming template order: templates
///   are sorted by `template_id` before sampling.
/// - Every produced assignment starts as [`TaskStatus::Assigned`] and
///   carries its template's skill and title.
pub fn build_daily_assignments(
    user_id: i64,
    date: NaiveDate,
    rules: &LevelRules,
    templates: &[TaskTemplate],
) -> Vec<TaskAssignment> {
    let mut ordered: Vec<&TaskTemplate> = templates.iter().collect();
    ordered.sort_by(|a, b| a.template_id.cmp(&b.template_id));

    let mut rng = plan_rng(user_id, date);
    let count = rng.gen_range(rules.min_daily_tasks..=rules.max_daily_tasks) as usize;
    let selected = ordered.choose_multiple(&mut rng, count.min(ordered.len()));

    selected
        .map(|template| TaskAssignment {
            assignment_id: assignment_fingerprint(user_id, date, &template.template_id),
            user_id,
            template_id: template.template_id.clone(),
            title: template.title.clone(),
            skill: template.skill,
            date_assigned: date,
            status: TaskStatus::Assigned,
        })
        .collect()
}
