//! Default task catalog and level rules.
//!
//! # Responsibility
//! - Provide the seedable template set, one per skill.
//! - Provide the level-1 rules used when no user-specific rules exist.
//!
//! # Invariants
//! - Template ids are unique across the default catalog.
//! - Each template's skill stays within [`Skill::ALL`].

use crate::model::task::{LevelRules, Skill, TaskTemplate};

/// The built-in template set loaded by `seed_templates`.
pub fn default_templates() -> Vec<TaskTemplate> {
    vec![
        TaskTemplate::new("body-01", Skill::Body, "Physical activity", 15, 30),
        TaskTemplate::new("capital-01", Skill::Capital, "Track expenses", 10, 20),
        TaskTemplate::new("productivity-01", Skill::Productivity, "Plan the day", 10, 20),
        TaskTemplate::new("game-01", Skill::GameThinking, "Analyze a decision", 10, 15),
        TaskTemplate::new("psyche-01", Skill::Psyche, "Log your state of mind", 5, 10),
        TaskTemplate::new("language-01", Skill::Language, "Language practice", 15, 25),
    ]
}

/// Level-1 rules: all skills active, two to three tasks per day.
pub fn default_rules() -> LevelRules {
    LevelRules {
        level: 1,
        active_skills: Skill::ALL.to_vec(),
        max_daily_tasks: 3,
        min_daily_tasks: 2,
    }
}
