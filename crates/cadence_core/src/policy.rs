//! Rule-based workload and level decisions.
//!
//! # Responsibility
//! - Turn a week summary into exactly one workload-adjustment note.
//! - Turn month-level figures into a hold/promote decision.
//!
//! # Invariants
//! - Weekly checks run in fixed precedence: stagnation, overload,
//!   stable completion, no change.
//! - Critical failures veto promotion unconditionally.

use crate::model::task::{WeekSummary, WeeklyAdjustment};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};

/// Promotion threshold on the monthly completion rate.
const PROMOTION_RATE: f64 = 0.8;
/// Weeks that must be closed before a promotion is considered.
const PROMOTION_WEEKS: u32 = 4;

/// Outcome of the monthly level review.
///
/// Round-trips through its transport tag: `hold` or `promote:<level>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelDecision {
    Hold,
    Promote(u32),
}

impl Display for LevelDecision {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hold => write!(f, "hold"),
            Self::Promote(level) => write!(f, "promote:{level}"),
        }
    }
}

impl LevelDecision {
    /// Parses the transport tag. `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        if value == "hold" {
            return Some(Self::Hold);
        }
        let level = value.strip_prefix("promote:")?.parse().ok()?;
        Some(Self::Promote(level))
    }
}

impl Serialize for LevelDecision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LevelDecision {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TagVisitor;

        impl Visitor<'_> for TagVisitor {
            type Value = LevelDecision;

            fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str("`hold` or `promote:<level>`")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                LevelDecision::parse(value)
                    .ok_or_else(|| E::custom(format!("unknown level decision `{value}`")))
            }
        }

        deserializer.deserialize_str(TagVisitor)
    }
}

/// Derives the week's single workload-adjustment note.
pub fn weekly_adjustment(summary: &WeekSummary) -> WeeklyAdjustment {
    let note = if summary.stagnation_flag {
        "reduce load: stagnation"
    } else if summary.overload_flag {
        "reduce load: overload"
    } else if summary.completion_rate > 0.8 {
        "increase load: stable completion"
    } else {
        "no change"
    };

    WeeklyAdjustment {
        week_start: summary.week_start,
        adjustment_note: note.to_string(),
    }
}

/// Monthly hold/promote decision.
///
/// Any critical failure holds regardless of the other figures; a
/// promotion needs a completion rate of at least 0.8 across at least
/// four closed weeks. Every other combination holds.
pub fn level_decision(
    completion: f64,
    closed_weeks: u32,
    critical_failures: usize,
    level: u32,
) -> LevelDecision {
    if critical_failures > 0 {
        return LevelDecision::Hold;
    }
    if completion >= PROMOTION_RATE && closed_weeks >= PROMOTION_WEEKS {
        return LevelDecision::Promote(level + 1);
    }
    LevelDecision::Hold
}

#[cfg(test)]
mod tests {
    use super::{level_decision, weekly_adjustment, LevelDecision};
    use crate::model::task::WeekSummary;
    use chrono::NaiveDate;

    fn week(completion_rate: f64, overload: bool, stagnation: bool) -> WeekSummary {
        let week_start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        WeekSummary {
            week_start,
            week_end: week_start + chrono::Days::new(6),
            completion_rate,
            overload_flag: overload,
            stagnation_flag: stagnation,
            critical_failures: 0,
        }
    }

    #[test]
    fn stagnation_takes_precedence_over_overload() {
        let adjustment = weekly_adjustment(&week(0.0, true, true));
        assert_eq!(adjustment.adjustment_note, "reduce load: stagnation");
    }

    #[test]
    fn overload_beats_stable_completion() {
        let adjustment = weekly_adjustment(&week(0.95, true, false));
        assert_eq!(adjustment.adjustment_note, "reduce load: overload");
    }

    #[test]
    fn high_completion_increases_load() {
        let adjustment = weekly_adjustment(&week(0.85, false, false));
        assert_eq!(adjustment.adjustment_note, "increase load: stable completion");
    }

    #[test]
    fn exact_point_eight_is_not_an_increase() {
        let adjustment = weekly_adjustment(&week(0.8, false, false));
        assert_eq!(adjustment.adjustment_note, "no change");
    }

    #[test]
    fn promotion_requires_rate_and_closed_weeks() {
        assert_eq!(level_decision(0.85, 4, 0, 1), LevelDecision::Promote(2));
        assert_eq!(level_decision(0.8, 4, 0, 3), LevelDecision::Promote(4));
        assert_eq!(level_decision(0.85, 3, 0, 1), LevelDecision::Hold);
        assert_eq!(level_decision(0.79, 4, 0, 1), LevelDecision::Hold);
    }

    #[test]
    fn critical_failures_veto_promotion() {
        assert_eq!(level_decision(1.0, 4, 16, 1), LevelDecision::Hold);
        assert_eq!(level_decision(0.99, 9, 1, 5), LevelDecision::Hold);
    }

    #[test]
    fn low_completion_holds() {
        assert_eq!(level_decision(0.2, 4, 0, 1), LevelDecision::Hold);
    }

    #[test]
    fn decision_serializes_as_transport_tag() {
        let json = serde_json::to_string(&LevelDecision::Promote(2)).unwrap();
        assert_eq!(json, "\"promote:2\"");
        let back: LevelDecision = serde_json::from_str(&json).unwrap();
        assert_eq!(back, LevelDecision::Promote(2));

        let err = serde_json::from_str::<LevelDecision>("\"demote:1\"").unwrap_err();
        assert!(err.to_string().contains("unknown level decision"));
    }

    #[test]
    fn decision_tag_roundtrip() {
        for decision in [LevelDecision::Hold, LevelDecision::Promote(2)] {
            assert_eq!(LevelDecision::parse(&decision.to_string()), Some(decision));
        }
        assert_eq!(LevelDecision::parse("promote:x"), None);
        assert_eq!(LevelDecision::parse("demote:1"), None);
    }
}
