//! Achievement catalog and progress evaluation.
//!
//! Achievements are defined by a static catalog; the only per-user state
//! is the unlock record stored on the profile. Requirements are an
//! exhaustive tagged enum, so an unknown kind cannot exist past
//! deserialization, and progress evaluation is total over the variants.
//!
//! Unlocked entries are frozen: the evaluator skips anything already in
//! `profile.achievements` and returns the stored record's pinned 100.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::{Activity, ActivityCategory};
use crate::error::{CoreError, Result};
use crate::profile::UserProfile;
use crate::session::{SessionType, TimeSession};
use crate::streak::StreakState;

/// What it takes to unlock an achievement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    /// Log any activity at all.
    FirstActivity,
    /// Reach a current streak of `target` days.
    StreakDays { target: u32 },
    /// Complete `target` finished sessions of the given type.
    SessionsOfType {
        session_type: SessionType,
        target: u32,
    },
    /// Log `target` activities of the given category.
    CategoryCount {
        category: ActivityCategory,
        target: u32,
    },
    /// Log `target` activities whose hour falls in `from_hour..to_hour`.
    TimeOfDayCount {
        from_hour: u32,
        to_hour: u32,
        target: u32,
    },
    /// Finish a single session of at least `target` minutes. Binary:
    /// progress is 0 or 100, no partial credit.
    SingleSessionMinutes { target: u32 },
}

/// One catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub requirement: Requirement,
    pub xp_reward: u64,
}

/// Evaluated progress for one catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementProgress {
    pub id: String,
    pub name: String,
    /// 0..=100.
    pub progress: u8,
    pub unlocked: bool,
    #[serde(default)]
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// The built-in achievement catalog.
pub fn catalog() -> Vec<AchievementDef> {
    vec![
        AchievementDef {
            id: "first_activity",
            name: "First Steps",
            description: "Log your first activity",
            requirement: Requirement::FirstActivity,
            xp_reward: 10,
        },
        AchievementDef {
            id: "streak_3",
            name: "Warming Up",
            description: "Keep a 3-day streak",
            requirement: Requirement::StreakDays { target: 3 },
            xp_reward: 25,
        },
        AchievementDef {
            id: "streak_7",
            name: "One Full Week",
            description: "Keep a 7-day streak",
            requirement: Requirement::StreakDays { target: 7 },
            xp_reward: 75,
        },
        AchievementDef {
            id: "streak_30",
            name: "Iron Habit",
            description: "Keep a 30-day streak",
            requirement: Requirement::StreakDays { target: 30 },
            xp_reward: 300,
        },
        AchievementDef {
            id: "pomodoro_10",
            name: "Tomato Farmer",
            description: "Finish 10 pomodoro sessions",
            requirement: Requirement::SessionsOfType {
                session_type: SessionType::Pomodoro,
                target: 10,
            },
            xp_reward: 50,
        },
        AchievementDef {
            id: "deep_work_5",
            name: "Going Deep",
            description: "Finish 5 deep-work sessions",
            requirement: Requirement::SessionsOfType {
                session_type: SessionType::DeepWork,
                target: 5,
            },
            xp_reward: 60,
        },
        AchievementDef {
            id: "bug_squasher",
            name: "Bug Squasher",
            description: "Log 20 bug-fix activities",
            requirement: Requirement::CategoryCount {
                category: ActivityCategory::BugFix,
                target: 20,
            },
            xp_reward: 80,
        },
        AchievementDef {
            id: "reviewer_15",
            name: "Second Pair of Eyes",
            description: "Log 15 code-review activities",
            requirement: Requirement::CategoryCount {
                category: ActivityCategory::CodeReview,
                target: 15,
            },
            xp_reward: 60,
        },
        AchievementDef {
            id: "early_bird",
            name: "Early Bird",
            description: "Log 10 activities before 9am",
            requirement: Requirement::TimeOfDayCount {
                from_hour: 5,
                to_hour: 9,
                target: 10,
            },
            xp_reward: 40,
        },
        AchievementDef {
            id: "night_owl",
            name: "Night Owl",
            description: "Log 10 activities after 10pm",
            requirement: Requirement::TimeOfDayCount {
                from_hour: 22,
                to_hour: 24,
                target: 10,
            },
            xp_reward: 40,
        },
        AchievementDef {
            id: "marathon",
            name: "Marathon",
            description: "Finish a single session of 2 hours or more",
            requirement: Requirement::SingleSessionMinutes { target: 120 },
            xp_reward: 100,
        },
    ]
}

/// Validate a catalog before use.
///
/// # Errors
/// [`CoreError::AchievementCatalogMismatch`] on duplicate ids or
/// zero-target requirements (both would make progress meaningless).
pub fn validate_catalog(defs: &[AchievementDef]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for def in defs {
        if !seen.insert(def.id) {
            return Err(CoreError::AchievementCatalogMismatch {
                id: def.id.to_string(),
                message: "duplicate achievement id".to_string(),
            });
        }
        let target = match def.requirement {
            Requirement::FirstActivity => 1,
            Requirement::StreakDays { target }
            | Requirement::SessionsOfType { target, .. }
            | Requirement::CategoryCount { target, .. }
            | Requirement::TimeOfDayCount { target, .. }
            | Requirement::SingleSessionMinutes { target } => target,
        };
        if target == 0 {
            return Err(CoreError::AchievementCatalogMismatch {
                id: def.id.to_string(),
                message: "requirement target must be > 0".to_string(),
            });
        }
    }
    Ok(())
}

/// Evaluate progress for one catalog entry against the history.
///
/// Entries already unlocked on the profile are never recomputed; the
/// frozen record is returned as-is.
pub fn evaluate(
    def: &AchievementDef,
    activities: &[Activity],
    sessions: &[TimeSession],
    streak: &StreakState,
    profile: &UserProfile,
) -> AchievementProgress {
    if let Some(unlocked) = profile.achievement(def.id) {
        return AchievementProgress {
            id: unlocked.id.clone(),
            name: unlocked.name.clone(),
            progress: 100,
            unlocked: true,
            unlocked_at: Some(unlocked.unlocked_at),
        };
    }

    let progress = match def.requirement {
        Requirement::FirstActivity => {
            if activities.is_empty() {
                0
            } else {
                100
            }
        }
        Requirement::StreakDays { target } => ratio(streak.current_streak, target),
        Requirement::SessionsOfType {
            session_type,
            target,
        } => {
            let count = sessions
                .iter()
                .filter(|s| s.session_type == session_type && s.end_time.is_some())
                .count() as u32;
            ratio(count, target)
        }
        Requirement::CategoryCount { category, target } => {
            let count = activities.iter().filter(|a| a.category == category).count() as u32;
            ratio(count, target)
        }
        Requirement::TimeOfDayCount {
            from_hour,
            to_hour,
            target,
        } => {
            let count = activities
                .iter()
                .filter_map(|a| a.hour())
                .filter(|h| (from_hour..to_hour).contains(h))
                .count() as u32;
            ratio(count, target)
        }
        // Binary: either a qualifying session exists or it does not.
        Requirement::SingleSessionMinutes { target } => {
            let qualifies = sessions
                .iter()
                .any(|s| s.end_time.is_some() && s.duration_minutes.unwrap_or(0) >= target);
            if qualifies {
                100
            } else {
                0
            }
        }
    };

    AchievementProgress {
        id: def.id.to_string(),
        name: def.name.to_string(),
        progress,
        unlocked: progress >= 100,
        unlocked_at: None,
    }
}

/// `min(100, 100 * count / target)` as a u8.
fn ratio(count: u32, target: u32) -> u8 {
    if target == 0 {
        return 0;
    }
    ((count as u64 * 100) / target as u64).min(100) as u8
}
