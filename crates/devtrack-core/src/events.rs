use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::{BreakKind, SessionType};

/// Every state change in the system produces an Event.
/// The caller (CLI, editor host) decides what to surface; the core only
/// emits them through its [`NotificationSink`](crate::engine::NotificationSink).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ActivityLogged {
        activity_id: String,
        xp_awarded: u64,
        at: DateTime<Utc>,
    },
    LevelUp {
        new_level: u32,
        total_xp: u64,
        at: DateTime<Utc>,
    },
    AchievementUnlocked {
        achievement_id: String,
        name: String,
        xp_reward: u64,
        at: DateTime<Utc>,
    },
    /// Current streak crossed a milestone (7, 30, 100 days).
    StreakMilestone {
        days: u32,
        at: DateTime<Utc>,
    },
    SessionStarted {
        session_id: String,
        session_type: SessionType,
        planned_minutes: u32,
        at: DateTime<Utc>,
    },
    BreakStarted {
        session_id: String,
        kind: BreakKind,
        at: DateTime<Utc>,
    },
    BreakEnded {
        session_id: String,
        break_minutes: u32,
        at: DateTime<Utc>,
    },
    /// The live countdown reached zero. The session stays active until
    /// the caller ends it.
    PlannedDurationReached {
        session_id: String,
        session_type: SessionType,
        at: DateTime<Utc>,
    },
    SessionEnded {
        session_id: String,
        session_type: SessionType,
        duration_minutes: u32,
        focus_score: u8,
        at: DateTime<Utc>,
    },
    /// Idle threshold elapsed with no activity signal; focus score was
    /// penalized.
    FocusPenalty {
        session_id: String,
        focus_score: u8,
        interruption_count: u32,
        at: DateTime<Utc>,
    },
}
