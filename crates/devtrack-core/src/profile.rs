//! Per-user profile: level, XP, cached streaks, unlocked achievements.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An achievement the user has unlocked. Frozen once recorded: the
/// evaluator never recomputes progress for entries present here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockedAchievement {
    pub id: String,
    pub name: String,
    pub xp_reward: u64,
    pub unlocked_at: DateTime<Utc>,
}

/// Singleton per-user profile.
///
/// Created lazily with level 1 and zero XP. `xp` is monotonically
/// non-decreasing; `current_streak`/`longest_streak` are cached mirrors
/// of the derived [`StreakState`](crate::streak::StreakState).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub level: u32,
    pub xp: u64,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub achievements: Vec<UnlockedAchievement>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            level: 1,
            xp: 0,
            current_streak: 0,
            longest_streak: 0,
            achievements: Vec::new(),
        }
    }
}

impl UserProfile {
    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.iter().any(|a| a.id == id)
    }

    pub fn achievement(&self, id: &str) -> Option<&UnlockedAchievement> {
        self.achievements.iter().find(|a| a.id == id)
    }
}
