//! XP and leveling engine.
//!
//! Converts a logged activity (plus the current streak) into an XP award
//! and maps cumulative XP to a discrete level via a fixed ascending
//! threshold table.

use serde::{Deserialize, Serialize};

use crate::activity::Activity;
use crate::error::{CoreError, Result};
use crate::profile::UserProfile;

/// Cumulative XP required to reach each level. Index `i` is the floor of
/// level `i + 1`; the table is fixed and strictly ascending.
pub const LEVEL_THRESHOLDS: [u64; 12] = [
    0, 100, 250, 450, 700, 1_000, 1_400, 1_900, 2_500, 3_200, 4_000, 5_000,
];

/// Rates used by [`compute_activity_xp`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XpRates {
    /// Flat award per activity.
    pub base: u64,
    /// Award per logged minute of duration.
    pub per_minute: f64,
    /// Award per day of current streak.
    pub per_streak_day: u64,
    /// Flat bonus when focus score reaches the threshold.
    pub focus_bonus: u64,
    /// Minimum focus score that earns the bonus.
    pub focus_bonus_threshold: u8,
}

impl Default for XpRates {
    fn default() -> Self {
        Self {
            base: 5,
            per_minute: 0.5,
            per_streak_day: 2,
            focus_bonus: 5,
            focus_bonus_threshold: 8,
        }
    }
}

/// Result of applying an XP award to a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpAward {
    pub xp_awarded: u64,
    pub level_up: bool,
    pub new_level: u32,
}

/// Compute the XP award for one activity.
///
/// base + duration * per_minute + streak * per_streak_day + focus bonus
/// (when score >= threshold) + fixed category bonus. Rounded to the
/// nearest integer, never negative.
pub fn compute_activity_xp(activity: &Activity, current_streak: u32, rates: &XpRates) -> u64 {
    let mut xp = rates.base as f64;
    if let Some(minutes) = activity.duration_minutes {
        xp += minutes as f64 * rates.per_minute;
    }
    xp += current_streak as f64 * rates.per_streak_day as f64;
    if activity
        .focus_score
        .is_some_and(|s| s >= rates.focus_bonus_threshold)
    {
        xp += rates.focus_bonus as f64;
    }
    xp += activity.category.xp_bonus() as f64;
    xp.round().max(0.0) as u64
}

/// Level for a cumulative XP value: 1-indexed position of the highest
/// threshold not exceeding `xp`.
pub fn level_from_xp(xp: u64) -> u32 {
    let mut level = 1;
    for (i, &threshold) in LEVEL_THRESHOLDS.iter().enumerate() {
        if xp >= threshold {
            level = (i + 1) as u32;
        }
    }
    level
}

/// XP remaining until the next level, or `None` at the table's top.
pub fn xp_to_next_level(xp: u64) -> Option<u64> {
    let level = level_from_xp(xp) as usize;
    LEVEL_THRESHOLDS.get(level).map(|&t| t - xp)
}

/// Add `amount` XP to the profile and recompute its level.
///
/// # Errors
/// Returns [`CoreError::InvalidXpAmount`] if `amount` is negative.
pub fn award_xp(profile: &mut UserProfile, amount: i64) -> Result<XpAward> {
    if amount < 0 {
        return Err(CoreError::InvalidXpAmount { amount });
    }
    let old_level = profile.level;
    profile.xp += amount as u64;
    profile.level = level_from_xp(profile.xp);
    Ok(XpAward {
        xp_awarded: amount as u64,
        level_up: profile.level > old_level,
        new_level: profile.level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{ActivityCategory, ActivityDraft};
    use chrono::TimeZone;

    fn activity(category: ActivityCategory, duration: Option<u32>, focus: Option<u8>) -> Activity {
        let at = chrono::Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap();
        let mut draft = ActivityDraft::new(category, "work");
        draft.duration_minutes = duration;
        draft.focus_score = focus;
        Activity::from_draft(draft, at).unwrap()
    }

    #[test]
    fn xp_formula_worked_example() {
        // base 5 + 30 * 0.5 + 3 * 2 + focus bonus 5 + code review bonus 3 = 34
        let a = activity(ActivityCategory::CodeReview, Some(30), Some(9));
        assert_eq!(compute_activity_xp(&a, 3, &XpRates::default()), 34);
    }

    #[test]
    fn focus_below_threshold_earns_no_bonus() {
        let a = activity(ActivityCategory::Coding, None, Some(7));
        let b = activity(ActivityCategory::Coding, None, Some(8));
        let rates = XpRates::default();
        assert_eq!(compute_activity_xp(&a, 0, &rates) + 5, compute_activity_xp(&b, 0, &rates));
    }

    #[test]
    fn level_from_xp_table_edges() {
        assert_eq!(level_from_xp(0), 1);
        assert_eq!(level_from_xp(99), 1);
        assert_eq!(level_from_xp(100), 2);
        assert_eq!(level_from_xp(250), 3);
        assert_eq!(level_from_xp(1_000_000), LEVEL_THRESHOLDS.len() as u32);
    }

    #[test]
    fn thresholds_strictly_ascending() {
        for pair in LEVEL_THRESHOLDS.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn award_xp_rejects_negative() {
        let mut p = UserProfile::default();
        assert!(matches!(
            award_xp(&mut p, -1),
            Err(CoreError::InvalidXpAmount { amount: -1 })
        ));
        assert_eq!(p.xp, 0);
    }

    #[test]
    fn award_xp_reports_level_up() {
        let mut p = UserProfile::default();
        let award = award_xp(&mut p, 50).unwrap();
        assert!(!award.level_up);
        assert_eq!(award.new_level, 1);

        let award = award_xp(&mut p, 60).unwrap();
        assert!(award.level_up);
        assert_eq!(award.new_level, 2);
        assert_eq!(p.xp, 110);
    }

    #[test]
    fn split_awards_equal_single_award() {
        let mut a = UserProfile::default();
        let mut b = UserProfile::default();
        award_xp(&mut a, 120).unwrap();
        award_xp(&mut a, 180).unwrap();
        award_xp(&mut b, 300).unwrap();
        assert_eq!(a.xp, b.xp);
        assert_eq!(a.level, b.level);
    }

    #[test]
    fn xp_to_next_level_counts_down() {
        assert_eq!(xp_to_next_level(0), Some(100));
        assert_eq!(xp_to_next_level(90), Some(10));
        assert_eq!(xp_to_next_level(u64::MAX / 2), None);
    }
}
