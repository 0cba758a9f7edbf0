//! Property tests for streak computation and XP leveling.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;

use devtrack_core::{
    award_xp, compute_streak, level_from_xp, Activity, ActivityCategory, ActivityDraft,
    UserProfile, LEVEL_THRESHOLDS,
};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn activity_on(date: NaiveDate) -> Activity {
    let at = Utc.from_utc_datetime(&date.and_hms_opt(10, 0, 0).unwrap());
    Activity::from_draft(ActivityDraft::new(ActivityCategory::Coding, "work"), at).unwrap()
}

proptest! {
    #[test]
    fn longest_streak_never_below_current(
        offsets in prop::collection::vec(0i64..365, 0..40),
        probe in 0i64..400,
    ) {
        let activities: Vec<Activity> = offsets
            .iter()
            .map(|&o| activity_on(base_date() + Duration::days(o)))
            .collect();
        let state = compute_streak(&activities, base_date() + Duration::days(probe));
        prop_assert!(state.longest_streak >= state.current_streak);
        prop_assert!(state.total_active_days as usize <= offsets.len());
    }

    #[test]
    fn unbroken_run_ending_today_counts_fully(start in 0i64..300, len in 1i64..30) {
        let today = base_date() + Duration::days(start + len - 1);
        let activities: Vec<Activity> = (0..len)
            .map(|o| activity_on(base_date() + Duration::days(start + o)))
            .collect();
        let state = compute_streak(&activities, today);
        prop_assert_eq!(state.current_streak as i64, len);
        prop_assert_eq!(state.longest_streak as i64, len);
    }

    #[test]
    fn duplicate_days_do_not_inflate_streak(start in 0i64..300, repeats in 1usize..5) {
        let date = base_date() + Duration::days(start);
        let activities: Vec<Activity> = (0..repeats).map(|_| activity_on(date)).collect();
        let state = compute_streak(&activities, date);
        prop_assert_eq!(state.current_streak, 1);
        prop_assert_eq!(state.total_active_days, 1);
    }

    #[test]
    fn level_is_monotone_in_xp(a in 0u64..10_000, b in 0u64..10_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(level_from_xp(lo) <= level_from_xp(hi));
    }

    #[test]
    fn level_matches_threshold_table(xp in 0u64..10_000) {
        let level = level_from_xp(xp) as usize;
        prop_assert!(xp >= LEVEL_THRESHOLDS[level - 1]);
        if level < LEVEL_THRESHOLDS.len() {
            prop_assert!(xp < LEVEL_THRESHOLDS[level]);
        }
    }

    #[test]
    fn split_awards_equal_one_lump_award(a in 0i64..5_000, b in 0i64..5_000) {
        let mut split = UserProfile::default();
        award_xp(&mut split, a).unwrap();
        award_xp(&mut split, b).unwrap();

        let mut lump = UserProfile::default();
        award_xp(&mut lump, a + b).unwrap();

        prop_assert_eq!(split.xp, lump.xp);
        prop_assert_eq!(split.level, lump.level);
    }
}

#[test]
fn zero_xp_is_level_one() {
    assert_eq!(level_from_xp(0), 1);
}
