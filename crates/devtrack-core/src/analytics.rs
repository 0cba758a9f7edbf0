//! Analytics rollups over the activity and session history.
//!
//! Everything here is a pure function of the input lists: hourly and
//! weekday buckets, weekly totals, category breakdown and a coarse trend
//! classification. Tie-breaks are deterministic -- buckets are scanned in
//! fixed order (hours 0..24, Monday..Sunday) and the first maximum wins.

use std::collections::BTreeMap;

use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::activity::{Activity, ActivityCategory};
use crate::session::TimeSession;

/// Fallback "most productive hour" when there is no data at all.
const DEFAULT_PRODUCTIVE_HOUR: u32 = 9;

/// Minimum absolute shift in the compared metric before a trend is
/// called improving or declining.
const TREND_THRESHOLD: f64 = 0.5;

/// How many of the most recent data points form the "recent" window.
const TREND_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

/// Activity counts and average focus for one hour of the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyStat {
    pub hour: u32,
    pub count: u32,
    /// 0.0 when no activity in this hour carries a focus score.
    pub avg_focus: f64,
}

/// Activity counts per weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayStat {
    pub weekday: String,
    pub count: u32,
    pub total_minutes: u64,
}

/// Totals for one ISO week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyStat {
    pub year: i32,
    pub week: u32,
    pub count: u32,
    pub total_minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStat {
    pub category: ActivityCategory,
    pub count: u32,
}

/// Rollup of finished sessions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_sessions: u32,
    pub total_minutes: u64,
    pub avg_focus: f64,
    pub total_interruptions: u32,
}

/// Full analytics snapshot, assembled on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub total_activities: u32,
    pub total_minutes: u64,
    pub hourly: Vec<HourlyStat>,
    pub by_weekday: Vec<WeekdayStat>,
    pub weekly: Vec<WeeklyStat>,
    pub by_category: Vec<CategoryStat>,
    pub most_productive_hour: u32,
    pub most_productive_day: String,
    pub focus_trend: Trend,
    pub sessions: SessionSummary,
}

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Build the full report. Empty input yields neutral defaults
/// (`most_productive_hour` 9, trend `Stable`).
pub fn analyze(activities: &[Activity], sessions: &[TimeSession]) -> AnalyticsReport {
    AnalyticsReport {
        total_activities: activities.len() as u32,
        total_minutes: activities
            .iter()
            .filter_map(|a| a.duration_minutes)
            .map(u64::from)
            .sum(),
        hourly: hourly_stats(activities),
        by_weekday: weekday_stats(activities),
        weekly: weekly_stats(activities),
        by_category: category_breakdown(activities),
        most_productive_hour: most_productive_hour(activities),
        most_productive_day: most_productive_day(activities),
        focus_trend: classify_trend(&focus_points(activities)),
        sessions: session_summary(sessions),
    }
}

/// Per-hour counts and average focus, hours 0..24 in order.
pub fn hourly_stats(activities: &[Activity]) -> Vec<HourlyStat> {
    let mut counts = [0u32; 24];
    let mut focus_sum = [0u64; 24];
    let mut focus_n = [0u32; 24];
    for activity in activities {
        let Some(hour) = activity.hour() else { continue };
        counts[hour as usize] += 1;
        if let Some(score) = activity.focus_score {
            focus_sum[hour as usize] += score as u64;
            focus_n[hour as usize] += 1;
        }
    }
    (0..24)
        .map(|h| HourlyStat {
            hour: h as u32,
            count: counts[h],
            avg_focus: if focus_n[h] > 0 {
                focus_sum[h] as f64 / focus_n[h] as f64
            } else {
                0.0
            },
        })
        .collect()
}

fn weekday_stats(activities: &[Activity]) -> Vec<WeekdayStat> {
    WEEKDAYS
        .iter()
        .map(|&wd| {
            let matching = activities.iter().filter(|a| a.date.weekday() == wd);
            let (mut count, mut minutes) = (0u32, 0u64);
            for a in matching {
                count += 1;
                minutes += a.duration_minutes.unwrap_or(0) as u64;
            }
            WeekdayStat {
                weekday: weekday_name(wd).to_string(),
                count,
                total_minutes: minutes,
            }
        })
        .collect()
}

fn weekly_stats(activities: &[Activity]) -> Vec<WeeklyStat> {
    let mut weeks: BTreeMap<(i32, u32), (u32, u64)> = BTreeMap::new();
    for a in activities {
        let iso = a.date.iso_week();
        let entry = weeks.entry((iso.year(), iso.week())).or_default();
        entry.0 += 1;
        entry.1 += a.duration_minutes.unwrap_or(0) as u64;
    }
    weeks
        .into_iter()
        .map(|((year, week), (count, total_minutes))| WeeklyStat {
            year,
            week,
            count,
            total_minutes,
        })
        .collect()
}

/// Counts per category, in the fixed category order, zero-count
/// categories omitted.
pub fn category_breakdown(activities: &[Activity]) -> Vec<CategoryStat> {
    ActivityCategory::ALL
        .iter()
        .map(|&category| CategoryStat {
            category,
            count: activities.iter().filter(|a| a.category == category).count() as u32,
        })
        .filter(|s| s.count > 0)
        .collect()
}

/// Hour with the most activities. Scans 0..24 and keeps the first
/// maximum; falls back to 9 when there is no data.
pub fn most_productive_hour(activities: &[Activity]) -> u32 {
    let stats = hourly_stats(activities);
    let mut best: Option<&HourlyStat> = None;
    for stat in &stats {
        if stat.count > 0 && best.map_or(true, |b| stat.count > b.count) {
            best = Some(stat);
        }
    }
    best.map_or(DEFAULT_PRODUCTIVE_HOUR, |s| s.hour)
}

/// Weekday with the most activities, Monday..Sunday scan, first maximum
/// wins. Falls back to Monday when there is no data.
pub fn most_productive_day(activities: &[Activity]) -> String {
    let mut best = Weekday::Mon;
    let mut best_count = 0u32;
    for &wd in &WEEKDAYS {
        let count = activities.iter().filter(|a| a.date.weekday() == wd).count() as u32;
        if count > best_count {
            best = wd;
            best_count = count;
        }
    }
    weekday_name(best).to_string()
}

/// Focus scores in chronological order (log order), skipping activities
/// without a score.
fn focus_points(activities: &[Activity]) -> Vec<f64> {
    activities
        .iter()
        .filter_map(|a| a.focus_score)
        .map(f64::from)
        .collect()
}

/// Compare the mean of the most recent [`TREND_WINDOW`] points against
/// the mean of everything before them. A shift of at least
/// [`TREND_THRESHOLD`] decides the direction; anything else is stable.
pub fn classify_trend(points: &[f64]) -> Trend {
    if points.len() <= TREND_WINDOW {
        return Trend::Stable;
    }
    let split = points.len() - TREND_WINDOW;
    let (prior, recent) = points.split_at(split);
    let prior_mean = mean(prior);
    let recent_mean = mean(recent);
    let delta = recent_mean - prior_mean;
    if delta >= TREND_THRESHOLD {
        Trend::Improving
    } else if delta <= -TREND_THRESHOLD {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

fn session_summary(sessions: &[TimeSession]) -> SessionSummary {
    let finished: Vec<&TimeSession> = sessions.iter().filter(|s| s.end_time.is_some()).collect();
    let total = finished.len() as u32;
    let minutes: u64 = finished
        .iter()
        .map(|s| s.duration_minutes.unwrap_or(0) as u64)
        .sum();
    let avg_focus = if total > 0 {
        finished.iter().map(|s| s.focus_score as f64).sum::<f64>() / total as f64
    } else {
        0.0
    };
    SessionSummary {
        total_sessions: total,
        total_minutes: minutes,
        avg_focus,
        total_interruptions: finished.iter().map(|s| s.interruption_count).sum(),
    }
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

fn weekday_name(wd: Weekday) -> &'static str {
    match wd {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityDraft;
    use chrono::TimeZone;

    fn activity(day: u32, hour: u32, focus: Option<u8>, minutes: Option<u32>) -> Activity {
        let at = chrono::Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap();
        let mut draft = ActivityDraft::new(ActivityCategory::Coding, "work");
        draft.focus_score = focus;
        draft.duration_minutes = minutes;
        Activity::from_draft(draft, at).unwrap()
    }

    #[test]
    fn empty_input_yields_neutral_defaults() {
        let report = analyze(&[], &[]);
        assert_eq!(report.total_activities, 0);
        assert_eq!(report.most_productive_hour, 9);
        assert_eq!(report.most_productive_day, "Monday");
        assert_eq!(report.focus_trend, Trend::Stable);
        assert_eq!(report.sessions, SessionSummary::default());
        assert_eq!(report.hourly.len(), 24);
    }

    #[test]
    fn hourly_buckets_count_and_average() {
        let activities = vec![
            activity(5, 14, Some(8), None),
            activity(5, 14, Some(6), None),
            activity(5, 9, None, None),
        ];
        let stats = hourly_stats(&activities);
        assert_eq!(stats[14].count, 2);
        assert!((stats[14].avg_focus - 7.0).abs() < f64::EPSILON);
        assert_eq!(stats[9].count, 1);
        assert_eq!(stats[9].avg_focus, 0.0);
    }

    #[test]
    fn most_productive_hour_first_max_wins() {
        // Hours 9 and 14 tie; 9 is scanned first.
        let activities = vec![
            activity(5, 14, None, None),
            activity(5, 9, None, None),
            activity(5, 14, None, None),
            activity(5, 9, None, None),
        ];
        assert_eq!(most_productive_hour(&activities), 9);
    }

    #[test]
    fn most_productive_day_first_max_wins() {
        // 2024-01-01 is a Monday, 2024-01-02 a Tuesday; tie -> Monday.
        let activities = vec![
            activity(2, 10, None, None),
            activity(1, 10, None, None),
        ];
        assert_eq!(most_productive_day(&activities), "Monday");
    }

    #[test]
    fn trend_needs_more_than_window_points() {
        let points = vec![5.0; 10];
        assert_eq!(classify_trend(&points), Trend::Stable);
    }

    #[test]
    fn trend_improving_and_declining() {
        // 5 prior points at 5.0, 10 recent at 6.0 -> +1.0 shift.
        let mut points = vec![5.0; 5];
        points.extend(vec![6.0; 10]);
        assert_eq!(classify_trend(&points), Trend::Improving);

        let mut points = vec![8.0; 5];
        points.extend(vec![6.5; 10]);
        assert_eq!(classify_trend(&points), Trend::Declining);
    }

    #[test]
    fn trend_within_threshold_is_stable() {
        let mut points = vec![6.0; 5];
        points.extend(vec![6.4; 10]);
        assert_eq!(classify_trend(&points), Trend::Stable);
    }

    #[test]
    fn weekly_totals_group_by_iso_week() {
        // 2024-01-01 (week 1) and 2024-01-08 (week 2).
        let activities = vec![
            activity(1, 10, None, Some(30)),
            activity(1, 11, None, Some(30)),
            activity(8, 10, None, Some(45)),
        ];
        let weeks = weekly_stats(&activities);
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].count, 2);
        assert_eq!(weeks[0].total_minutes, 60);
        assert_eq!(weeks[1].total_minutes, 45);
    }

    #[test]
    fn category_breakdown_omits_empty_categories() {
        let activities = vec![activity(5, 10, None, None)];
        let breakdown = category_breakdown(&activities);
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].category, ActivityCategory::Coding);
        assert_eq!(breakdown[0].count, 1);
    }
}
