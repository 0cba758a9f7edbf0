//! The orchestrating facade over the bookkeeping subsystems.
//!
//! [`ProductivityEngine`] owns the activity log, the session engine and
//! the user profile, and sequences the `log_activity` pipeline: streak
//! recompute, XP award, achievement re-evaluation. All mutations go
//! through `&mut self`, so a reader can never observe an achievement
//! marked unlocked without its XP applied (single-writer model).
//!
//! Collaborators are injected: a [`Clock`] for time and a
//! [`NotificationSink`] for fire-and-forget event delivery. There are no
//! hidden globals; tests construct parallel engines with fixed clocks.

use std::sync::Arc;

use serde::Serialize;

use crate::achievements::{self, AchievementDef, AchievementProgress};
use crate::activity::{Activity, ActivityDraft};
use crate::analytics::{self, AnalyticsReport};
use crate::calendar::{Clock, SystemClock};
use crate::error::Result;
use crate::events::Event;
use crate::profile::{UnlockedAchievement, UserProfile};
use crate::session::{
    BreakKind, SessionEngine, SessionEngineConfig, SessionType, TimeSession,
};
use crate::streak::{self, StreakState};
use crate::xp::{self, XpRates};

/// Streak lengths that produce a [`Event::StreakMilestone`].
const STREAK_MILESTONES: [u32; 3] = [7, 30, 100];

/// Receiver for engine events. Implementations must not block; the
/// engine fires and forgets.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, event: &Event);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&self, _event: &Event) {}
}

/// Result of [`ProductivityEngine::log_activity`].
#[derive(Debug, Clone, Serialize)]
pub struct LogOutcome {
    pub activity: Activity,
    /// Activity XP only; achievement rewards are on top of this.
    pub xp_awarded: u64,
    pub level_up: bool,
    pub new_level: u32,
    pub new_achievements: Vec<UnlockedAchievement>,
    pub streak: StreakState,
}

/// One engine instance per user profile.
pub struct ProductivityEngine {
    clock: Arc<dyn Clock>,
    sink: Box<dyn NotificationSink>,
    catalog: Vec<AchievementDef>,
    rates: XpRates,
    activities: Vec<Activity>,
    sessions: Vec<TimeSession>,
    session_engine: SessionEngine,
    profile: UserProfile,
}

impl ProductivityEngine {
    /// Engine with the system clock, built-in catalog and a null sink.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            sink: Box::new(NullSink),
            catalog: achievements::catalog(),
            rates: XpRates::default(),
            activities: Vec::new(),
            sessions: Vec::new(),
            session_engine: SessionEngine::default(),
            profile: UserProfile::default(),
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_rates(mut self, rates: XpRates) -> Self {
        self.rates = rates;
        self
    }

    pub fn with_session_config(mut self, config: SessionEngineConfig) -> Self {
        self.session_engine = SessionEngine::new(config);
        self
    }

    /// Replace the built-in catalog.
    ///
    /// # Errors
    /// Propagates [`CoreError::AchievementCatalogMismatch`](crate::CoreError::AchievementCatalogMismatch)
    /// from validation.
    pub fn with_catalog(mut self, catalog: Vec<AchievementDef>) -> Result<Self> {
        achievements::validate_catalog(&catalog)?;
        self.catalog = catalog;
        Ok(self)
    }

    /// Restore history loaded from storage.
    pub fn with_history(
        mut self,
        activities: Vec<Activity>,
        sessions: Vec<TimeSession>,
        profile: UserProfile,
    ) -> Self {
        self.activities = activities;
        self.sessions = sessions;
        self.profile = profile;
        self
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Append a new activity and run the full pipeline:
    /// streak recompute -> XP award -> achievement re-evaluation.
    ///
    /// Achievement unlocks and their XP rewards are applied before this
    /// call returns, so profile reads always see both or neither.
    pub fn log_activity(&mut self, draft: ActivityDraft) -> Result<LogOutcome> {
        let now = self.clock.now();
        let activity = Activity::from_draft(draft, now)?;
        self.activities.push(activity.clone());

        let old_streak = self.profile.current_streak;
        let streak = streak::compute_streak(&self.activities, now.date_naive());
        self.profile.current_streak = streak.current_streak;
        self.profile.longest_streak = self.profile.longest_streak.max(streak.longest_streak);

        let old_level = self.profile.level;
        let activity_xp = xp::compute_activity_xp(&activity, streak.current_streak, &self.rates);
        xp::award_xp(&mut self.profile, activity_xp as i64)?;

        self.sink.notify(&Event::ActivityLogged {
            activity_id: activity.id.clone(),
            xp_awarded: activity_xp,
            at: now,
        });

        for milestone in STREAK_MILESTONES {
            if old_streak < milestone && streak.current_streak >= milestone {
                self.sink.notify(&Event::StreakMilestone {
                    days: milestone,
                    at: now,
                });
            }
        }

        let new_achievements = self.unlock_crossed_achievements(&streak, now)?;

        let level_up = self.profile.level > old_level;
        if level_up {
            self.sink.notify(&Event::LevelUp {
                new_level: self.profile.level,
                total_xp: self.profile.xp,
                at: now,
            });
        }

        Ok(LogOutcome {
            activity,
            xp_awarded: activity_xp,
            level_up,
            new_level: self.profile.level,
            new_achievements,
            streak,
        })
    }

    /// Scan the catalog for entries whose progress just reached 100,
    /// record the unlock and grant the reward in one step.
    fn unlock_crossed_achievements(
        &mut self,
        streak: &StreakState,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<UnlockedAchievement>> {
        let mut unlocked = Vec::new();
        for def in &self.catalog {
            if self.profile.has_achievement(def.id) {
                continue;
            }
            let progress = achievements::evaluate(
                def,
                &self.activities,
                &self.sessions,
                streak,
                &self.profile,
            );
            if progress.unlocked {
                let record = UnlockedAchievement {
                    id: def.id.to_string(),
                    name: def.name.to_string(),
                    xp_reward: def.xp_reward,
                    unlocked_at: now,
                };
                self.profile.achievements.push(record.clone());
                xp::award_xp(&mut self.profile, def.xp_reward as i64)?;
                self.sink.notify(&Event::AchievementUnlocked {
                    achievement_id: record.id.clone(),
                    name: record.name.clone(),
                    xp_reward: record.xp_reward,
                    at: now,
                });
                unlocked.push(record);
            }
        }
        Ok(unlocked)
    }

    /// Start a focus session; see [`SessionEngine::start_session`] for
    /// the conflict policy. An auto-ended predecessor is recorded in the
    /// session history.
    pub fn start_session(
        &mut self,
        session_type: SessionType,
        planned_minutes: Option<u32>,
        project_id: Option<String>,
    ) -> Result<TimeSession> {
        let now = self.clock.now();
        let start = self
            .session_engine
            .start_session(session_type, planned_minutes, project_id, now)?;
        if let Some(prior) = start.auto_ended {
            self.sink.notify(&Event::SessionEnded {
                session_id: prior.id.clone(),
                session_type: prior.session_type,
                duration_minutes: prior.duration_minutes.unwrap_or(0),
                focus_score: prior.focus_score,
                at: now,
            });
            self.sessions.push(prior);
        }
        self.sink.notify(&Event::SessionStarted {
            session_id: start.session.id.clone(),
            session_type: start.session.session_type,
            planned_minutes: start.session.planned_minutes,
            at: now,
        });
        Ok(start.session)
    }

    pub fn start_break(&mut self, kind: BreakKind) -> Result<TimeSession> {
        let now = self.clock.now();
        let snapshot = self.session_engine.start_break(kind, now)?;
        self.sink.notify(&Event::BreakStarted {
            session_id: snapshot.id.clone(),
            kind,
            at: now,
        });
        Ok(snapshot)
    }

    pub fn end_break(&mut self) -> Result<TimeSession> {
        let now = self.clock.now();
        let snapshot = self.session_engine.end_break(now)?;
        if let Some(closed) = snapshot.breaks.last().filter(|b| b.end_time.is_some()) {
            self.sink.notify(&Event::BreakEnded {
                session_id: snapshot.id.clone(),
                break_minutes: closed.duration_minutes,
                at: now,
            });
        }
        Ok(snapshot)
    }

    /// Finalize the active session. The caller decides whether to roll
    /// the result into an activity via [`Self::log_activity`].
    pub fn end_session(&mut self) -> Result<TimeSession> {
        let now = self.clock.now();
        let session = self.session_engine.end_session(now)?;
        self.sink.notify(&Event::SessionEnded {
            session_id: session.id.clone(),
            session_type: session.session_type,
            duration_minutes: session.duration_minutes.unwrap_or(0),
            focus_score: session.focus_score,
            at: now,
        });
        self.sessions.push(session.clone());
        Ok(session)
    }

    /// Periodic driver for idle penalties and the planned-duration
    /// event. Call from the host's timer loop.
    pub fn tick(&mut self) -> Vec<Event> {
        let now = self.clock.now();
        let events = self.session_engine.tick(now);
        for event in &events {
            self.sink.notify(event);
        }
        events
    }

    /// Report user activity (keystroke, command); resets the idle clock.
    pub fn record_activity_signal(&mut self) {
        let now = self.clock.now();
        self.session_engine.record_activity_signal(now);
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn streak(&self) -> StreakState {
        streak::compute_streak(&self.activities, self.clock.today())
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn sessions(&self) -> &[TimeSession] {
        &self.sessions
    }

    pub fn active_session(&self) -> Option<&TimeSession> {
        self.session_engine.active()
    }

    pub fn remaining_minutes(&self) -> Option<u32> {
        self.session_engine.remaining_minutes(self.clock.now())
    }

    /// Progress for every catalog entry, frozen entries included.
    pub fn achievement_progress(&self) -> Vec<AchievementProgress> {
        let streak = self.streak();
        self.catalog
            .iter()
            .map(|def| {
                achievements::evaluate(def, &self.activities, &self.sessions, &streak, &self.profile)
            })
            .collect()
    }

    pub fn analytics_report(&self) -> AnalyticsReport {
        analytics::analyze(&self.activities, &self.sessions)
    }
}

impl Default for ProductivityEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityCategory;
    use crate::calendar::FixedClock;
    use chrono::{NaiveDate, TimeZone};
    use std::sync::Mutex;

    struct RecordingSink(Mutex<Vec<Event>>);

    impl NotificationSink for RecordingSink {
        fn notify(&self, event: &Event) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    fn fixed_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(
            chrono::Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn log_activity_awards_xp_and_first_achievement() {
        let clock = fixed_clock();
        let mut engine = ProductivityEngine::with_clock(clock);
        let outcome = engine
            .log_activity(
                ActivityDraft::new(ActivityCategory::Coding, "wrote code").with_duration(30),
            )
            .unwrap();

        // base 5 + 30 * 0.5 + streak 1 * 2 = 22
        assert_eq!(outcome.xp_awarded, 22);
        assert_eq!(outcome.streak.current_streak, 1);
        assert_eq!(outcome.new_achievements.len(), 1);
        assert_eq!(outcome.new_achievements[0].id, "first_activity");
        // 22 activity XP + 10 achievement reward.
        assert_eq!(engine.profile().xp, 32);
    }

    #[test]
    fn streak_builds_across_days_and_unlocks_streak_achievement() {
        let clock = fixed_clock();
        clock.set(chrono::Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
        let mut engine = ProductivityEngine::with_clock(clock.clone());

        for _ in 0..3 {
            engine
                .log_activity(ActivityDraft::new(ActivityCategory::Coding, "work"))
                .unwrap();
            clock.advance(chrono::Duration::days(1));
        }

        let streak = engine.streak();
        // Clock moved one day past the last log.
        assert_eq!(streak.current_streak, 0);
        assert_eq!(streak.longest_streak, 3);
        assert!(engine.profile().has_achievement("streak_3"));
    }

    #[test]
    fn achievement_unlock_and_reward_are_atomic() {
        let clock = fixed_clock();
        let mut engine = ProductivityEngine::with_clock(clock);
        let before = engine.profile().xp;
        let outcome = engine
            .log_activity(ActivityDraft::new(ActivityCategory::Coding, "work"))
            .unwrap();
        let reward: u64 = outcome.new_achievements.iter().map(|a| a.xp_reward).sum();
        // Whatever is observable after the call includes both the unlock
        // record and its reward.
        assert_eq!(engine.profile().xp, before + outcome.xp_awarded + reward);
        assert_eq!(
            engine.profile().achievements.len(),
            outcome.new_achievements.len()
        );
    }

    #[test]
    fn unlocked_achievements_stay_unlocked() {
        let clock = fixed_clock();
        clock.set(chrono::Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
        let mut engine = ProductivityEngine::with_clock(clock.clone());
        for _ in 0..3 {
            engine
                .log_activity(ActivityDraft::new(ActivityCategory::Coding, "work"))
                .unwrap();
            clock.advance(chrono::Duration::days(1));
        }
        let first_unlock = engine.profile().achievement("streak_3").unwrap().clone();

        // Streak broken: skip a week, log again.
        clock.advance(chrono::Duration::days(7));
        engine
            .log_activity(ActivityDraft::new(ActivityCategory::Coding, "work"))
            .unwrap();

        let progress = engine.achievement_progress();
        let streak3 = progress.iter().find(|p| p.id == "streak_3").unwrap();
        assert_eq!(streak3.progress, 100);
        assert_eq!(streak3.unlocked_at, Some(first_unlock.unlocked_at));
    }

    #[test]
    fn session_lifecycle_recorded_in_history() {
        let clock = fixed_clock();
        let mut engine = ProductivityEngine::with_clock(clock.clone());
        engine
            .start_session(SessionType::Pomodoro, Some(25), None)
            .unwrap();
        clock.advance(chrono::Duration::minutes(25));
        let done = engine.end_session().unwrap();
        assert_eq!(done.duration_minutes, Some(25));
        assert_eq!(engine.sessions().len(), 1);
        assert!(engine.active_session().is_none());
    }

    #[test]
    fn events_flow_through_sink() {
        let clock = fixed_clock();
        let sink = Arc::new(RecordingSink(Mutex::new(Vec::new())));

        struct Fwd(Arc<RecordingSink>);
        impl NotificationSink for Fwd {
            fn notify(&self, event: &Event) {
                self.0.notify(event);
            }
        }

        let mut engine =
            ProductivityEngine::with_clock(clock).with_sink(Box::new(Fwd(sink.clone())));
        engine
            .log_activity(ActivityDraft::new(ActivityCategory::Coding, "work"))
            .unwrap();

        let events = sink.0.lock().unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::ActivityLogged { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::AchievementUnlocked { .. })));
    }

    #[test]
    fn history_restore_resumes_profile() {
        let clock = fixed_clock();
        let mut profile = UserProfile::default();
        profile.xp = 150;
        profile.level = 2;
        let engine = ProductivityEngine::with_clock(clock).with_history(
            Vec::new(),
            Vec::new(),
            profile,
        );
        assert_eq!(engine.profile().level, 2);
    }

    #[test]
    fn streak_as_of_today_semantics() {
        // Activities on Jan 1-5, today is Jan 5 -> streak 5 (scenario 7).
        let clock = fixed_clock();
        clock.set(chrono::Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap());
        let mut engine = ProductivityEngine::with_clock(clock.clone());
        for day in 1..=5u32 {
            clock.set(
                chrono::Utc
                    .from_utc_datetime(
                        &NaiveDate::from_ymd_opt(2024, 1, day)
                            .unwrap()
                            .and_hms_opt(9, 0, 0)
                            .unwrap(),
                    ),
            );
            engine
                .log_activity(ActivityDraft::new(ActivityCategory::Coding, "work"))
                .unwrap();
        }
        let streak = engine.streak();
        assert_eq!(streak.current_streak, 5);
        assert_eq!(streak.longest_streak, 5);
    }
}
