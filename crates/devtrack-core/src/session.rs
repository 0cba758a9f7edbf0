//! Focus session state machine.
//!
//! The engine is wall-clock-based and does not use internal threads --
//! the caller is responsible for calling `tick()` periodically. Idle
//! penalties and the planned-duration event are applied from the instants
//! the caller passes in, so a finalized session can never be hit by a
//! stale timer: there is nothing to cancel.
//!
//! ## State Transitions
//!
//! ```text
//! (no session) -> Active -> (Active <-> OnBreak) -> Ended
//! ```
//!
//! Two distinct time quantities are easy to confuse here:
//!
//! - The **finalized duration** of a session is pure wall-clock elapsed
//!   time from start to end. Break time is NOT subtracted.
//! - The **live countdown** credits closed break time back:
//!   `remaining = max(0, planned - elapsed_since_start + closed_break_minutes)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Pomodoro,
    ShortFocus,
    DeepWork,
    ExtendedFocus,
    Custom,
    Break,
}

impl SessionType {
    /// Default planned duration in minutes when the caller gives none.
    pub fn default_minutes(&self) -> u32 {
        match self {
            SessionType::Pomodoro => 25,
            SessionType::ShortFocus => 15,
            SessionType::DeepWork => 50,
            SessionType::ExtendedFocus => 90,
            SessionType::Custom => 25,
            SessionType::Break => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakKind {
    Short,
    Long,
    Custom,
}

/// One break inside a session. An open break has no `end_time`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakRecord {
    pub kind: BreakKind,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Whole minutes, filled in when the break closes.
    #[serde(default)]
    pub duration_minutes: u32,
}

/// One focus-timer run. Immutable once `end_time` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSession {
    pub id: String,
    pub session_type: SessionType,
    pub start_time: DateTime<Utc>,
    /// Absent while the session is active.
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    pub planned_minutes: u32,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub breaks: Vec<BreakRecord>,
    /// Starts at 10, decremented by idle penalties, floor 1.
    pub focus_score: u8,
    #[serde(default)]
    pub interruption_count: u32,
    /// Wall-clock minutes from start to end, set on finalization.
    #[serde(default)]
    pub duration_minutes: Option<u32>,
}

impl TimeSession {
    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }

    /// The latest break, if it is still open.
    pub fn open_break(&self) -> Option<&BreakRecord> {
        self.breaks.last().filter(|b| b.end_time.is_none())
    }

    /// Sum of closed break durations in minutes.
    pub fn closed_break_minutes(&self) -> u32 {
        self.breaks
            .iter()
            .filter(|b| b.end_time.is_some())
            .map(|b| b.duration_minutes)
            .sum()
    }

    /// Whether this session finished as a completed focus run (ended,
    /// and of a focus type rather than a break).
    pub fn is_completed_focus(&self) -> bool {
        self.end_time.is_some() && self.session_type != SessionType::Break
    }
}

/// What to do when `start_session` finds a session already active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Silently finalize the live session first (source behavior).
    #[default]
    AutoEnd,
    /// Fail with [`CoreError::SessionAlreadyActive`].
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionEngineConfig {
    /// Minutes without an activity signal before a focus penalty.
    pub idle_threshold_minutes: u32,
    pub conflict_policy: ConflictPolicy,
}

impl Default for SessionEngineConfig {
    fn default() -> Self {
        Self {
            idle_threshold_minutes: 5,
            conflict_policy: ConflictPolicy::AutoEnd,
        }
    }
}

/// Outcome of `start_session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStart {
    pub session: TimeSession,
    /// The previous session, when the `AutoEnd` policy finalized one.
    pub auto_ended: Option<TimeSession>,
}

/// Wall-clock session state machine.
///
/// At most one session is active at a time. All operations take the
/// current instant from the caller, which keeps the engine serializable
/// and deterministic under a fake clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEngine {
    config: SessionEngineConfig,
    #[serde(default)]
    active: Option<TimeSession>,
    /// Last activity signal while active; idle penalties measure from here.
    #[serde(default)]
    last_signal: Option<DateTime<Utc>>,
    /// The planned-duration event fires at most once per session.
    #[serde(default)]
    planned_reached: bool,
}

impl SessionEngine {
    pub fn new(config: SessionEngineConfig) -> Self {
        Self {
            config,
            active: None,
            last_signal: None,
            planned_reached: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &SessionEngineConfig {
        &self.config
    }

    pub fn active(&self) -> Option<&TimeSession> {
        self.active.as_ref()
    }

    pub fn is_on_break(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|s| s.open_break().is_some())
    }

    /// Live countdown: `max(0, planned - elapsed_since_start + closed_break_minutes)`.
    ///
    /// Closed break time is credited back onto the countdown (added, not
    /// ignored). An open break contributes nothing until it closes.
    pub fn remaining_minutes(&self, now: DateTime<Utc>) -> Option<u32> {
        let session = self.active.as_ref()?;
        let elapsed = (now - session.start_time).num_minutes().max(0);
        let remaining =
            session.planned_minutes as i64 - elapsed + session.closed_break_minutes() as i64;
        Some(remaining.max(0) as u32)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a new session.
    ///
    /// # Errors
    /// With [`ConflictPolicy::Reject`], fails with
    /// [`CoreError::SessionAlreadyActive`] if a session is live. The
    /// default `AutoEnd` policy finalizes the live session silently.
    pub fn start_session(
        &mut self,
        session_type: SessionType,
        planned_minutes: Option<u32>,
        project_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<SessionStart> {
        if let Some(live) = self.active.as_ref() {
            if self.config.conflict_policy == ConflictPolicy::Reject {
                return Err(CoreError::SessionAlreadyActive {
                    started_at: live.start_time,
                });
            }
        }
        let auto_ended = if self.active.is_some() {
            Some(self.end_session(now)?)
        } else {
            None
        };

        let session = TimeSession {
            id: Uuid::new_v4().to_string(),
            session_type,
            start_time: now,
            end_time: None,
            planned_minutes: planned_minutes.unwrap_or_else(|| session_type.default_minutes()),
            project_id,
            breaks: Vec::new(),
            focus_score: 10,
            interruption_count: 0,
            duration_minutes: None,
        };
        self.active = Some(session.clone());
        self.last_signal = Some(now);
        self.planned_reached = false;
        Ok(SessionStart {
            session,
            auto_ended,
        })
    }

    /// Open a break in the active session. Pauses the idle clock.
    ///
    /// # Errors
    /// [`CoreError::NoActiveSession`] if nothing is active;
    /// [`CoreError::InvalidValue`] if a break is already open (a break
    /// must close before the next one starts).
    pub fn start_break(&mut self, kind: BreakKind, now: DateTime<Utc>) -> Result<TimeSession> {
        let session = self.active.as_mut().ok_or(CoreError::NoActiveSession {
            operation: "start_break",
        })?;
        if session.open_break().is_some() {
            return Err(CoreError::InvalidValue {
                field: "break",
                message: "a break is already open".to_string(),
            });
        }
        session.breaks.push(BreakRecord {
            kind,
            start_time: now,
            end_time: None,
            duration_minutes: 0,
        });
        Ok(session.clone())
    }

    /// Close the open break, computing its duration. No-op when no break
    /// is open; still fails if no session is active.
    pub fn end_break(&mut self, now: DateTime<Utc>) -> Result<TimeSession> {
        let session = self.active.as_mut().ok_or(CoreError::NoActiveSession {
            operation: "end_break",
        })?;
        if let Some(open) = session.breaks.last_mut().filter(|b| b.end_time.is_none()) {
            open.end_time = Some(now);
            open.duration_minutes = (now - open.start_time).num_minutes().max(0) as u32;
        }
        // Resuming focus counts as an activity signal.
        self.last_signal = Some(now);
        Ok(session.clone())
    }

    /// Finalize the active session and return the immutable record.
    ///
    /// The finalized `duration_minutes` is total wall-clock time from
    /// start to end; breaks are not subtracted.
    ///
    /// # Errors
    /// [`CoreError::NoActiveSession`] if nothing is active.
    pub fn end_session(&mut self, now: DateTime<Utc>) -> Result<TimeSession> {
        let mut session = self.active.take().ok_or(CoreError::NoActiveSession {
            operation: "end_session",
        })?;
        // Close any open break at the same instant.
        if let Some(open) = session.breaks.last_mut().filter(|b| b.end_time.is_none()) {
            open.end_time = Some(now);
            open.duration_minutes = (now - open.start_time).num_minutes().max(0) as u32;
        }
        session.end_time = Some(now);
        session.duration_minutes = Some((now - session.start_time).num_minutes().max(0) as u32);
        self.last_signal = None;
        self.planned_reached = false;
        Ok(session)
    }

    /// Record that the user is active; resets the idle clock.
    pub fn record_activity_signal(&mut self, now: DateTime<Utc>) {
        if self.active.is_some() {
            self.last_signal = Some(now);
        }
    }

    /// Call periodically. Applies idle penalties and reports the planned
    /// duration being reached (once). Returns the events produced.
    ///
    /// Each elapsed idle threshold counts as one interruption and emits
    /// one [`Event::FocusPenalty`], even after the focus score has
    /// bottomed out at 1 (the score clamps; the count does not).
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();
        let on_break = self.is_on_break();
        let idle_threshold = chrono::Duration::minutes(self.config.idle_threshold_minutes as i64);

        let Some(session) = self.active.as_mut() else {
            return events;
        };

        // Idle penalty: only while focused, not on break. Every idle
        // period is an interruption; the score clamps at 1 but never
        // ends the session.
        if !on_break {
            if let Some(last) = self.last_signal {
                if now - last >= idle_threshold {
                    if session.focus_score > 1 {
                        session.focus_score -= 1;
                    }
                    session.interruption_count += 1;
                    self.last_signal = Some(now);
                    events.push(Event::FocusPenalty {
                        session_id: session.id.clone(),
                        focus_score: session.focus_score,
                        interruption_count: session.interruption_count,
                        at: now,
                    });
                }
            }
        }

        if !self.planned_reached {
            let elapsed = (now - session.start_time).num_minutes().max(0);
            let remaining =
                session.planned_minutes as i64 - elapsed + session.closed_break_minutes() as i64;
            if remaining <= 0 {
                self.planned_reached = true;
                events.push(Event::PlannedDurationReached {
                    session_id: session.id.clone(),
                    session_type: session.session_type,
                    at: now,
                });
            }
        }

        events
    }
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new(SessionEngineConfig::default())
    }
}
