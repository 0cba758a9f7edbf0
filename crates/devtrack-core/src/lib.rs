//! # Devtrack Core Library
//!
//! This library provides the core bookkeeping logic for Devtrack, a
//! developer productivity tracker. It implements a CLI-first philosophy
//! where all operations are available via a standalone CLI binary, with
//! any richer front end being a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Productivity Engine**: the orchestrating facade; logging an
//!   activity runs streak recompute, XP award and achievement
//!   re-evaluation in one step
//! - **Session Engine**: a wall-clock-based focus-session state machine
//!   that requires the caller to periodically invoke `tick()`
//! - **Storage**: SQLite-based history storage and TOML-based
//!   configuration
//! - **Analytics**: pure rollups over the activity/session history
//!
//! ## Key Components
//!
//! - [`ProductivityEngine`]: entry point for logging and queries
//! - [`SessionEngine`]: focus session state machine
//! - [`Database`]: activity/session/profile persistence
//! - [`Config`]: application configuration management

pub mod achievements;
pub mod activity;
pub mod analytics;
pub mod calendar;
pub mod engine;
pub mod error;
pub mod events;
pub mod profile;
pub mod project;
pub mod session;
pub mod storage;
pub mod streak;
pub mod xp;

pub use achievements::{AchievementDef, AchievementProgress, Requirement};
pub use activity::{Activity, ActivityCategory, ActivityDraft};
pub use analytics::{AnalyticsReport, Trend};
pub use calendar::{Clock, FixedClock, SystemClock};
pub use engine::{LogOutcome, NotificationSink, NullSink, ProductivityEngine};
pub use error::{ConfigError, CoreError, DatabaseError, Result};
pub use events::Event;
pub use profile::{UnlockedAchievement, UserProfile};
pub use project::{Goal, Milestone, Project, ProjectStatus};
pub use session::{
    BreakKind, ConflictPolicy, SessionEngine, SessionEngineConfig, SessionType, TimeSession,
};
pub use storage::{Config, Database};
pub use streak::{compute_streak, StreakState};
pub use xp::{award_xp, compute_activity_xp, level_from_xp, XpAward, XpRates, LEVEL_THRESHOLDS};
