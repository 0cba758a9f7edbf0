//! Activity log model.
//!
//! An [`Activity`] is one logged unit of completed work. Activities are
//! append-only: once created their date/time never change.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};

/// Category of a logged activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    Coding,
    Documentation,
    BugFix,
    Feature,
    CodeReview,
    Testing,
    Refactoring,
    Planning,
    Learning,
    Meeting,
    Deployment,
    Research,
    Other,
}

impl ActivityCategory {
    /// All categories, in display order.
    pub const ALL: [ActivityCategory; 13] = [
        ActivityCategory::Coding,
        ActivityCategory::Documentation,
        ActivityCategory::BugFix,
        ActivityCategory::Feature,
        ActivityCategory::CodeReview,
        ActivityCategory::Testing,
        ActivityCategory::Refactoring,
        ActivityCategory::Planning,
        ActivityCategory::Learning,
        ActivityCategory::Meeting,
        ActivityCategory::Deployment,
        ActivityCategory::Research,
        ActivityCategory::Other,
    ];

    /// Fixed per-category XP bonus. Categories not in the bonus table
    /// award 0.
    pub fn xp_bonus(&self) -> u64 {
        match self {
            ActivityCategory::BugFix => 5,
            ActivityCategory::Feature => 4,
            ActivityCategory::CodeReview => 3,
            ActivityCategory::Testing => 3,
            ActivityCategory::Refactoring => 4,
            ActivityCategory::Learning => 2,
            ActivityCategory::Coding
            | ActivityCategory::Documentation
            | ActivityCategory::Planning
            | ActivityCategory::Meeting
            | ActivityCategory::Deployment
            | ActivityCategory::Research
            | ActivityCategory::Other => 0,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ActivityCategory::Coding => "Coding",
            ActivityCategory::Documentation => "Documentation",
            ActivityCategory::BugFix => "Bug Fix",
            ActivityCategory::Feature => "Feature",
            ActivityCategory::CodeReview => "Code Review",
            ActivityCategory::Testing => "Testing",
            ActivityCategory::Refactoring => "Refactoring",
            ActivityCategory::Planning => "Planning",
            ActivityCategory::Learning => "Learning",
            ActivityCategory::Meeting => "Meeting",
            ActivityCategory::Deployment => "Deployment",
            ActivityCategory::Research => "Research",
            ActivityCategory::Other => "Other",
        }
    }
}

/// One logged unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    /// Calendar day the work happened on.
    pub date: NaiveDate,
    /// Wall-clock time of day, `HH:MM`.
    pub time: String,
    pub category: ActivityCategory,
    pub description: String,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    /// Self-reported focus, 1..=10.
    #[serde(default)]
    pub focus_score: Option<u8>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

/// Caller-supplied fields for a new activity. The engine fills in id,
/// date and time from its clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityDraft {
    pub category: ActivityCategory,
    pub description: String,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub focus_score: Option<u8>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

impl ActivityDraft {
    pub fn new(category: ActivityCategory, description: impl Into<String>) -> Self {
        Self {
            category,
            description: description.into(),
            duration_minutes: None,
            focus_score: None,
            tags: Vec::new(),
            project_id: None,
        }
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    pub fn with_focus(mut self, score: u8) -> Self {
        self.focus_score = Some(score);
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }
}

impl Activity {
    /// Materialize a draft at the given instant.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidValue`] if `focus_score` is outside
    /// 1..=10.
    pub fn from_draft(draft: ActivityDraft, at: chrono::DateTime<chrono::Utc>) -> Result<Self> {
        if let Some(score) = draft.focus_score {
            if !(1..=10).contains(&score) {
                return Err(CoreError::InvalidValue {
                    field: "focus_score",
                    message: format!("must be in 1..=10, got {score}"),
                });
            }
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            date: at.date_naive(),
            time: at.format("%H:%M").to_string(),
            category: draft.category,
            description: draft.description,
            duration_minutes: draft.duration_minutes,
            focus_score: draft.focus_score,
            tags: draft.tags,
            project_id: draft.project_id,
        })
    }

    /// Hour of day (0-23) parsed from the `time` field.
    pub fn hour(&self) -> Option<u32> {
        let (hh, _) = self.time.split_once(':')?;
        hh.parse::<u32>().ok().filter(|h| *h < 24)
    }
}
