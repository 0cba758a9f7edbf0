//! Project, goal and milestone tracking.
//!
//! Milestone progress is derived from task completion
//! (`100 * completed / total`) and recomputed on every task completion;
//! `completed_at` is set exactly once, the first time progress reaches 100.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
    Paused,
    Archived,
}

/// A measurable target inside a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub target_value: u64,
    pub current_value: u64,
    /// Free-text unit: "hours", "sessions", "activities".
    pub unit: String,
    pub is_completed: bool,
}

impl Goal {
    pub fn new(target_value: u64, unit: impl Into<String>) -> Self {
        Self {
            target_value,
            current_value: 0,
            unit: unit.into(),
            is_completed: false,
        }
    }

    /// Add progress toward the goal; marks completion at the target.
    pub fn record(&mut self, amount: u64) {
        self.current_value += amount;
        if self.current_value >= self.target_value {
            self.is_completed = true;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneTask {
    pub name: String,
    pub is_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub name: String,
    pub tasks: Vec<MilestoneTask>,
    /// Derived: `100 * completed_tasks / total_tasks`.
    pub progress: u8,
    /// Set exactly once, the first time progress reaches 100.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Milestone {
    pub fn new(name: impl Into<String>, task_names: Vec<String>) -> Self {
        Self {
            name: name.into(),
            tasks: task_names
                .into_iter()
                .map(|name| MilestoneTask {
                    name,
                    is_completed: false,
                })
                .collect(),
            progress: 0,
            completed_at: None,
        }
    }

    /// Mark task `index` complete and recompute progress.
    ///
    /// # Errors
    /// [`CoreError::InvalidValue`] if `index` is out of bounds.
    pub fn complete_task(&mut self, index: usize, now: DateTime<Utc>) -> Result<u8> {
        let total = self.tasks.len();
        let task = self
            .tasks
            .get_mut(index)
            .ok_or_else(|| CoreError::InvalidValue {
                field: "task_index",
                message: format!("index {index} out of bounds for {total} tasks"),
            })?;
        task.is_completed = true;

        let completed = self.tasks.iter().filter(|t| t.is_completed).count();
        self.progress = if total == 0 {
            0
        } else {
            (completed * 100 / total) as u8
        };
        if self.progress >= 100 && self.completed_at.is_none() {
            self.completed_at = Some(now);
        }
        Ok(self.progress)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub status: ProjectStatus,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            status: ProjectStatus::Active,
            goals: Vec::new(),
            milestones: Vec::new(),
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap()
    }

    #[test]
    fn milestone_progress_derived_from_tasks() {
        let mut m = Milestone::new(
            "v1",
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
        );
        assert_eq!(m.complete_task(0, now()).unwrap(), 25);
        assert_eq!(m.complete_task(1, now()).unwrap(), 50);
        assert!(m.completed_at.is_none());
    }

    #[test]
    fn completed_at_set_exactly_once() {
        let mut m = Milestone::new("v1", vec!["a".into(), "b".into()]);
        let first = now();
        let later = first + chrono::Duration::hours(2);

        m.complete_task(0, first).unwrap();
        m.complete_task(1, first).unwrap();
        assert_eq!(m.completed_at, Some(first));

        // Re-completing a task must not move the timestamp.
        m.complete_task(0, later).unwrap();
        assert_eq!(m.completed_at, Some(first));
    }

    #[test]
    fn complete_task_out_of_bounds() {
        let mut m = Milestone::new("v1", vec!["a".into()]);
        assert!(matches!(
            m.complete_task(5, now()),
            Err(CoreError::InvalidValue { .. })
        ));
    }

    #[test]
    fn goal_completes_at_target() {
        let mut g = Goal::new(10, "sessions");
        g.record(6);
        assert!(!g.is_completed);
        g.record(4);
        assert!(g.is_completed);
        assert_eq!(g.current_value, 10);
    }

    #[test]
    fn new_project_is_active() {
        let p = Project::new("devtrack", now());
        assert_eq!(p.status, ProjectStatus::Active);
        assert!(p.goals.is_empty());
    }
}
