//! Task data structure and related functionality.
//!
//! This module defines the `Task` record, its subtasks, the creation
//! payload (`NewTask`) and the partial update (`TaskPatch`) used by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::*;

/// A single to-do item.
///
/// `completed_at` is present exactly when `status` is `Completed`, and
/// `updated_at` never moves backwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub order_index: i64,
    #[serde(default)]
    pub recurrence_rule: Option<String>,
    pub created_by: String,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Tag ids, in the order they were attached.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }

    /// Bump `updated_at` to `now`, never earlier than the current value.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.updated_at {
            self.updated_at = now;
        }
    }

    /// Move to `status` and keep `completed_at` in step with it.
    pub(crate) fn set_status(&mut self, status: Status, now: DateTime<Utc>) {
        let was_completed = self.is_completed();
        self.status = status;
        match (was_completed, self.is_completed()) {
            (false, true) => self.completed_at = Some(now),
            (true, false) => self.completed_at = None,
            _ => {}
        }
    }
}

/// A checklist item belonging to exactly one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub task_id: String,
    pub title: String,
    #[serde(default)]
    pub is_done: bool,
    #[serde(default)]
    pub order_index: i64,
}

/// Everything needed to create a task; the store fills in id and timestamps.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub project_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub status: Status,
    pub order_index: i64,
    pub recurrence_rule: Option<String>,
    pub created_by: String,
    pub assigned_to: Option<String>,
    pub tags: Vec<String>,
    pub subtasks: Vec<Subtask>,
}

/// Partial update for a task. `None` leaves a field alone; for optional
/// fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub project_id: Option<Option<String>>,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub due_at: Option<Option<DateTime<Utc>>>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub order_index: Option<i64>,
    pub recurrence_rule: Option<Option<String>>,
    pub assigned_to: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

impl TaskPatch {
    /// Merge the present fields into `task`. Does not touch `updated_at`.
    pub(crate) fn apply(self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(v) = self.project_id {
            task.project_id = v;
        }
        if let Some(v) = self.title {
            task.title = v;
        }
        if let Some(v) = self.description {
            task.description = v;
        }
        if let Some(v) = self.due_at {
            task.due_at = v;
        }
        if let Some(v) = self.priority {
            task.priority = v;
        }
        if let Some(v) = self.status {
            task.set_status(v, now);
        }
        if let Some(v) = self.order_index {
            task.order_index = v;
        }
        if let Some(v) = self.recurrence_rule {
            task.recurrence_rule = v;
        }
        if let Some(v) = self.assigned_to {
            task.assigned_to = v;
        }
        if let Some(v) = self.tags {
            task.tags = dedup_ids(v);
        }
    }
}

/// Drop repeated ids, keeping the first occurrence of each.
pub fn dedup_ids(ids: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
