//! Persisted store state and the operations that mutate it.
//!
//! `Database` is the full snapshot written to disk: tasks, projects, tags,
//! the current view and the UI flags. Every operation here is synchronous
//! and infallible; operations addressed at an unknown id leave the state
//! untouched and report `false`. Persistence and change notification are
//! layered on top by `TaskStore`.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::fields::*;
use crate::project::{seed_projects, NewProject, Project, ProjectPatch};
use crate::tag::{seed_tags, NewTag, Tag};
use crate::task::{dedup_ids, NewTask, Subtask, Task, TaskPatch};
use crate::view::FilterOptions;

/// In-memory snapshot of everything the app knows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub current_view: ViewType,
    #[serde(default)]
    pub selected_task_id: Option<String>,
    #[serde(default)]
    pub selected_project_id: Option<String>,
    #[serde(default)]
    pub filters: FilterOptions,
    #[serde(default)]
    pub is_quick_add_open: bool,
    #[serde(default = "default_sidebar_open")]
    pub is_sidebar_open: bool,
}

fn default_sidebar_open() -> bool {
    true
}

impl Default for Database {
    /// The state a fresh install starts from: no tasks, the seed projects
    /// and tags, inbox view, sidebar open.
    fn default() -> Self {
        Database::seeded(Utc::now())
    }
}

/// Generate a fresh unique id such as `task-3f2a…`.
pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

impl Database {
    /// Seed state with a fixed creation time for the seed projects.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        Database {
            tasks: Vec::new(),
            projects: seed_projects(now),
            tags: seed_tags(),
            current_view: ViewType::Inbox,
            selected_task_id: None,
            selected_project_id: None,
            filters: FilterOptions::default(),
            is_quick_add_open: false,
            is_sidebar_open: true,
        }
    }

    /// Load the snapshot, falling back to the seed state when the file is
    /// missing, unreadable or corrupt. Never fails.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "no snapshot, starting from seed state");
            return Database::default();
        }
        let mut buf = String::new();
        match File::open(path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => match serde_json::from_str(&buf) {
                Ok(db) => db,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt snapshot, starting fresh");
                    Database::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable snapshot, starting fresh");
                Database::default()
            }
        }
    }

    /// Save the snapshot using an atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(self)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Get a task by id.
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Get a mutable reference to a task by id.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn tag(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    // ---- tasks -------------------------------------------------------------

    /// Append a new task built from `new` and return its id.
    pub fn add_task(&mut self, new: NewTask, now: DateTime<Utc>) -> String {
        let id = new_id("task");
        let completed_at = (new.status == Status::Completed).then_some(now);
        let subtasks = new
            .subtasks
            .into_iter()
            .map(|s| Subtask { task_id: id.clone(), ..s })
            .collect();
        self.tasks.push(Task {
            id: id.clone(),
            project_id: new.project_id,
            title: new.title,
            description: new.description,
            due_at: new.due_at,
            priority: new.priority,
            status: new.status,
            order_index: new.order_index,
            recurrence_rule: new.recurrence_rule,
            created_by: new.created_by,
            assigned_to: new.assigned_to,
            completed_at,
            created_at: now,
            updated_at: now,
            tags: dedup_ids(new.tags),
            subtasks,
        });
        id
    }

    /// Merge `patch` into the task with `id`. Returns false for unknown ids.
    pub fn update_task(&mut self, id: &str, patch: TaskPatch, now: DateTime<Utc>) -> bool {
        let Some(task) = self.get_mut(id) else {
            return false;
        };
        patch.apply(task, now);
        task.touch(now);
        true
    }

    /// Remove the task with `id`, clearing the selection if it pointed there.
    pub fn delete_task(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return false;
        }
        if self.selected_task_id.as_deref() == Some(id) {
            self.selected_task_id = None;
        }
        true
    }

    /// Flip between `Completed` and `Todo`. An in-progress task completes.
    pub fn toggle_task_complete(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        let Some(task) = self.get_mut(id) else {
            return false;
        };
        let next = if task.is_completed() {
            Status::Todo
        } else {
            Status::Completed
        };
        task.set_status(next, now);
        task.touch(now);
        true
    }

    /// Give the task named at position `i` of `ids` order index `i` and move
    /// the named tasks to the front in that order. Unnamed tasks keep their
    /// relative order and order index. Unknown ids are skipped but still
    /// consume their position; a repeated id counts only the first time.
    pub fn reorder_tasks(&mut self, ids: &[String], now: DateTime<Utc>) {
        let mut remaining = std::mem::take(&mut self.tasks);
        let mut reordered = Vec::with_capacity(remaining.len());
        for (index, id) in ids.iter().enumerate() {
            if let Some(pos) = remaining.iter().position(|t| &t.id == id) {
                let mut task = remaining.remove(pos);
                task.order_index = index as i64;
                task.touch(now);
                reordered.push(task);
            }
        }
        reordered.extend(remaining);
        self.tasks = reordered;
    }

    /// Append a subtask to `task_id`. Returns the subtask id, or `None` when
    /// the task does not exist.
    pub fn add_subtask(&mut self, task_id: &str, title: String, now: DateTime<Utc>) -> Option<String> {
        let task = self.get_mut(task_id)?;
        let id = new_id("subtask");
        let order_index = task
            .subtasks
            .iter()
            .map(|s| s.order_index + 1)
            .max()
            .unwrap_or(0);
        task.subtasks.push(Subtask {
            id: id.clone(),
            task_id: task_id.to_string(),
            title,
            is_done: false,
            order_index,
        });
        task.touch(now);
        Some(id)
    }

    /// Flip the done flag of one subtask.
    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str, now: DateTime<Utc>) -> bool {
        let Some(task) = self.get_mut(task_id) else {
            return false;
        };
        let Some(sub) = task.subtasks.iter_mut().find(|s| s.id == subtask_id) else {
            return false;
        };
        sub.is_done = !sub.is_done;
        task.touch(now);
        true
    }

    // ---- projects ----------------------------------------------------------

    pub fn add_project(&mut self, new: NewProject, now: DateTime<Utc>) -> String {
        let id = new_id("project");
        self.projects.push(Project {
            id: id.clone(),
            user_id: new.user_id,
            title: new.title,
            color: new.color,
            icon: new.icon,
            is_shared: new.is_shared,
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn update_project(&mut self, id: &str, patch: ProjectPatch, now: DateTime<Utc>) -> bool {
        let Some(project) = self.projects.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        patch.apply(project);
        project.touch(now);
        true
    }

    /// Remove a project together with every task that references it.
    /// Returns the number of tasks removed, or `None` for an unknown id.
    pub fn delete_project(&mut self, id: &str) -> Option<usize> {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        if self.projects.len() == before {
            return None;
        }
        let tasks_before = self.tasks.len();
        self.tasks.retain(|t| t.project_id.as_deref() != Some(id));
        if self.selected_project_id.as_deref() == Some(id) {
            self.selected_project_id = None;
        }
        if let Some(selected) = self.selected_task_id.as_deref() {
            if self.get(selected).is_none() {
                self.selected_task_id = None;
            }
        }
        Some(tasks_before - self.tasks.len())
    }

    // ---- tags --------------------------------------------------------------

    pub fn add_tag(&mut self, new: NewTag) -> String {
        let id = new_id("tag");
        self.tags.push(Tag {
            id: id.clone(),
            user_id: new.user_id,
            name: new.name,
            color: new.color,
        });
        id
    }

    /// Remove a tag and pull it off every task that carries it.
    pub fn delete_tag(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t.id != id);
        if self.tags.len() == before {
            return false;
        }
        for task in self.tasks.iter_mut() {
            if task.tags.iter().any(|t| t == id) {
                task.tags.retain(|t| t != id);
                task.touch(now);
            }
        }
        true
    }
}
