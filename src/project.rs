//! Projects group tasks under a title and colour.
//!
//! Tasks point at a project by id; removing a project removes its tasks
//! (see `Database::delete_project`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named, coloured bucket of tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub color: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub is_shared: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Bump `updated_at` to `now`, never earlier than the current value.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}

/// Creation payload for a project.
#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub user_id: String,
    pub title: String,
    pub color: String,
    pub icon: Option<String>,
    pub is_shared: bool,
}

/// Partial update for a project.
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub color: Option<String>,
    pub icon: Option<Option<String>>,
    pub is_shared: Option<bool>,
}

impl ProjectPatch {
    pub(crate) fn apply(self, project: &mut Project) {
        if let Some(v) = self.title {
            project.title = v;
        }
        if let Some(v) = self.color {
            project.color = v;
        }
        if let Some(v) = self.icon {
            project.icon = v;
        }
        if let Some(v) = self.is_shared {
            project.is_shared = v;
        }
    }
}

/// The two projects every fresh store starts with.
pub fn seed_projects(now: DateTime<Utc>) -> Vec<Project> {
    let seed = |id: &str, title: &str, color: &str, icon: &str| Project {
        id: id.to_string(),
        user_id: "user1".to_string(),
        title: title.to_string(),
        color: color.to_string(),
        icon: Some(icon.to_string()),
        is_shared: false,
        created_at: now,
        updated_at: now,
    };
    vec![
        seed("1", "Personal", "#6366f1", "🏠"),
        seed("2", "Work", "#14b8a6", "💼"),
    ]
}
