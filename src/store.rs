//! The task store: single source of truth for tasks, projects, tags and UI
//! selection state.
//!
//! `TaskStore` owns a `Database` and the path of its snapshot. Each
//! mutating operation runs through [`TaskStore::commit`], which applies the
//! change to a copy, writes that copy as the snapshot, and only then swaps
//! it in and broadcasts a [`StoreEvent`] to every subscriber. Operations
//! on unknown ids change nothing, so nothing is written and nobody is
//! notified.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

use chrono::Utc;
use tracing::{debug, warn};

use crate::db::Database;
use crate::error::Result;
use crate::fields::ViewType;
use crate::project::{NewProject, ProjectPatch};
use crate::tag::NewTag;
use crate::task::{NewTask, TaskPatch};
use crate::view::FilterOptions;

/// What changed in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    TaskCreated(String),
    TaskUpdated(String),
    TaskDeleted(String),
    TasksReordered,
    ProjectCreated(String),
    ProjectUpdated(String),
    ProjectDeleted { id: String, tasks_removed: usize },
    TagCreated(String),
    TagDeleted(String),
    UiChanged,
}

/// Snapshot-backed state container with change notification.
pub struct TaskStore {
    db: Database,
    path: PathBuf,
    subscribers: Vec<Sender<StoreEvent>>,
}

impl TaskStore {
    /// Restore the store from `path`, or start from the seed state.
    pub fn open(path: &Path) -> Self {
        TaskStore {
            db: Database::load(path),
            path: path.to_path_buf(),
            subscribers: Vec::new(),
        }
    }

    /// Read-only view of the current state.
    pub fn state(&self) -> &Database {
        &self.db
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Register a new subscriber. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Apply `change` to a working copy; if it produced an event, persist
    /// the copy, then adopt it and notify. A failed save leaves the state
    /// as it was and tells nobody.
    fn commit<T>(&mut self, change: impl FnOnce(&mut Database) -> (T, Option<StoreEvent>)) -> Result<T> {
        let mut next = self.db.clone();
        let (value, event) = change(&mut next);
        if let Some(event) = event {
            debug!(?event, "store mutation");
            if let Err(e) = next.save(&self.path) {
                warn!(path = %self.path.display(), error = %e, "snapshot write failed, change dropped");
                return Err(e);
            }
            self.db = next;
            self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        }
        Ok(value)
    }

    // ---- tasks -------------------------------------------------------------

    pub fn add_task(&mut self, new: NewTask) -> Result<String> {
        self.commit(|db| {
            let id = db.add_task(new, Utc::now());
            (id.clone(), Some(StoreEvent::TaskCreated(id)))
        })
    }

    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<()> {
        self.commit(|db| {
            let changed = db.update_task(id, patch, Utc::now());
            ((), changed.then(|| StoreEvent::TaskUpdated(id.to_string())))
        })
    }

    pub fn delete_task(&mut self, id: &str) -> Result<()> {
        self.commit(|db| {
            let changed = db.delete_task(id);
            ((), changed.then(|| StoreEvent::TaskDeleted(id.to_string())))
        })
    }

    pub fn toggle_task_complete(&mut self, id: &str) -> Result<()> {
        self.commit(|db| {
            let changed = db.toggle_task_complete(id, Utc::now());
            ((), changed.then(|| StoreEvent::TaskUpdated(id.to_string())))
        })
    }

    pub fn reorder_tasks(&mut self, ids: &[String]) -> Result<()> {
        self.commit(|db| {
            db.reorder_tasks(ids, Utc::now());
            ((), Some(StoreEvent::TasksReordered))
        })
    }

    pub fn add_subtask(&mut self, task_id: &str, title: String) -> Result<Option<String>> {
        self.commit(|db| {
            let id = db.add_subtask(task_id, title, Utc::now());
            let event = id.as_ref().map(|_| StoreEvent::TaskUpdated(task_id.to_string()));
            (id, event)
        })
    }

    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str) -> Result<()> {
        self.commit(|db| {
            let changed = db.toggle_subtask(task_id, subtask_id, Utc::now());
            ((), changed.then(|| StoreEvent::TaskUpdated(task_id.to_string())))
        })
    }

    // ---- projects ----------------------------------------------------------

    pub fn add_project(&mut self, new: NewProject) -> Result<String> {
        self.commit(|db| {
            let id = db.add_project(new, Utc::now());
            (id.clone(), Some(StoreEvent::ProjectCreated(id)))
        })
    }

    pub fn update_project(&mut self, id: &str, patch: ProjectPatch) -> Result<()> {
        self.commit(|db| {
            let changed = db.update_project(id, patch, Utc::now());
            ((), changed.then(|| StoreEvent::ProjectUpdated(id.to_string())))
        })
    }

    /// Delete a project and its tasks. Returns how many tasks went with it.
    pub fn delete_project(&mut self, id: &str) -> Result<usize> {
        self.commit(|db| match db.delete_project(id) {
            Some(tasks_removed) => (
                tasks_removed,
                Some(StoreEvent::ProjectDeleted { id: id.to_string(), tasks_removed }),
            ),
            None => (0, None),
        })
    }

    // ---- tags --------------------------------------------------------------

    pub fn add_tag(&mut self, new: NewTag) -> Result<String> {
        self.commit(|db| {
            let id = db.add_tag(new);
            (id.clone(), Some(StoreEvent::TagCreated(id)))
        })
    }

    pub fn delete_tag(&mut self, id: &str) -> Result<()> {
        self.commit(|db| {
            let changed = db.delete_tag(id, Utc::now());
            ((), changed.then(|| StoreEvent::TagDeleted(id.to_string())))
        })
    }

    // ---- UI state ----------------------------------------------------------

    pub fn set_current_view(&mut self, view: ViewType) -> Result<()> {
        self.commit(|db| {
            db.current_view = view;
            ((), Some(StoreEvent::UiChanged))
        })
    }

    pub fn set_selected_task(&mut self, id: Option<String>) -> Result<()> {
        self.commit(|db| {
            db.selected_task_id = id;
            ((), Some(StoreEvent::UiChanged))
        })
    }

    pub fn set_selected_project(&mut self, id: Option<String>) -> Result<()> {
        self.commit(|db| {
            db.selected_project_id = id;
            ((), Some(StoreEvent::UiChanged))
        })
    }

    pub fn set_filters(&mut self, filters: FilterOptions) -> Result<()> {
        self.commit(|db| {
            db.filters = filters;
            ((), Some(StoreEvent::UiChanged))
        })
    }

    pub fn toggle_quick_add(&mut self) -> Result<()> {
        self.commit(|db| {
            db.is_quick_add_open = !db.is_quick_add_open;
            ((), Some(StoreEvent::UiChanged))
        })
    }

    pub fn toggle_sidebar(&mut self) -> Result<()> {
        self.commit(|db| {
            db.is_sidebar_open = !db.is_sidebar_open;
            ((), Some(StoreEvent::UiChanged))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Priority, Status};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, TaskStore) {
        let dir = TempDir::new().unwrap();
        let store = TaskStore::open(&dir.path().join("taskflow-storage.json"));
        (dir, store)
    }

    fn drain(rx: &Receiver<StoreEvent>) -> Vec<StoreEvent> {
        rx.try_iter().collect()
    }

    #[test]
    fn every_mutation_is_persisted() {
        let (_dir, mut store) = open_store();
        let id = store
            .add_task(NewTask {
                title: "Pay rent".into(),
                priority: Priority::High,
                created_by: "user1".into(),
                ..Default::default()
            })
            .unwrap();
        store.toggle_task_complete(&id).unwrap();
        store.set_current_view(ViewType::Today).unwrap();

        let reopened = TaskStore::open(store.path());
        assert_eq!(reopened.state(), store.state());
        assert_eq!(reopened.state().get(&id).unwrap().status, Status::Completed);
        assert_eq!(reopened.state().current_view, ViewType::Today);
    }

    #[test]
    fn subscribers_hear_each_applied_mutation() {
        let (_dir, mut store) = open_store();
        let rx = store.subscribe();
        let id = store
            .add_task(NewTask { title: "a".into(), created_by: "user1".into(), ..Default::default() })
            .unwrap();
        store.toggle_task_complete(&id).unwrap();
        store.toggle_sidebar().unwrap();
        assert_eq!(
            drain(&rx),
            vec![
                StoreEvent::TaskCreated(id.clone()),
                StoreEvent::TaskUpdated(id),
                StoreEvent::UiChanged,
            ]
        );
    }

    #[test]
    fn unknown_ids_neither_write_nor_notify() {
        let (_dir, mut store) = open_store();
        let rx = store.subscribe();
        let before = store.state().clone();

        store
            .update_task("task-missing", TaskPatch { title: Some("x".into()), ..Default::default() })
            .unwrap();
        store.delete_task("task-missing").unwrap();
        store.toggle_task_complete("task-missing").unwrap();
        assert_eq!(store.delete_project("nope").unwrap(), 0);
        store.delete_tag("nope").unwrap();

        assert_eq!(store.state(), &before);
        assert!(drain(&rx).is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let (_dir, mut store) = open_store();
        let rx = store.subscribe();
        drop(rx);
        let kept = store.subscribe();
        store.toggle_quick_add().unwrap();
        assert_eq!(store.subscribers.len(), 1);
        assert_eq!(drain(&kept), vec![StoreEvent::UiChanged]);
        assert!(store.state().is_quick_add_open);
    }

    #[test]
    fn delete_project_reports_cascade() {
        let (_dir, mut store) = open_store();
        let rx = store.subscribe();
        store
            .add_task(NewTask {
                title: "Standup".into(),
                project_id: Some("2".into()),
                created_by: "user1".into(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(store.delete_project("2").unwrap(), 1);
        assert!(store.state().tasks.is_empty());
        let events = drain(&rx);
        assert_eq!(
            events.last(),
            Some(&StoreEvent::ProjectDeleted { id: "2".into(), tasks_removed: 1 })
        );
    }

    #[test]
    fn failed_save_leaves_state_untouched() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let mut store = TaskStore::open(&blocker.join("taskflow-storage.json"));
        let rx = store.subscribe();
        let before = store.state().clone();

        let added = store.add_task(NewTask { title: "lost".into(), ..Default::default() });
        assert!(matches!(added, Err(crate::error::Error::Io(_))));
        assert!(store.toggle_sidebar().is_err());

        assert_eq!(store.state(), &before);
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn ui_setters_replace_state() {
        let (_dir, mut store) = open_store();
        store.set_selected_project(Some("1".into())).unwrap();
        store.set_selected_task(Some("task-x".into())).unwrap();
        store
            .set_filters(FilterOptions { priority: vec![Priority::High], ..Default::default() })
            .unwrap();
        store.toggle_sidebar().unwrap();

        let state = store.state();
        assert_eq!(state.selected_project_id.as_deref(), Some("1"));
        assert_eq!(state.selected_task_id.as_deref(), Some("task-x"));
        assert_eq!(state.filters.priority, vec![Priority::High]);
        assert!(!state.is_sidebar_open);
    }
}
