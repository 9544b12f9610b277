//! Quick-add modal form.
//!
//! Holds the transient form state (title, due text, priority, project and
//! tag picks) and turns it into a `NewTask` on submit. Nothing here is
//! persisted; the store only sees the finished task.

use chrono::{DateTime, TimeZone};
use crossterm::event::{KeyCode, KeyEvent};

use crate::db::Database;
use crate::fields::{Priority, Status};
use crate::task::NewTask;
use crate::tui::enums::{FormAction, QuickAddField};
use crate::tui::input::InputField;
use crate::util::parse_due_input;

const PRIORITIES: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

pub struct QuickAddForm {
    pub title: InputField,
    pub due: InputField,
    pub priority: Priority,
    /// Index into `[no project] + db.projects`.
    pub project: usize,
    /// Selected tag ids, in the order they were picked.
    pub tags: Vec<String>,
    /// Highlighted tag in the tag row.
    pub tag_cursor: usize,
    pub field: QuickAddField,
    pub error: Option<String>,
}

impl Default for QuickAddForm {
    fn default() -> Self {
        Self {
            title: InputField::new(),
            due: InputField::new(),
            priority: Priority::Medium,
            project: 0,
            tags: Vec::new(),
            tag_cursor: 0,
            field: QuickAddField::Title,
            error: None,
        }
    }
}

impl QuickAddForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to an empty form.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn cycle_priority(&mut self, forward: bool) {
        let pos = PRIORITIES.iter().position(|p| *p == self.priority).unwrap_or(1);
        let next = if forward { pos + 1 } else { pos + PRIORITIES.len() - 1 };
        self.priority = PRIORITIES[next % PRIORITIES.len()];
    }

    fn cycle_project(&mut self, forward: bool, db: &Database) {
        let options = db.projects.len() + 1;
        self.project = if forward {
            (self.project + 1) % options
        } else {
            (self.project + options - 1) % options
        };
    }

    fn toggle_tag(&mut self, db: &Database) {
        let Some(tag) = db.tags.get(self.tag_cursor) else {
            return;
        };
        if let Some(pos) = self.tags.iter().position(|t| *t == tag.id) {
            self.tags.remove(pos);
        } else {
            self.tags.push(tag.id.clone());
        }
    }

    /// Selected project id, if the picked entry still exists.
    pub fn project_id(&self, db: &Database) -> Option<String> {
        self.project
            .checked_sub(1)
            .and_then(|i| db.projects.get(i))
            .map(|p| p.id.clone())
    }

    /// Apply a key press to the focused field.
    pub fn handle_key(&mut self, key: KeyEvent, db: &Database) -> FormAction {
        match key.code {
            KeyCode::Enter => return FormAction::Submit,
            KeyCode::Tab | KeyCode::Down => self.field = self.field.next(),
            KeyCode::BackTab | KeyCode::Up => self.field = self.field.prev(),
            code => match self.field {
                QuickAddField::Title | QuickAddField::Due => {
                    let input = if self.field == QuickAddField::Title {
                        &mut self.title
                    } else {
                        &mut self.due
                    };
                    match code {
                        KeyCode::Char(c) => input.handle_char(c),
                        KeyCode::Backspace => input.handle_backspace(),
                        KeyCode::Delete => input.handle_delete(),
                        KeyCode::Left => input.move_cursor_left(),
                        KeyCode::Right => input.move_cursor_right(),
                        KeyCode::Home => input.move_home(),
                        KeyCode::End => input.move_end(),
                        _ => {}
                    }
                }
                QuickAddField::Priority => match code {
                    KeyCode::Left => self.cycle_priority(false),
                    KeyCode::Right | KeyCode::Char(' ') => self.cycle_priority(true),
                    _ => {}
                },
                QuickAddField::Project => match code {
                    KeyCode::Left => self.cycle_project(false, db),
                    KeyCode::Right | KeyCode::Char(' ') => self.cycle_project(true, db),
                    _ => {}
                },
                QuickAddField::Tags => match code {
                    KeyCode::Left => self.tag_cursor = self.tag_cursor.saturating_sub(1),
                    KeyCode::Right => {
                        if self.tag_cursor + 1 < db.tags.len() {
                            self.tag_cursor += 1;
                        }
                    }
                    KeyCode::Char(' ') => self.toggle_tag(db),
                    _ => {}
                },
            },
        }
        FormAction::None
    }

    /// Build the task to create. `Ok(None)` for a blank title, `Err` with a
    /// message when the due text cannot be understood.
    pub fn build<Tz: TimeZone>(
        &self,
        db: &Database,
        user_id: &str,
        now: &DateTime<Tz>,
    ) -> Result<Option<NewTask>, String> {
        let title = self.title.value.trim();
        if title.is_empty() {
            return Ok(None);
        }
        let due_text = self.due.value.trim();
        let due_at = if due_text.is_empty() {
            None
        } else {
            Some(parse_due_input(due_text, now).ok_or_else(|| format!("Unrecognised due date '{}'", due_text))?)
        };
        let tags = self
            .tags
            .iter()
            .filter(|id| db.tag(id).is_some())
            .cloned()
            .collect();

        Ok(Some(NewTask {
            project_id: self.project_id(db),
            title: title.to_string(),
            due_at,
            priority: self.priority,
            status: Status::Todo,
            order_index: 0,
            created_by: user_id.to_string(),
            tags,
            ..Default::default()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(form: &mut QuickAddForm, db: &Database, text: &str) {
        for c in text.chars() {
            form.handle_key(key(KeyCode::Char(c)), db);
        }
    }

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2026, 5, 4, 9, 0, 0).unwrap()
    }

    #[test]
    fn blank_title_builds_nothing() {
        let db = Database::seeded(Utc::now());
        let mut form = QuickAddForm::new();
        type_text(&mut form, &db, "   ");
        assert!(matches!(form.build(&db, "user1", &now()), Ok(None)));
    }

    #[test]
    fn fields_feed_the_new_task() {
        let db = Database::seeded(Utc::now());
        let mut form = QuickAddForm::new();
        type_text(&mut form, &db, " Pay rent ");
        form.handle_key(key(KeyCode::Tab), &db);
        type_text(&mut form, &db, "today 18:00");
        form.handle_key(key(KeyCode::Tab), &db);
        form.handle_key(key(KeyCode::Right), &db);
        form.handle_key(key(KeyCode::Tab), &db);
        form.handle_key(key(KeyCode::Right), &db);
        form.handle_key(key(KeyCode::Right), &db);
        form.handle_key(key(KeyCode::Tab), &db);
        form.handle_key(key(KeyCode::Right), &db);
        form.handle_key(key(KeyCode::Char(' ')), &db);
        assert_eq!(form.handle_key(key(KeyCode::Enter), &db), FormAction::Submit);

        let task = form.build(&db, "user1", &now()).unwrap().unwrap();
        assert_eq!(task.title, "Pay rent");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.project_id.as_deref(), Some("2"));
        assert_eq!(task.tags, vec!["2"]);
        assert_eq!(task.due_at, Some(Utc.with_ymd_and_hms(2026, 5, 4, 18, 0, 0).unwrap()));
        assert_eq!(task.status, Status::Todo);
    }

    #[test]
    fn bad_due_text_is_reported() {
        let db = Database::seeded(Utc::now());
        let mut form = QuickAddForm::new();
        type_text(&mut form, &db, "Call mom");
        form.handle_key(key(KeyCode::Tab), &db);
        type_text(&mut form, &db, "someday");
        assert!(form.build(&db, "user1", &now()).is_err());

        form.due.clear();
        type_text(&mut form, &db, "in 99999999999d");
        assert!(form.build(&db, "user1", &now()).is_err());
    }

    #[test]
    fn project_cycle_wraps_to_no_project() {
        let db = Database::seeded(Utc::now());
        let mut form = QuickAddForm::new();
        form.field = QuickAddField::Project;
        form.handle_key(key(KeyCode::Left), &db);
        assert_eq!(form.project_id(&db).as_deref(), Some("2"));
        form.handle_key(key(KeyCode::Right), &db);
        assert_eq!(form.project_id(&db), None);
    }
}
