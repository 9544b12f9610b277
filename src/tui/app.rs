//! Main application logic for the terminal user interface.
//!
//! `App` is the dashboard: a sidebar of views, projects and tags, the task
//! list for the current view, a detail pane for the selected task and the
//! quick-add modal. All persistent state lives in the [`TaskStore`]; the app
//! keeps only the highlighted row, the search text and the form fields, and
//! re-derives the visible list whenever the store reports a change.

use std::sync::mpsc::Receiver;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::{trace, warn};

use crate::error::Result;
use crate::fields::*;
use crate::store::{StoreEvent, TaskStore};
use crate::task::Task;
use crate::tui::{
    colors::{hex_color, priority_color, DESTRUCTIVE, INDIGO, MUTED},
    enums::{Focus, FormAction, QuickAddField, SidebarEntry},
    input::InputField,
    quick_add::QuickAddForm,
    utils::centered_rect,
};
use crate::util::{format_due_relative, format_priority, format_status, tag_names};
use crate::view::{count_for_view, derive_view, is_overdue, open_count_for_project, DayBounds};

const SIDEBAR_VIEWS: [ViewType; 3] = [ViewType::Inbox, ViewType::Today, ViewType::Upcoming];

/// Main application state for the terminal user interface.
pub struct App {
    store: TaskStore,
    events: Receiver<StoreEvent>,
    user_id: String,
    /// Ids of the tasks currently listed, in display order.
    visible: Vec<String>,
    list_state: ListState,
    search: InputField,
    search_active: bool,
    quick_add: QuickAddForm,
    focus: Focus,
    sidebar_state: ListState,
    status_message: String,
}

impl App {
    pub fn new(mut store: TaskStore, user_id: String) -> Self {
        let events = store.subscribe();
        let mut app = App {
            store,
            events,
            user_id,
            visible: Vec::new(),
            list_state: ListState::default(),
            search: InputField::new(),
            search_active: false,
            quick_add: QuickAddForm::new(),
            focus: Focus::Tasks,
            sidebar_state: ListState::default().with_selected(Some(0)),
            status_message: String::new(),
        };
        app.refresh();
        app
    }

    fn highlighted_id(&self) -> Option<String> {
        self.list_state
            .selected()
            .and_then(|i| self.visible.get(i))
            .cloned()
    }

    fn sidebar_entries(&self) -> Vec<SidebarEntry> {
        let db = self.store.state();
        SIDEBAR_VIEWS
            .iter()
            .map(|v| SidebarEntry::View(*v))
            .chain(db.projects.iter().map(|p| SidebarEntry::Project(p.id.clone())))
            .chain(db.tags.iter().map(|t| SidebarEntry::Tag(t.id.clone())))
            .collect()
    }

    /// Re-derive the visible list, keeping the highlighted task if it is
    /// still listed.
    fn refresh(&mut self) {
        let highlighted = self.highlighted_id();
        let previous = self.list_state.selected();

        let db = self.store.state();
        let bounds = DayBounds::local_now();
        let mut shown = derive_view(&db.tasks, db.current_view, &self.search.value, &bounds);
        shown.retain(|t| db.filters.matches(t));
        self.visible = shown.iter().map(|t| t.id.clone()).collect();

        let index = highlighted
            .and_then(|id| self.visible.iter().position(|v| *v == id))
            .or(previous)
            .map(|i| i.min(self.visible.len().saturating_sub(1)))
            .unwrap_or(0);
        self.list_state
            .select(if self.visible.is_empty() { None } else { Some(index) });

        let entries = self.sidebar_entries().len();
        let sidebar = self.sidebar_state.selected().unwrap_or(0);
        self.sidebar_state
            .select(Some(sidebar.min(entries.saturating_sub(1))));
    }

    fn drain_events(&mut self) {
        for event in self.events.try_iter() {
            trace!(?event, "dashboard saw store event");
        }
        self.refresh();
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    /// Handle one key press. Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        if key.kind == KeyEventKind::Release {
            return Ok(false);
        }
        self.status_message.clear();
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        let quit = if ctrl && key.code == KeyCode::Char('k') {
            self.toggle_quick_add()?;
            false
        } else if self.store.state().is_quick_add_open {
            self.handle_quick_add_key(key)?;
            false
        } else if self.search_active {
            self.handle_search_key(key);
            false
        } else {
            match self.focus {
                Focus::Tasks => self.handle_task_key(key)?,
                Focus::Sidebar => self.handle_sidebar_key(key)?,
            }
        };

        self.drain_events();
        Ok(quit)
    }

    /// Handle a key for the event loop. Store failures are shown in the
    /// status bar and the session keeps going. Returns true to quit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        match self.handle_key(key) {
            Ok(quit) => quit,
            Err(e) => {
                warn!(error = %e, "key action failed");
                self.set_status_message(format!("Error: {}", e));
                self.drain_events();
                false
            }
        }
    }

    fn toggle_quick_add(&mut self) -> Result<()> {
        if !self.store.state().is_quick_add_open {
            self.quick_add.reset();
        }
        self.store.toggle_quick_add()
    }

    fn handle_quick_add_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.code == KeyCode::Esc {
            return self.store.toggle_quick_add();
        }
        if self.quick_add.handle_key(key, self.store.state()) == FormAction::Submit {
            self.submit_quick_add()?;
        }
        Ok(())
    }

    fn submit_quick_add(&mut self) -> Result<()> {
        let now = Local::now();
        match self.quick_add.build(self.store.state(), &self.user_id, &now) {
            Ok(Some(new)) => {
                let title = new.title.clone();
                self.store.add_task(new)?;
                self.store.toggle_quick_add()?;
                self.quick_add.reset();
                self.set_status_message(format!("Added '{}'", title));
            }
            Ok(None) => self.quick_add.error = Some("A title is required".into()),
            Err(msg) => self.quick_add.error = Some(msg),
        }
        Ok(())
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.search_active = false;
                self.search.clear();
            }
            KeyCode::Enter => self.search_active = false,
            KeyCode::Char(c) => self.search.handle_char(c),
            KeyCode::Backspace => self.search.handle_backspace(),
            KeyCode::Delete => self.search.handle_delete(),
            KeyCode::Left => self.search.move_cursor_left(),
            KeyCode::Right => self.search.move_cursor_right(),
            KeyCode::Home => self.search.move_home(),
            KeyCode::End => self.search.move_end(),
            _ => {}
        }
    }

    fn select_view(&mut self, n: char) -> Result<()> {
        let Some(view) = n
            .to_digit(10)
            .and_then(|d| (d as usize).checked_sub(1))
            .and_then(|i| ViewType::ALL.get(i).copied())
        else {
            return Ok(());
        };
        self.store.set_current_view(view)
    }

    fn move_selection(&mut self, forward: bool) {
        if self.visible.is_empty() {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        let next = if forward {
            (current + 1).min(self.visible.len() - 1)
        } else {
            current.saturating_sub(1)
        };
        self.list_state.select(Some(next));
    }

    /// Swap the highlighted task with its neighbour and persist the new order
    /// of the visible list.
    fn move_highlighted(&mut self, forward: bool) -> Result<()> {
        let Some(index) = self.list_state.selected() else {
            return Ok(());
        };
        let target = if forward { index + 1 } else { index.wrapping_sub(1) };
        if target >= self.visible.len() {
            return Ok(());
        }
        let mut ids = self.visible.clone();
        ids.swap(index, target);
        self.store.reorder_tasks(&ids)
    }

    fn handle_task_key(&mut self, key: KeyEvent) -> Result<bool> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return Ok(true),
            KeyCode::Char('b') if ctrl => self.store.toggle_sidebar()?,
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(true),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(false),
            KeyCode::Char('J') => self.move_highlighted(true)?,
            KeyCode::Char('K') => self.move_highlighted(false)?,
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                if let Some(id) = self.highlighted_id() {
                    self.store.toggle_task_complete(&id)?;
                }
            }
            KeyCode::Enter => {
                if let Some(id) = self.highlighted_id() {
                    let already = self.store.state().selected_task_id.as_deref() == Some(id.as_str());
                    self.store
                        .set_selected_task(if already { None } else { Some(id) })?;
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.highlighted_id() {
                    let title = self.store.state().get(&id).map(|t| t.title.clone());
                    self.store.delete_task(&id)?;
                    if let Some(title) = title {
                        self.set_status_message(format!("Deleted '{}'", title));
                    }
                }
            }
            KeyCode::Char('/') => self.search_active = true,
            KeyCode::Char('n') => self.toggle_quick_add()?,
            KeyCode::Tab => {
                if self.store.state().is_sidebar_open {
                    self.focus = Focus::Sidebar;
                }
            }
            KeyCode::Esc => {
                if !self.search.is_empty() {
                    self.search.clear();
                } else if self.store.state().selected_task_id.is_some() {
                    self.store.set_selected_task(None)?;
                }
            }
            KeyCode::Char(c @ '1'..='5') => self.select_view(c)?,
            _ => {}
        }
        Ok(false)
    }

    fn handle_sidebar_key(&mut self, key: KeyEvent) -> Result<bool> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let entries = self.sidebar_entries();
        match key.code {
            KeyCode::Char('c') if ctrl => return Ok(true),
            KeyCode::Char('b') if ctrl => {
                self.store.toggle_sidebar()?;
                self.focus = Focus::Tasks;
            }
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('j') | KeyCode::Down => {
                let i = self.sidebar_state.selected().unwrap_or(0);
                self.sidebar_state
                    .select(Some((i + 1).min(entries.len().saturating_sub(1))));
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let i = self.sidebar_state.selected().unwrap_or(0);
                self.sidebar_state.select(Some(i.saturating_sub(1)));
            }
            KeyCode::Tab | KeyCode::Esc => self.focus = Focus::Tasks,
            KeyCode::Enter => {
                if let Some(entry) = self.sidebar_state.selected().and_then(|i| entries.get(i)) {
                    self.activate(entry.clone())?;
                }
            }
            KeyCode::Char(c @ '1'..='5') => self.select_view(c)?,
            _ => {}
        }
        Ok(false)
    }

    fn activate(&mut self, entry: SidebarEntry) -> Result<()> {
        match entry {
            SidebarEntry::View(view) => self.store.set_current_view(view),
            SidebarEntry::Project(id) => {
                self.store.set_selected_project(Some(id))?;
                self.store.set_current_view(ViewType::Project)
            }
            SidebarEntry::Tag(id) => {
                let mut filters = self.store.state().filters.clone();
                if let Some(pos) = filters.tags.iter().position(|t| *t == id) {
                    filters.tags.remove(pos);
                } else {
                    filters.tags.push(id);
                }
                self.store.set_filters(filters)
            }
        }
    }

    // ---- rendering ---------------------------------------------------------

    fn render_sidebar(&mut self, f: &mut Frame, area: Rect, bounds: &DayBounds) {
        let db = self.store.state();
        let items: Vec<ListItem> = self
            .sidebar_entries()
            .into_iter()
            .map(|entry| {
                let line = match entry {
                    SidebarEntry::View(view) => {
                        let count = count_for_view(&db.tasks, view, bounds);
                        let style = if db.current_view == view {
                            Style::default().add_modifier(Modifier::BOLD)
                        } else {
                            Style::default()
                        };
                        Line::from(vec![
                            Span::styled(format!("{:<20}", view.title()), style),
                            Span::styled(
                                if count > 0 { count.to_string() } else { String::new() },
                                Style::default().fg(MUTED),
                            ),
                        ])
                    }
                    SidebarEntry::Project(id) => match db.project(&id) {
                        Some(p) => {
                            let active = db.current_view == ViewType::Project
                                && db.selected_project_id.as_deref() == Some(p.id.as_str());
                            let mut label = Style::default();
                            if active {
                                label = label.add_modifier(Modifier::BOLD);
                            }
                            Line::from(vec![
                                Span::styled("● ", Style::default().fg(hex_color(&p.color))),
                                Span::styled(
                                    format!("{} {:<15}", p.icon.as_deref().unwrap_or(" "), p.title),
                                    label,
                                ),
                                Span::styled(
                                    open_count_for_project(&db.tasks, &p.id).to_string(),
                                    Style::default().fg(MUTED),
                                ),
                            ])
                        }
                        None => Line::from(""),
                    },
                    SidebarEntry::Tag(id) => match db.tag(&id) {
                        Some(t) => {
                            let mut style = Style::default().fg(hex_color(&t.color));
                            if db.filters.tags.contains(&t.id) {
                                style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
                            }
                            Line::from(Span::styled(format!("# {}", t.name), style))
                        }
                        None => Line::from(""),
                    },
                };
                ListItem::new(line)
            })
            .collect();

        let border = if self.focus == Focus::Sidebar { INDIGO } else { Color::DarkGray };
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border))
                    .title(Span::styled("TaskFlow", Style::default().add_modifier(Modifier::BOLD))),
            )
            .highlight_style(if self.focus == Focus::Sidebar {
                Style::default().bg(Color::Gray).fg(Color::Black)
            } else {
                Style::default()
            });
        f.render_stateful_widget(list, area, &mut self.sidebar_state);
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let db = self.store.state();
        let title = match db.current_view {
            ViewType::Project => db
                .selected_project_id
                .as_deref()
                .and_then(|id| db.project(id))
                .map(|p| p.title.clone())
                .unwrap_or_else(|| ViewType::Project.title().to_string()),
            view => view.title().to_string(),
        };

        let mut search_style = Style::default().fg(MUTED);
        if self.search_active {
            search_style = Style::default().fg(Color::White);
        }
        let search = if self.search.is_empty() && !self.search_active {
            "/ Search...".to_string()
        } else {
            format!("/ {}", self.search.value)
        };

        let mut filter_note = String::new();
        if !db.filters.is_empty() {
            filter_note = "  [filtered]".to_string();
        }

        let text = vec![
            Line::from(vec![
                Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(filter_note, Style::default().fg(INDIGO)),
            ]),
            Line::from(Span::styled(
                Local::now().format("%A, %B %-d").to_string(),
                Style::default().fg(MUTED),
            )),
            Line::from(Span::styled(search, search_style)),
        ];
        f.render_widget(
            Paragraph::new(text).block(Block::default().borders(Borders::BOTTOM)),
            area,
        );
    }

    fn task_card(&self, task: &Task, bounds: &DayBounds) -> ListItem<'static> {
        let db = self.store.state();
        let now = Local::now();
        let done = task.is_completed();

        let mut title_style = Style::default();
        if done {
            title_style = title_style.fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT);
        }
        let mut first = vec![Span::raw(if done { "[x] " } else { "[ ] " })];
        if let Some(color) = priority_color(task.priority) {
            first.push(Span::styled("● ", Style::default().fg(color)));
        }
        first.push(Span::styled(task.title.clone(), title_style));

        let mut meta = Vec::new();
        if task.due_at.is_some() {
            let style = if is_overdue(task, bounds) {
                Style::default().fg(DESTRUCTIVE)
            } else {
                Style::default().fg(MUTED)
            };
            meta.push(Span::styled(format_due_relative(task.due_at, &now), style));
        }
        if let Some(project) = task.project_id.as_deref().and_then(|id| db.project(id)) {
            meta.push(Span::styled(
                format!("  {}", project.title),
                Style::default().fg(hex_color(&project.color)),
            ));
        }
        for name in tag_names(db, task) {
            meta.push(Span::styled(format!("  #{}", name), Style::default().fg(MUTED)));
        }
        if !task.subtasks.is_empty() {
            let finished = task.subtasks.iter().filter(|s| s.is_done).count();
            meta.push(Span::styled(
                format!("  {}/{}", finished, task.subtasks.len()),
                Style::default().fg(MUTED),
            ));
        }

        let mut lines = vec![Line::from(first)];
        if !meta.is_empty() {
            meta.insert(0, Span::raw("    "));
            lines.push(Line::from(meta));
        }
        ListItem::new(lines)
    }

    fn render_tasks(&mut self, f: &mut Frame, area: Rect, bounds: &DayBounds) {
        let border = if self.focus == Focus::Tasks { INDIGO } else { Color::DarkGray };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(format!("Tasks ({})", self.visible.len()));

        if self.visible.is_empty() {
            let empty = Paragraph::new("No tasks found.")
                .style(Style::default().fg(MUTED))
                .alignment(Alignment::Center)
                .block(block);
            f.render_widget(empty, area);
            return;
        }

        let db = self.store.state();
        let items: Vec<ListItem> = self
            .visible
            .iter()
            .filter_map(|id| db.get(id))
            .map(|task| self.task_card(task, bounds))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::Rgb(40, 40, 60)))
            .highlight_symbol("▌");
        f.render_stateful_widget(list, area, &mut self.list_state);
    }

    fn render_detail(&self, f: &mut Frame, area: Rect, task: &Task) {
        let db = self.store.state();
        let stamp = |at: chrono::DateTime<chrono::Utc>| {
            at.with_timezone(&Local).format("%a %b %-d %Y %H:%M").to_string()
        };
        let label = |s: &'static str| Span::styled(format!("{:<11}", s), Style::default().fg(MUTED));

        let mut lines = vec![
            Line::from(Span::styled(task.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from(vec![label("Status"), Span::raw(format_status(task.status))]),
            Line::from(vec![label("Priority"), Span::raw(format_priority(task.priority))]),
            Line::from(vec![
                label("Due"),
                Span::raw(task.due_at.map(stamp).unwrap_or_else(|| "-".into())),
            ]),
            Line::from(vec![
                label("Project"),
                Span::raw(
                    task.project_id
                        .as_deref()
                        .and_then(|id| db.project(id))
                        .map(|p| p.title.clone())
                        .unwrap_or_else(|| "-".into()),
                ),
            ]),
        ];
        let tags = tag_names(db, task);
        if !tags.is_empty() {
            lines.push(Line::from(vec![label("Tags"), Span::raw(tags.join(", "))]));
        }
        if let Some(rule) = &task.recurrence_rule {
            lines.push(Line::from(vec![label("Repeats"), Span::raw(rule.clone())]));
        }
        if let Some(assignee) = &task.assigned_to {
            lines.push(Line::from(vec![label("Assignee"), Span::raw(assignee.clone())]));
        }
        if let Some(done) = task.completed_at {
            lines.push(Line::from(vec![label("Completed"), Span::raw(stamp(done))]));
        }
        if let Some(desc) = &task.description {
            lines.push(Line::from(""));
            lines.push(Line::from(desc.clone()));
        }
        if !task.subtasks.is_empty() {
            lines.push(Line::from(""));
            for sub in &task.subtasks {
                let mark = if sub.is_done { "[x]" } else { "[ ]" };
                lines.push(Line::from(format!("{} {}", mark, sub.title)));
            }
        }

        let detail = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Details"));
        f.render_widget(detail, area);
    }

    fn render_quick_add(&self, f: &mut Frame) {
        let db = self.store.state();
        let area = centered_rect(60, 50, f.area());
        f.render_widget(Clear, area);

        let form = &self.quick_add;
        let focused = |field: QuickAddField| {
            if form.field == field {
                Style::default().fg(INDIGO).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(MUTED)
            }
        };

        let project = form
            .project_id(db)
            .and_then(|id| db.project(&id))
            .map(|p| format!("{} {}", p.icon.as_deref().unwrap_or(""), p.title))
            .unwrap_or_else(|| "Inbox".into());

        let mut tag_spans = vec![Span::styled("Tags      ", focused(QuickAddField::Tags))];
        for (i, tag) in db.tags.iter().enumerate() {
            let mut style = Style::default().fg(hex_color(&tag.color));
            if form.tags.contains(&tag.id) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            if form.field == QuickAddField::Tags && form.tag_cursor == i {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            tag_spans.push(Span::styled(format!("#{}", tag.name), style));
            tag_spans.push(Span::raw(" "));
        }

        let title_placeholder = if form.title.is_empty() {
            Span::styled("What needs to be done?", Style::default().fg(Color::DarkGray))
        } else {
            Span::raw(form.title.value.clone())
        };

        let mut lines = vec![
            Line::from(vec![Span::styled("Title     ", focused(QuickAddField::Title)), title_placeholder]),
            Line::from(vec![
                Span::styled("Due       ", focused(QuickAddField::Due)),
                Span::raw(form.due.value.clone()),
            ]),
            Line::from(vec![
                Span::styled("Priority  ", focused(QuickAddField::Priority)),
                Span::styled(
                    format_priority(form.priority),
                    Style::default().fg(priority_color(form.priority).unwrap_or(Color::White)),
                ),
            ]),
            Line::from(vec![Span::styled("Project   ", focused(QuickAddField::Project)), Span::raw(project)]),
            Line::from(tag_spans),
            Line::from(""),
        ];
        if let Some(err) = &form.error {
            lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(DESTRUCTIVE))));
        }
        lines.push(Line::from(Span::styled(
            "Tab next field  ←/→ change  Space pick tag  Enter add  Esc cancel",
            Style::default().fg(MUTED),
        )));

        let modal = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(INDIGO))
                .title("Quick add"),
        );
        f.render_widget(modal, area);

        let cursor = match form.field {
            QuickAddField::Title => Some((0, form.title.cursor)),
            QuickAddField::Due => Some((1, form.due.cursor)),
            _ => None,
        };
        if let Some((row, col)) = cursor {
            f.set_cursor_position((area.x + 11 + col as u16, area.y + 1 + row));
        }
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if self.search_active {
            "Type to search  Enter keep  Esc clear".to_string()
        } else {
            "^K add  j/k move  Space done  J/K reorder  Enter details  / search  d delete  ^B sidebar  q quit"
                .to_string()
        };
        f.render_widget(
            Paragraph::new(text).style(Style::default().bg(INDIGO).fg(Color::White)),
            area,
        );
    }

    /// Draw the whole dashboard.
    pub fn render(&mut self, f: &mut Frame) {
        let bounds = DayBounds::local_now();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        let main = if self.store.state().is_sidebar_open {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(30), Constraint::Min(0)])
                .split(rows[0]);
            self.render_sidebar(f, cols[0], &bounds);
            cols[1]
        } else {
            rows[0]
        };

        let body = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(main);
        self.render_header(f, body[0]);

        let selected = self
            .store
            .state()
            .selected_task_id
            .as_deref()
            .and_then(|id| self.store.state().get(id))
            .cloned();
        match selected {
            Some(task) => {
                let cols = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                    .split(body[1]);
                self.render_tasks(f, cols[0], &bounds);
                self.render_detail(f, cols[1], &task);
            }
            None => self.render_tasks(f, body[1], &bounds),
        }

        self.render_status_bar(f, rows[1]);

        if self.store.state().is_quick_add_open {
            self.render_quick_add(f);
        }
    }

    /// Main event loop. Redraws on every key and on each idle tick so the
    /// date-based views follow the clock.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if event::poll(Duration::from_millis(500))? {
                if let Event::Key(key) = event::read()? {
                    if self.on_key(key) {
                        break;
                    }
                }
            } else {
                self.refresh();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::NewTask;
    use pretty_assertions::assert_eq;
    use ratatui::backend::TestBackend;
    use tempfile::TempDir;

    fn app() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let store = TaskStore::open(&dir.path().join("taskflow-storage.json"));
        (dir, App::new(store, "user1".into()))
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    fn ctrl(app: &mut App, c: char) -> bool {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
            .unwrap()
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn visible_titles(app: &App) -> Vec<String> {
        app.visible
            .iter()
            .filter_map(|id| app.store.state().get(id))
            .map(|t| t.title.clone())
            .collect()
    }

    #[test]
    fn ctrl_k_opens_and_escape_closes_quick_add() {
        let (_dir, mut app) = app();
        assert!(!app.store.state().is_quick_add_open);
        ctrl(&mut app, 'k');
        assert!(app.store.state().is_quick_add_open);
        press(&mut app, KeyCode::Esc);
        assert!(!app.store.state().is_quick_add_open);
        ctrl(&mut app, 'k');
        ctrl(&mut app, 'k');
        assert!(!app.store.state().is_quick_add_open);
    }

    #[test]
    fn quick_add_creates_task_and_closes() {
        let (_dir, mut app) = app();
        ctrl(&mut app, 'k');
        type_text(&mut app, "Buy milk");
        press(&mut app, KeyCode::Enter);

        assert!(!app.store.state().is_quick_add_open);
        assert_eq!(visible_titles(&app), vec!["Buy milk"]);
        let task = &app.store.state().tasks[0];
        assert_eq!(task.created_by, "user1");
        assert_eq!(task.priority, Priority::Medium);
    }

    #[test]
    fn blank_title_creates_nothing() {
        let (_dir, mut app) = app();
        ctrl(&mut app, 'k');
        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);
        assert!(app.store.state().tasks.is_empty());
        assert!(app.store.state().is_quick_add_open);
        assert!(app.quick_add.error.is_some());
    }

    #[test]
    fn typing_q_in_quick_add_does_not_quit() {
        let (_dir, mut app) = app();
        ctrl(&mut app, 'k');
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.quick_add.title.value, "q");
    }

    #[test]
    fn completing_a_task_drops_it_from_inbox() {
        let (_dir, mut app) = app();
        ctrl(&mut app, 'k');
        type_text(&mut app, "Call mom");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.visible.len(), 1);

        press(&mut app, KeyCode::Char(' '));
        assert!(app.visible.is_empty());
        assert_eq!(app.store.state().tasks[0].status, Status::Completed);
    }

    #[test]
    fn shift_j_moves_task_down() {
        let dir = TempDir::new().unwrap();
        let mut store = TaskStore::open(&dir.path().join("s.json"));
        for title in ["A", "B", "C"] {
            store
                .add_task(NewTask { title: title.into(), ..Default::default() })
                .unwrap();
        }
        let mut app = App::new(store, "user1".into());
        assert_eq!(visible_titles(&app), vec!["A", "B", "C"]);

        press(&mut app, KeyCode::Char('J'));
        assert_eq!(visible_titles(&app), vec!["B", "A", "C"]);
        assert_eq!(app.list_state.selected(), Some(1));

        press(&mut app, KeyCode::Char('K'));
        assert_eq!(visible_titles(&app), vec!["A", "B", "C"]);
    }

    #[test]
    fn search_narrows_and_escape_clears() {
        let dir = TempDir::new().unwrap();
        let mut store = TaskStore::open(&dir.path().join("s.json"));
        for title in ["Groceries", "Dentist"] {
            store
                .add_task(NewTask { title: title.into(), ..Default::default() })
                .unwrap();
        }
        let mut app = App::new(store, "user1".into());
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "groc");
        assert_eq!(visible_titles(&app), vec!["Groceries"]);
        press(&mut app, KeyCode::Esc);
        assert_eq!(visible_titles(&app).len(), 2);
    }

    #[test]
    fn sidebar_enter_selects_project_view() {
        let (_dir, mut app) = app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Sidebar);
        for _ in 0..3 {
            press(&mut app, KeyCode::Char('j'));
        }
        press(&mut app, KeyCode::Enter);
        let db = app.store.state();
        assert_eq!(db.current_view, ViewType::Project);
        assert_eq!(db.selected_project_id.as_deref(), Some("1"));
    }

    #[test]
    fn number_keys_switch_views() {
        let (_dir, mut app) = app();
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.store.state().current_view, ViewType::Upcoming);
        press(&mut app, KeyCode::Char('9'));
        assert_eq!(app.store.state().current_view, ViewType::Upcoming);
    }

    #[test]
    fn write_errors_stay_in_the_status_bar() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let store = TaskStore::open(&blocker.join("s.json"));
        let mut app = App::new(store, "user1".into());

        let quit = app.on_key(KeyEvent::new(KeyCode::Char('k'), KeyModifiers::CONTROL));
        assert!(!quit);
        assert!(app.status_message.starts_with("Error:"));
        assert!(!app.store.state().is_quick_add_open);

        assert!(app.on_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
    }

    #[test]
    fn renders_dashboard_and_modal() {
        let (_dir, mut app) = app();
        let mut terminal = Terminal::new(TestBackend::new(120, 32)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("TaskFlow"));
        assert!(screen.contains("No tasks found."));
        assert!(screen.contains("Personal"));

        ctrl(&mut app, 'k');
        terminal.draw(|f| app.render(f)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("Quick add"));
    }
}
