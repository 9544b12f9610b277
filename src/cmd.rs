//! Command implementations for the CLI interface.
//!
//! Each handler resolves the identifiers it was given, calls the matching
//! `TaskStore` operation and prints a short confirmation. Unknown
//! identifiers are reported here; the store itself ignores them.

use std::io;

use chrono::Local;
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fields::*;
use crate::project::{NewProject, ProjectPatch};
use crate::store::TaskStore;
use crate::tag::NewTag;
use crate::task::{NewTask, TaskPatch};
use crate::tui::run::run_tui;
use crate::util::*;
use crate::view::{derive_view, DateRange, DayBounds, FilterOptions};

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive dashboard.
    Ui,

    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Project id or title.
        #[arg(long)]
        project: Option<String>,
        /// Tag id or name. May be repeated; accepts comma-separated.
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Due: "today 18:00", "tomorrow", "fri", "in 3d", YYYY-MM-DD [HH:MM] or RFC 3339.
        #[arg(long)]
        due: Option<String>,
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        #[arg(long, value_enum, default_value_t = Status::Todo)]
        status: Status,
        /// Display order; lower comes first.
        #[arg(long, default_value_t = 0)]
        order: i64,
        /// Recurrence rule, stored as given.
        #[arg(long)]
        recurrence: Option<String>,
        /// Assignee id.
        #[arg(long)]
        assignee: Option<String>,
    },

    /// List the tasks of a view.
    List {
        /// View to list; defaults to the current view.
        #[arg(long, value_enum)]
        view: Option<ViewType>,
        /// Case-insensitive text to find in title or description.
        #[arg(long, short)]
        search: Option<String>,
        /// Only these priorities. May be repeated.
        #[arg(long, value_enum)]
        priority: Vec<Priority>,
        /// Only these statuses. May be repeated.
        #[arg(long, value_enum)]
        status: Vec<Status>,
        /// Only tasks carrying any of these tags.
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Due on or after this date.
        #[arg(long)]
        from: Option<String>,
        /// Due on or before this date.
        #[arg(long)]
        to: Option<String>,
        /// Ignore the saved filters.
        #[arg(long)]
        no_filters: bool,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show a single task by id or title.
    Show {
        id: String,
    },

    /// Update fields on a task.
    Update {
        /// Task id or title to update
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, conflicts_with = "desc")]
        clear_desc: bool,
        #[arg(long)]
        project: Option<String>,
        #[arg(long, conflicts_with = "project")]
        clear_project: bool,
        #[arg(long)]
        due: Option<String>,
        #[arg(long, conflicts_with = "due")]
        clear_due: bool,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long, value_enum)]
        status: Option<Status>,
        #[arg(long)]
        order: Option<i64>,
        #[arg(long)]
        recurrence: Option<String>,
        #[arg(long, conflicts_with = "recurrence")]
        clear_recurrence: bool,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long, conflicts_with = "assignee")]
        clear_assignee: bool,
        /// Add tags. May be repeated and comma-separated.
        #[arg(long = "add-tag")]
        add_tags: Vec<String>,
        /// Remove tags. May be repeated and comma-separated.
        #[arg(long = "rm-tag")]
        rm_tags: Vec<String>,
    },

    /// Toggle a task between completed and todo.
    Toggle {
        id: String,
    },

    /// Delete a task by id or title.
    Delete {
        id: String,
    },

    /// Put tasks in the given order; tasks not named keep their order after them.
    Reorder {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Switch the current view.
    View {
        #[arg(value_enum)]
        view: ViewType,
        /// Select a project (implies the project view).
        #[arg(long)]
        project: Option<String>,
    },

    /// Manage the saved list filters.
    Filter {
        #[command(subcommand)]
        action: FilterAction,
    },

    /// Manage projects.
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Manage tags.
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Manage a task's checklist.
    Subtask {
        #[command(subcommand)]
        action: SubtaskAction,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum FilterAction {
    /// Replace the saved filters.
    Set {
        #[arg(long, value_enum)]
        priority: Vec<Priority>,
        #[arg(long, value_enum)]
        status: Vec<Status>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Remove all saved filters.
    Clear,
    /// Print the saved filters.
    Show,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// List projects with their open task counts.
    List,
    /// Create a project.
    Add {
        title: String,
        #[arg(long, default_value = "#6366f1")]
        color: String,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long)]
        shared: bool,
    },
    /// Update a project.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long, conflicts_with = "icon")]
        clear_icon: bool,
        #[arg(long)]
        shared: Option<bool>,
    },
    /// Delete a project and every task in it.
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum TagAction {
    /// List tags and how many tasks carry each.
    List,
    /// Create a tag.
    Add {
        name: String,
        #[arg(long, default_value = "#3b82f6")]
        color: String,
    },
    /// Delete a tag and remove it from every task.
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum SubtaskAction {
    /// Append a checklist item to a task.
    Add {
        task: String,
        title: String,
    },
    /// Flip a checklist item between done and open.
    Toggle {
        task: String,
        subtask: String,
    },
}

/// Launch the terminal dashboard.
pub fn cmd_ui(store: TaskStore, config: &Config) -> Result<()> {
    run_tui(store, config)
}

/// Split comma-separated inputs into trimmed, non-empty parts.
pub fn split_list(inputs: &[String]) -> Vec<String> {
    inputs
        .iter()
        .flat_map(|raw| raw.split(','))
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

fn resolve_tag_ids(store: &TaskStore, inputs: &[String]) -> Result<Vec<String>> {
    split_list(inputs)
        .iter()
        .map(|ident| resolve_tag(store.state(), ident).map(|t| t.id.clone()))
        .collect()
}

fn parse_due(input: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    parse_due_input(input, &Local::now())
        .ok_or_else(|| Error::InvalidInput(format!("unrecognised due date '{}'", input)))
}

/// Inclusive upper bound for `--to`. A bare date covers that whole day; an
/// explicit time is taken as given.
fn parse_range_end(input: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    let (at, timed) = parse_due_detail(input, &Local::now())
        .ok_or_else(|| Error::InvalidInput(format!("unrecognised due date '{}'", input)))?;
    if timed {
        return Ok(at);
    }
    Ok(chrono::Duration::try_seconds(24 * 60 * 60 - 1)
        .and_then(|rest_of_day| at.checked_add_signed(rest_of_day))
        .unwrap_or(chrono::DateTime::<chrono::Utc>::MAX_UTC))
}

fn build_filters(
    store: &TaskStore,
    priority: Vec<Priority>,
    status: Vec<Status>,
    tags: Vec<String>,
    from: Option<String>,
    to: Option<String>,
    search: Option<String>,
) -> Result<FilterOptions> {
    let date_range = match (from, to) {
        (None, None) => None,
        (from, to) => {
            let start = match from {
                Some(s) => parse_due(&s)?,
                None => chrono::DateTime::<chrono::Utc>::MIN_UTC,
            };
            let end = match to {
                Some(s) => parse_range_end(&s)?,
                None => chrono::DateTime::<chrono::Utc>::MAX_UTC,
            };
            Some(DateRange { start, end })
        }
    };
    Ok(FilterOptions {
        priority,
        status,
        tags: resolve_tag_ids(store, &tags)?,
        date_range,
        search,
    })
}

/// Add a new task.
#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    store: &mut TaskStore,
    config: &Config,
    title: String,
    desc: Option<String>,
    project: Option<String>,
    tags: Vec<String>,
    due: Option<String>,
    priority: Priority,
    status: Status,
    order: i64,
    recurrence: Option<String>,
    assignee: Option<String>,
) -> Result<()> {
    let project_id = match project {
        Some(p) => Some(resolve_project(store.state(), &p)?.id.clone()),
        None => None,
    };
    let tags = resolve_tag_ids(store, &tags)?;
    let due_at = due.as_deref().map(parse_due).transpose()?;

    let id = store.add_task(NewTask {
        project_id,
        title: title.clone(),
        description: desc,
        due_at,
        priority,
        status,
        order_index: order,
        recurrence_rule: recurrence,
        created_by: config.user_id.clone(),
        assigned_to: assignee,
        tags,
        subtasks: Vec::new(),
    })?;
    println!("Added {}: {}", short_id(&id), title);
    Ok(())
}

/// List the tasks of a view, narrowed by search and filter options.
#[allow(clippy::too_many_arguments)]
pub fn cmd_list(
    store: &TaskStore,
    view: Option<ViewType>,
    search: Option<String>,
    priority: Vec<Priority>,
    status: Vec<Status>,
    tags: Vec<String>,
    from: Option<String>,
    to: Option<String>,
    no_filters: bool,
    limit: Option<usize>,
) -> Result<()> {
    let db = store.state();
    let view = view.unwrap_or(db.current_view);
    let flags = build_filters(store, priority, status, tags, from, to, None)?;
    let filters = if !flags.is_empty() {
        flags
    } else if no_filters {
        FilterOptions::default()
    } else {
        db.filters.clone()
    };

    let now = Local::now();
    let bounds = DayBounds::containing(&now);
    let mut shown = derive_view(&db.tasks, view, search.as_deref().unwrap_or(""), &bounds);
    shown.retain(|t| filters.matches(t));
    if let Some(n) = limit {
        shown.truncate(n);
    }

    println!("{} ({})", view.title(), shown.len());
    if shown.is_empty() {
        println!("No tasks found.");
    } else {
        print_table(db, &shown, &now);
    }
    Ok(())
}

/// View detailed information about a specific task.
pub fn cmd_show(store: &TaskStore, id: String) -> Result<()> {
    let db = store.state();
    let t = resolve_task(db, &id)?;
    let now = Local::now();
    let stamp = |at: chrono::DateTime<chrono::Utc>| at.with_timezone(&Local).format("%a %b %-d %Y %H:%M").to_string();

    println!("{}", t.title);
    println!("  id:        {}", t.id);
    println!("  status:    {}", format_status(t.status));
    println!("  priority:  {}", format_priority(t.priority));
    let project = t
        .project_id
        .as_deref()
        .map(|pid| db.project(pid).map(|p| p.title.clone()).unwrap_or_else(|| format!("{} (missing)", pid)))
        .unwrap_or_else(|| "-".into());
    println!("  project:   {}", project);
    match t.due_at {
        Some(due) => println!("  due:       {} ({})", stamp(due), format_due_relative(Some(due), &now)),
        None => println!("  due:       -"),
    }
    let tags = tag_names(db, t);
    if !tags.is_empty() {
        println!("  tags:      {}", tags.iter().map(|n| format!("#{}", n)).collect::<Vec<_>>().join(" "));
    }
    if let Some(rule) = &t.recurrence_rule {
        println!("  repeats:   {}", rule);
    }
    if let Some(who) = &t.assigned_to {
        println!("  assignee:  {}", who);
    }
    println!("  created:   {} by {}", stamp(t.created_at), t.created_by);
    println!("  updated:   {}", stamp(t.updated_at));
    if let Some(done) = t.completed_at {
        println!("  completed: {}", stamp(done));
    }
    if let Some(desc) = &t.description {
        println!();
        for line in desc.lines() {
            println!("  {}", line);
        }
    }
    if !t.subtasks.is_empty() {
        println!();
        let mut subtasks: Vec<_> = t.subtasks.iter().collect();
        subtasks.sort_by_key(|s| s.order_index);
        for s in subtasks {
            println!("  [{}] {} ({})", if s.is_done { "x" } else { " " }, s.title, short_id(&s.id));
        }
    }
    Ok(())
}

/// Update fields on a task.
#[allow(clippy::too_many_arguments)]
pub fn cmd_update(
    store: &mut TaskStore,
    id: String,
    title: Option<String>,
    desc: Option<String>,
    clear_desc: bool,
    project: Option<String>,
    clear_project: bool,
    due: Option<String>,
    clear_due: bool,
    priority: Option<Priority>,
    status: Option<Status>,
    order: Option<i64>,
    recurrence: Option<String>,
    clear_recurrence: bool,
    assignee: Option<String>,
    clear_assignee: bool,
    add_tags: Vec<String>,
    rm_tags: Vec<String>,
) -> Result<()> {
    let task = resolve_task(store.state(), &id)?;
    let task_id = task.id.clone();

    let tags = if add_tags.is_empty() && rm_tags.is_empty() {
        None
    } else {
        let add = resolve_tag_ids(store, &add_tags)?;
        let rm = resolve_tag_ids(store, &rm_tags)?;
        let mut tags: Vec<String> = task.tags.iter().filter(|t| !rm.contains(t)).cloned().collect();
        tags.extend(add);
        Some(tags)
    };

    let project_id = if clear_project {
        Some(None)
    } else {
        match project {
            Some(p) => Some(Some(resolve_project(store.state(), &p)?.id.clone())),
            None => None,
        }
    };
    let due_at = if clear_due {
        Some(None)
    } else {
        due.as_deref().map(parse_due).transpose()?.map(Some)
    };
    let clearable = |clear: bool, value: Option<String>| if clear { Some(None) } else { value.map(Some) };

    let patch = TaskPatch {
        project_id,
        title,
        description: clearable(clear_desc, desc),
        due_at,
        priority,
        status,
        order_index: order,
        recurrence_rule: clearable(clear_recurrence, recurrence),
        assigned_to: clearable(clear_assignee, assignee),
        tags,
    };
    store.update_task(&task_id, patch)?;
    println!("Updated {}", short_id(&task_id));
    Ok(())
}

/// Toggle completion of a task.
pub fn cmd_toggle(store: &mut TaskStore, id: String) -> Result<()> {
    let task_id = resolve_task(store.state(), &id)?.id.clone();
    store.toggle_task_complete(&task_id)?;
    if let Some(t) = store.state().get(&task_id) {
        println!("{} {}", if t.is_completed() { "Completed" } else { "Reopened" }, t.title);
    }
    Ok(())
}

/// Delete a task.
pub fn cmd_delete(store: &mut TaskStore, id: String) -> Result<()> {
    let task = resolve_task(store.state(), &id)?;
    let (task_id, title) = (task.id.clone(), task.title.clone());
    store.delete_task(&task_id)?;
    println!("Deleted {}: {}", short_id(&task_id), title);
    Ok(())
}

/// Reorder tasks. Identifiers that do not resolve are passed through
/// unchanged and skipped by the store.
pub fn cmd_reorder(store: &mut TaskStore, ids: Vec<String>) -> Result<()> {
    let resolved: Vec<String> = ids
        .iter()
        .map(|ident| match resolve_task(store.state(), ident) {
            Ok(t) => t.id.clone(),
            Err(e) => {
                tracing::warn!(error = %e, "reorder: skipping");
                ident.clone()
            }
        })
        .collect();
    store.reorder_tasks(&resolved)?;
    println!("Reordered {} task(s)", resolved.len());
    Ok(())
}

/// Switch the current view, optionally selecting a project.
pub fn cmd_view(store: &mut TaskStore, view: ViewType, project: Option<String>) -> Result<()> {
    match project {
        Some(p) => {
            let project_id = resolve_project(store.state(), &p)?.id.clone();
            store.set_selected_project(Some(project_id))?;
            store.set_current_view(ViewType::Project)?;
        }
        None => store.set_current_view(view)?,
    }
    println!("Current view: {}", store.state().current_view.title());
    Ok(())
}

pub fn cmd_filter(store: &mut TaskStore, action: FilterAction) -> Result<()> {
    match action {
        FilterAction::Set { priority, status, tags, from, to, search } => {
            let filters = build_filters(store, priority, status, tags, from, to, search)?;
            store.set_filters(filters)?;
            println!("Filters saved");
        }
        FilterAction::Clear => {
            store.set_filters(FilterOptions::default())?;
            println!("Filters cleared");
        }
        FilterAction::Show => {
            let filters = &store.state().filters;
            if filters.is_empty() {
                println!("No filters set");
            } else {
                println!("{}", serde_json::to_string_pretty(filters)?);
            }
        }
    }
    Ok(())
}

pub fn cmd_project(store: &mut TaskStore, config: &Config, action: ProjectAction) -> Result<()> {
    match action {
        ProjectAction::List => {
            let db = store.state();
            println!("{:<16} {:<6} {:<9} {}", "ID", "Open", "Color", "Title");
            for p in &db.projects {
                let open = crate::view::open_count_for_project(&db.tasks, &p.id);
                let icon = p.icon.as_deref().map(|i| format!("{} ", i)).unwrap_or_default();
                let shared = if p.is_shared { " (shared)" } else { "" };
                println!("{:<16} {:<6} {:<9} {}{}{}", short_id(&p.id), open, p.color, icon, p.title, shared);
            }
        }
        ProjectAction::Add { title, color, icon, shared } => {
            if title.trim().is_empty() {
                return Err(Error::InvalidInput("project title cannot be empty".into()));
            }
            let id = store.add_project(NewProject {
                user_id: config.user_id.clone(),
                title: title.clone(),
                color,
                icon,
                is_shared: shared,
            })?;
            println!("Added project {}: {}", short_id(&id), title);
        }
        ProjectAction::Update { id, title, color, icon, clear_icon, shared } => {
            let project_id = resolve_project(store.state(), &id)?.id.clone();
            let patch = ProjectPatch {
                title,
                color,
                icon: if clear_icon { Some(None) } else { icon.map(Some) },
                is_shared: shared,
            };
            store.update_project(&project_id, patch)?;
            println!("Updated project {}", short_id(&project_id));
        }
        ProjectAction::Delete { id } => {
            let project = resolve_project(store.state(), &id)?;
            let (project_id, title) = (project.id.clone(), project.title.clone());
            let removed = store.delete_project(&project_id)?;
            println!("Deleted project {} and {} task(s)", title, removed);
        }
    }
    Ok(())
}

pub fn cmd_tag(store: &mut TaskStore, config: &Config, action: TagAction) -> Result<()> {
    match action {
        TagAction::List => {
            let db = store.state();
            println!("{:<16} {:<6} {:<9} {}", "ID", "Tasks", "Color", "Name");
            for tag in &db.tags {
                let count = db.tasks.iter().filter(|t| t.tags.contains(&tag.id)).count();
                println!("{:<16} {:<6} {:<9} #{}", short_id(&tag.id), count, tag.color, tag.name);
            }
        }
        TagAction::Add { name, color } => {
            let name = name.trim().trim_start_matches('#').to_string();
            if name.is_empty() {
                return Err(Error::InvalidInput("tag name cannot be empty".into()));
            }
            let id = store.add_tag(NewTag {
                user_id: config.user_id.clone(),
                name: name.clone(),
                color,
            })?;
            println!("Added tag {}: #{}", short_id(&id), name);
        }
        TagAction::Delete { id } => {
            let tag = resolve_tag(store.state(), &id)?;
            let (tag_id, name) = (tag.id.clone(), tag.name.clone());
            store.delete_tag(&tag_id)?;
            println!("Deleted tag #{}", name);
        }
    }
    Ok(())
}

pub fn cmd_subtask(store: &mut TaskStore, action: SubtaskAction) -> Result<()> {
    match action {
        SubtaskAction::Add { task, title } => {
            let task_id = resolve_task(store.state(), &task)?.id.clone();
            if let Some(id) = store.add_subtask(&task_id, title)? {
                println!("Added subtask {}", short_id(&id));
            }
        }
        SubtaskAction::Toggle { task, subtask } => {
            let t = resolve_task(store.state(), &task)?;
            let task_id = t.id.clone();
            let sub = t
                .subtasks
                .iter()
                .find(|s| s.id == subtask || s.id.starts_with(&subtask) || s.title.eq_ignore_ascii_case(&subtask))
                .ok_or_else(|| Error::not_found("Subtask", subtask.clone()))?;
            let sub_id = sub.id.clone();
            store.toggle_subtask(&task_id, &sub_id)?;
            println!("Toggled subtask {}", short_id(&sub_id));
        }
    }
    Ok(())
}

/// Generate shell completions.
pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "tf", &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clap::Parser;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, TaskStore) {
        let dir = TempDir::new().unwrap();
        let store = TaskStore::open(&dir.path().join("taskflow-storage.json"));
        (dir, store)
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_tags_and_due() {
        let cli = Cli::try_parse_from([
            "tf", "add", "Pay rent", "--due", "today 18:00", "--priority", "high", "--tag", "Important,urgent",
        ])
        .unwrap();
        match cli.command {
            Commands::Add { title, due, priority, tags, .. } => {
                assert_eq!(title, "Pay rent");
                assert_eq!(due.as_deref(), Some("today 18:00"));
                assert_eq!(priority, Priority::High);
                assert_eq!(split_list(&tags), vec!["Important", "urgent"]);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn add_then_update_through_handlers() {
        let (_dir, mut store) = open_store();
        let config = Config::default();
        cmd_add(
            &mut store, &config, "Pay rent".into(), None, None, vec!["important".into()],
            Some("2030-01-02 18:00".into()), Priority::High, Status::Todo, 0, None, None,
        )
        .unwrap();
        let task = store.state().tasks[0].clone();
        assert_eq!(task.tags, vec!["1"]);
        assert_eq!(task.project_id, None);
        assert_eq!(task.created_by, "user1");

        cmd_update(
            &mut store, "pay rent".into(), None, Some("first of month".into()), false,
            Some("Personal".into()), false, None, true, None, None, None, None, false,
            None, false, vec!["Later".into()], vec!["Important".into()],
        )
        .unwrap();
        let task = &store.state().tasks[0];
        assert_eq!(task.description.as_deref(), Some("first of month"));
        assert_eq!(task.project_id.as_deref(), Some("1"));
        assert_eq!(task.due_at, None);
        assert_eq!(task.tags, vec!["3"]);
    }

    #[test]
    fn unknown_task_is_reported_by_the_cli() {
        let (_dir, mut store) = open_store();
        assert!(matches!(cmd_toggle(&mut store, "ghost".into()), Err(Error::NotFound { .. })));
        assert!(matches!(parse_due("whenever"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn date_range_end_widens_only_bare_dates() {
        let (_dir, store) = open_store();
        let range = |to: &str| {
            build_filters(&store, vec![], vec![], vec![], None, Some(to.into()), None)
                .unwrap()
                .date_range
                .unwrap()
        };

        let timed = range("2026-05-04T18:00:00Z");
        assert_eq!(timed.end, chrono::Utc.with_ymd_and_hms(2026, 5, 4, 18, 0, 0).unwrap());

        let bare = range("2026-05-04");
        let midnight = parse_due("2026-05-04").unwrap();
        assert_eq!(bare.end - midnight, chrono::Duration::seconds(24 * 60 * 60 - 1));

        let at_six = range("2026-05-04 18:00");
        assert_eq!(at_six.end, parse_due("2026-05-04 18:00").unwrap());
    }

    #[test]
    fn overflowing_due_is_rejected_not_panicking() {
        let (_dir, mut store) = open_store();
        let config = Config::default();
        let added = cmd_add(
            &mut store, &config, "Far away".into(), None, None, vec![],
            Some("in 99999999999d".into()), Priority::Low, Status::Todo, 0, None, None,
        );
        assert!(matches!(added, Err(Error::InvalidInput(_))));
        assert!(store.state().tasks.is_empty());
        assert!(build_filters(&store, vec![], vec![], vec![], None, Some("in 9223372036854775807w".into()), None).is_err());
    }

    #[test]
    fn view_with_project_selects_it() {
        let (_dir, mut store) = open_store();
        cmd_view(&mut store, ViewType::Inbox, Some("work".into())).unwrap();
        assert_eq!(store.state().current_view, ViewType::Project);
        assert_eq!(store.state().selected_project_id.as_deref(), Some("2"));
    }
}
