//! Parsing, formatting and lookup helpers shared by the CLI and the TUI.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::fields::*;
use crate::project::Project;
use crate::tag::Tag;
use crate::task::Task;
use crate::view::{is_overdue, DayBounds};

/// Parse human-readable due input into an instant.
///
/// Accepts RFC 3339 timestamps, or a date expression optionally followed by
/// `HH:MM` (local time; midnight when omitted). Date expressions:
/// - "today", "tomorrow", "yesterday"
/// - "monday".."sunday", "next friday", "this friday", "weekend"
/// - "end of week" / "eow", "end of month" / "eom"
/// - "in 3d", "in 2w", "in 1m"
/// - "YYYY-MM-DD"
///
/// A bare `HH:MM` means today at that time. Dates outside chrono's range
/// are rejected rather than wrapped.
pub fn parse_due_input<Tz: TimeZone>(s: &str, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
    parse_due_detail(s, now).map(|(at, _)| at)
}

/// Like [`parse_due_input`], also reporting whether the input named a time
/// of day (an `HH:MM` part or a full RFC 3339 timestamp).
pub fn parse_due_detail<Tz: TimeZone>(s: &str, now: &DateTime<Tz>) -> Option<(DateTime<Utc>, bool)> {
    let raw = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some((dt.with_timezone(&Utc), true));
    }
    let lowered = raw.to_lowercase();
    let today = now.date_naive();

    let (date_part, time) = match lowered.rsplit_once(' ') {
        Some((rest, last)) => match NaiveTime::parse_from_str(last, "%H:%M") {
            Ok(t) => (rest.trim().to_string(), Some(t)),
            Err(_) => (lowered.clone(), None),
        },
        None => match NaiveTime::parse_from_str(&lowered, "%H:%M") {
            Ok(t) => ("today".to_string(), Some(t)),
            Err(_) => (lowered.clone(), None),
        },
    };

    let date = parse_date_expr(&date_part, today)?;
    let at = now
        .timezone()
        .from_local_datetime(&date.and_time(time.unwrap_or_default()))
        .earliest()?;
    Some((at.with_timezone(&Utc), time.is_some()))
}

/// `date` moved by `days`, or `None` past the representable range.
fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::try_days(days)?)
}

fn parse_date_expr(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    match s {
        "today" => return Some(today),
        "tomorrow" => return shift_days(today, 1),
        "yesterday" => return shift_days(today, -1),
        "end of week" | "eow" => {
            let weekday = today.weekday().num_days_from_monday() as i64;
            return shift_days(today, 6 - weekday);
        }
        "end of month" | "eom" => {
            let (year, month) = if today.month() == 12 {
                (today.year().checked_add(1)?, 1)
            } else {
                (today.year(), today.month() + 1)
            };
            let first_of_next = NaiveDate::from_ymd_opt(year, month, 1)?;
            return first_of_next.pred_opt();
        }
        "this weekend" | "weekend" => {
            let days_until_saturday = (5 + 7 - today.weekday().num_days_from_monday()) % 7;
            return shift_days(today, days_until_saturday as i64);
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        let amount = |suffix: char| rest.strip_suffix(suffix).and_then(|n| n.trim().parse::<i64>().ok());
        if let Some(days) = amount('d') {
            return shift_days(today, days);
        }
        if let Some(weeks) = amount('w') {
            return shift_days(today, weeks.checked_mul(7)?);
        }
        if let Some(months) = amount('m') {
            // Approximate: 30 days per month
            return shift_days(today, months.checked_mul(30)?);
        }
        return None;
    }

    let weekdays = [
        ("monday", 0), ("tuesday", 1), ("wednesday", 2), ("thursday", 3),
        ("friday", 4), ("saturday", 5), ("sunday", 6),
        ("mon", 0), ("tue", 1), ("wed", 2), ("thu", 3),
        ("fri", 4), ("sat", 5), ("sun", 6),
    ];
    let current = today.weekday().num_days_from_monday() as i64;
    for (name, target) in weekdays {
        let days_ahead = (target + 7 - current) % 7;
        if s == name || s == format!("this {}", name) {
            return shift_days(today, days_ahead);
        }
        if s == format!("next {}", name) {
            let add = if days_ahead == 0 { 7 } else { days_ahead + 7 };
            return shift_days(today, add);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Format a due instant relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative<Tz: TimeZone>(due: Option<DateTime<Utc>>, now: &DateTime<Tz>) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let delta = d.with_timezone(&now.timezone()).date_naive() - now.date_naive();
            match delta.num_days() {
                0 => "today".into(),
                1 => "tomorrow".into(),
                n if n > 1 => format!("in {}d", n),
                n => format!("{}d late", -n),
            }
        }
    }
}

pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::Low => "Low",
        Priority::Medium => "Medium",
        Priority::High => "High",
    }
}

pub fn format_status(s: Status) -> &'static str {
    match s {
        Status::Todo => "Todo",
        Status::InProgress => "InProgress",
        Status::Completed => "Completed",
    }
}

/// Shorten generated ids for display: `task-3f2a9c01…` becomes `task-3f2a9c01`.
pub fn short_id(id: &str) -> &str {
    match id.split_once('-') {
        Some((prefix, rest)) if rest.len() > 8 => id.get(..prefix.len() + 1 + 8).unwrap_or(id),
        _ => id,
    }
}

/// Truncate a string to a maximum width, adding an ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// Names of the tags on `task`, skipping ids that no longer resolve.
pub fn tag_names(db: &Database, task: &Task) -> Vec<String> {
    task.tags
        .iter()
        .filter_map(|id| db.tag(id))
        .map(|t| t.name.clone())
        .collect()
}

/// Print tasks in a formatted table.
pub fn print_table<Tz: TimeZone>(db: &Database, tasks: &[&Task], now: &DateTime<Tz>) {
    let bounds = DayBounds::containing(now);
    println!(
        "{:<14} {:<10} {:<7} {:<10} {:<12} {}",
        "ID", "Status", "Pri", "Due", "Project", "Title [tags]"
    );
    for t in tasks {
        let tags = tag_names(db, t);
        let tags = if tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", tags.iter().map(|n| format!("#{}", n)).collect::<Vec<_>>().join(" "))
        };
        let mut due = format_due_relative(t.due_at, now);
        if is_overdue(t, &bounds) {
            due.push('!');
        }
        let project = t
            .project_id
            .as_deref()
            .and_then(|id| db.project(id))
            .map(|p| p.title.clone())
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<14} {:<10} {:<7} {:<10} {:<12} {}{}",
            short_id(&t.id),
            format_status(t.status),
            format_priority(t.priority),
            due,
            truncate(&project, 12),
            t.title,
            tags
        );
    }
}

/// Resolve a task by id, unique id prefix, or case-insensitive title.
pub fn resolve_task<'a>(db: &'a Database, ident: &str) -> Result<&'a Task> {
    resolve("Task", ident, &db.tasks, |t| &t.id, |t| &t.title)
}

/// Resolve a project by id, unique id prefix, or case-insensitive title.
pub fn resolve_project<'a>(db: &'a Database, ident: &str) -> Result<&'a Project> {
    resolve("Project", ident, &db.projects, |p| &p.id, |p| &p.title)
}

/// Resolve a tag by id, unique id prefix, or case-insensitive name.
pub fn resolve_tag<'a>(db: &'a Database, ident: &str) -> Result<&'a Tag> {
    resolve("Tag", ident, &db.tags, |t| &t.id, |t| &t.name)
}

fn resolve<'a, T>(
    kind: &'static str,
    ident: &str,
    items: &'a [T],
    id_of: impl Fn(&T) -> &String,
    name_of: impl Fn(&T) -> &String,
) -> Result<&'a T> {
    let ident = ident.trim().trim_start_matches('#');
    if let Some(item) = items.iter().find(|i| id_of(*i) == ident) {
        return Ok(item);
    }

    let by_prefix: Vec<&T> = items.iter().filter(|i| id_of(*i).starts_with(ident)).collect();
    let candidates = if by_prefix.is_empty() {
        let lowered = ident.to_lowercase();
        items
            .iter()
            .filter(|i| name_of(*i).to_lowercase() == lowered)
            .collect()
    } else {
        by_prefix
    };

    match candidates.as_slice() {
        [] => Err(Error::not_found(kind, ident)),
        [one] => Ok(*one),
        many => Err(Error::Ambiguous {
            kind,
            ident: ident.to_string(),
            matches: many
                .iter()
                .map(|i| format!("{} ({})", short_id(id_of(*i)), name_of(*i)))
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}
