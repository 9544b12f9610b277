//! View derivation: which tasks a view shows, and in what order.
//!
//! Everything here is a pure function of the task list, the view, the
//! search text and the local day boundaries, so callers recompute on every
//! change instead of caching.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::*;
use crate::task::Task;

/// Start of the current local day and start of the next one, as instants.
/// `today` is the half-open interval `[start_of_today, start_of_tomorrow)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBounds {
    pub start_of_today: DateTime<Utc>,
    pub start_of_tomorrow: DateTime<Utc>,
}

impl DayBounds {
    /// Bounds of the calendar day containing `now`, in `now`'s time zone.
    pub fn containing<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();
        DayBounds {
            start_of_today: start_of_day(&tz, today),
            start_of_tomorrow: start_of_day(&tz, today + Duration::days(1)),
        }
    }

    /// Bounds of the current day on this machine's clock.
    pub fn local_now() -> Self {
        Self::containing(&Local::now())
    }

    pub fn is_today(&self, at: DateTime<Utc>) -> bool {
        at >= self.start_of_today && at < self.start_of_tomorrow
    }
}

/// First valid instant of `date` in `tz`. Zones that skip midnight on a DST
/// change start the day at the first hour that exists.
fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::default());
    (0..=2)
        .find_map(|h| tz.from_local_datetime(&(midnight + Duration::hours(h))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Whether `task` belongs in `view`, ignoring search.
pub fn matches_view(task: &Task, view: ViewType, bounds: &DayBounds) -> bool {
    match view {
        ViewType::Inbox => task.project_id.is_none() && !task.is_completed(),
        ViewType::Today => {
            !task.is_completed() && task.due_at.is_some_and(|due| bounds.is_today(due))
        }
        ViewType::Upcoming => {
            !task.is_completed() && task.due_at.is_some_and(|due| due >= bounds.start_of_tomorrow)
        }
        ViewType::Project | ViewType::Calendar => true,
    }
}

/// Case-insensitive substring match on title or description.
pub fn matches_search(task: &Task, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    task.title.to_lowercase().contains(&needle)
        || task
            .description
            .as_ref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
}

/// The ordered list of tasks shown for `view` with `query` typed into search.
pub fn derive_view<'a>(
    tasks: &'a [Task],
    view: ViewType,
    query: &str,
    bounds: &DayBounds,
) -> Vec<&'a Task> {
    let mut shown: Vec<&Task> = tasks
        .iter()
        .filter(|t| matches_view(t, view, bounds))
        .filter(|t| matches_search(t, query))
        .collect();
    sort_for_display(&mut shown);
    shown
}

/// Order by `order_index`; within a run of equal indices, dated tasks are
/// sorted by due date among the positions they occupy while undated tasks
/// stay where they were.
pub fn sort_for_display(tasks: &mut [&Task]) {
    tasks.sort_by_key(|t| t.order_index);
    let mut start = 0;
    while start < tasks.len() {
        let key = tasks[start].order_index;
        let len = tasks[start..].iter().take_while(|t| t.order_index == key).count();
        let group = &mut tasks[start..start + len];

        let slots: Vec<usize> = (0..group.len()).filter(|&i| group[i].due_at.is_some()).collect();
        let mut dated: Vec<&Task> = slots.iter().map(|&i| group[i]).collect();
        dated.sort_by_key(|t| t.due_at);
        for (slot, task) in slots.into_iter().zip(dated) {
            group[slot] = task;
        }

        start += len;
    }
}

/// Badge count for a view in the sidebar.
pub fn count_for_view(tasks: &[Task], view: ViewType, bounds: &DayBounds) -> usize {
    tasks.iter().filter(|t| matches_view(t, view, bounds)).count()
}

/// Number of open tasks in a project.
pub fn open_count_for_project(tasks: &[Task], project_id: &str) -> usize {
    tasks
        .iter()
        .filter(|t| t.project_id.as_deref() == Some(project_id) && !t.is_completed())
        .count()
}

/// Due before today and still open.
pub fn is_overdue(task: &Task, bounds: &DayBounds) -> bool {
    !task.is_completed() && task.due_at.is_some_and(|due| due < bounds.start_of_today)
}

/// Inclusive due-date window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Extra narrowing stored alongside the current view. Every non-empty
/// criterion must match; the tag criterion matches any listed tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub priority: Vec<Priority>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status: Vec<Status>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl FilterOptions {
    pub fn is_empty(&self) -> bool {
        self.priority.is_empty()
            && self.status.is_empty()
            && self.tags.is_empty()
            && self.date_range.is_none()
            && self.search.as_deref().map_or(true, str::is_empty)
    }

    pub fn matches(&self, task: &Task) -> bool {
        if !self.priority.is_empty() && !self.priority.contains(&task.priority) {
            return false;
        }
        if !self.status.is_empty() && !self.status.contains(&task.status) {
            return false;
        }
        if !self.tags.is_empty() && !task.tags.iter().any(|t| self.tags.contains(t)) {
            return false;
        }
        if let Some(range) = &self.date_range {
            match task.due_at {
                Some(due) if due >= range.start && due <= range.end => {}
                _ => return false,
            }
        }
        if let Some(q) = &self.search {
            if !matches_search(task, q) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use pretty_assertions::assert_eq;

    fn tz() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    /// 2026-05-04 10:30 at UTC+2.
    fn bounds() -> DayBounds {
        DayBounds::containing(&tz().with_ymd_and_hms(2026, 5, 4, 10, 30, 0).unwrap())
    }

    fn local(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        tz().with_ymd_and_hms(2026, 5, d, h, m, 0).unwrap().with_timezone(&Utc)
    }

    fn task(id: &str, title: &str) -> Task {
        let at = local(1, 8, 0);
        Task {
            id: id.into(),
            project_id: None,
            title: title.into(),
            description: None,
            due_at: None,
            priority: Priority::Medium,
            status: Status::Todo,
            order_index: 0,
            recurrence_rule: None,
            created_by: "user1".into(),
            assigned_to: None,
            completed_at: None,
            created_at: at,
            updated_at: at,
            tags: vec![],
            subtasks: vec![],
        }
    }

    fn due(mut t: Task, at: DateTime<Utc>) -> Task {
        t.due_at = Some(at);
        t
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn day_bounds_follow_the_local_calendar() {
        let b = bounds();
        assert_eq!(b.start_of_today, local(4, 0, 0));
        assert_eq!(b.start_of_tomorrow, local(5, 0, 0));
        assert_eq!(b.start_of_today.to_rfc3339(), "2026-05-03T22:00:00+00:00");
    }

    #[test]
    fn boundary_task_is_upcoming_not_today() {
        let tasks = vec![due(task("edge", "Edge"), local(5, 0, 0))];
        assert!(derive_view(&tasks, ViewType::Today, "", &bounds()).is_empty());
        assert_eq!(ids(&derive_view(&tasks, ViewType::Upcoming, "", &bounds())), vec!["edge"]);
    }

    #[test]
    fn start_of_today_is_today() {
        let tasks = vec![due(task("a", "A"), local(4, 0, 0))];
        assert_eq!(ids(&derive_view(&tasks, ViewType::Today, "", &bounds())), vec!["a"]);
        assert!(derive_view(&tasks, ViewType::Upcoming, "", &bounds()).is_empty());
    }

    #[test]
    fn completed_tasks_never_show_in_date_views() {
        let mut done = due(task("done", "Done"), local(4, 12, 0));
        done.status = Status::Completed;
        done.completed_at = Some(local(4, 9, 0));
        let mut later = due(task("later", "Later"), local(9, 12, 0));
        later.status = Status::Completed;
        let tasks = vec![done, later];
        for view in [ViewType::Inbox, ViewType::Today, ViewType::Upcoming] {
            assert!(derive_view(&tasks, view, "", &bounds()).is_empty(), "{view:?}");
        }
        assert_eq!(derive_view(&tasks, ViewType::Calendar, "", &bounds()).len(), 2);
    }

    #[test]
    fn inbox_ignores_due_dates_but_excludes_projects() {
        let rent = due(task("rent", "Pay rent"), local(4, 18, 0));
        let mut work = task("work", "Standup");
        work.project_id = Some("2".into());
        let tasks = vec![rent, work];
        assert_eq!(ids(&derive_view(&tasks, ViewType::Inbox, "", &bounds())), vec!["rent"]);
        assert_eq!(ids(&derive_view(&tasks, ViewType::Today, "", &bounds())), vec!["rent"]);
        assert_eq!(derive_view(&tasks, ViewType::Project, "", &bounds()).len(), 2);
    }

    #[test]
    fn search_is_case_insensitive_on_title_or_description() {
        let mut notes = task("notes", "Weekly review");
        notes.description = Some("pick up GROCERIES on the way".into());
        let tasks = vec![task("buy", "Buy groceries"), task("call", "Call mom"), notes];
        let shown = derive_view(&tasks, ViewType::Inbox, "Groceries", &bounds());
        assert_eq!(ids(&shown), vec!["buy", "notes"]);
    }

    #[test]
    fn sort_by_order_index_then_due() {
        let mut a = due(task("a", "A"), local(6, 9, 0));
        a.order_index = 1;
        let b = due(task("b", "B"), local(8, 9, 0));
        let c = task("c", "C");
        let d = due(task("d", "D"), local(7, 9, 0));
        let tasks = vec![a, b, c, d];
        let shown = derive_view(&tasks, ViewType::Calendar, "", &bounds());
        assert_eq!(ids(&shown), vec!["d", "c", "b", "a"]);
    }

    #[test]
    fn undated_ties_keep_encounter_order() {
        let tasks = vec![task("x", "X"), task("y", "Y"), task("z", "Z")];
        let shown = derive_view(&tasks, ViewType::Inbox, "", &bounds());
        assert_eq!(ids(&shown), vec!["x", "y", "z"]);
    }

    #[test]
    fn counts_and_overdue() {
        let old = due(task("old", "Old"), local(2, 9, 0));
        let today = due(task("today", "Today"), local(4, 20, 0));
        let mut proj = due(task("proj", "Proj"), local(10, 9, 0));
        proj.project_id = Some("1".into());
        let tasks = vec![old, today, proj];
        let b = bounds();
        assert_eq!(count_for_view(&tasks, ViewType::Inbox, &b), 2);
        assert_eq!(count_for_view(&tasks, ViewType::Today, &b), 1);
        assert_eq!(count_for_view(&tasks, ViewType::Upcoming, &b), 1);
        assert_eq!(open_count_for_project(&tasks, "1"), 1);
        assert!(is_overdue(&tasks[0], &b));
        assert!(!is_overdue(&tasks[1], &b));
    }

    #[test]
    fn filter_options_require_every_criterion() {
        let mut t = due(task("a", "Pay rent"), local(4, 18, 0));
        t.priority = Priority::High;
        t.tags = vec!["1".into()];

        assert!(FilterOptions::default().is_empty());
        assert!(FilterOptions::default().matches(&t));

        let f = FilterOptions {
            priority: vec![Priority::High],
            tags: vec!["1".into(), "3".into()],
            date_range: Some(DateRange { start: local(4, 0, 0), end: local(4, 18, 0) }),
            ..Default::default()
        };
        assert!(f.matches(&t));

        let f = FilterOptions { status: vec![Status::Completed], ..Default::default() };
        assert!(!f.matches(&t));

        let f = FilterOptions { search: Some("mom".into()), ..Default::default() };
        assert!(!f.matches(&t));
    }
}
