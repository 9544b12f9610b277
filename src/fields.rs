//! Enumerations and field types for task management.
//!
//! Priorities, statuses and the dashboard view selector. All of them
//! serialise in kebab-case so snapshots read naturally (`in-progress`).

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Task importance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Task completion status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Completed,
}

/// Which slice of the task list the dashboard is showing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ViewType {
    #[default]
    Inbox,
    Today,
    Upcoming,
    Project,
    Calendar,
}

impl ViewType {
    /// Every view in sidebar order.
    pub const ALL: [ViewType; 5] = [
        ViewType::Inbox,
        ViewType::Today,
        ViewType::Upcoming,
        ViewType::Project,
        ViewType::Calendar,
    ];

    /// Heading shown above the task list.
    pub fn title(self) -> &'static str {
        match self {
            ViewType::Inbox => "Inbox",
            ViewType::Today => "Today",
            ViewType::Upcoming => "Upcoming",
            ViewType::Project => "Project",
            ViewType::Calendar => "Calendar",
        }
    }
}
