//! Enumerations for TUI state management.

use crate::fields::ViewType;

/// Which pane receives navigation keys.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Focus {
    Tasks,
    Sidebar,
}

/// One selectable row of the sidebar.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SidebarEntry {
    View(ViewType),
    Project(String),
    Tag(String),
}

/// Fields of the quick-add modal, in tab order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum QuickAddField {
    Title,
    Due,
    Priority,
    Project,
    Tags,
}

impl QuickAddField {
    const ORDER: [QuickAddField; 5] = [
        QuickAddField::Title,
        QuickAddField::Due,
        QuickAddField::Priority,
        QuickAddField::Project,
        QuickAddField::Tags,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// What the quick-add form wants the app to do after a key press.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FormAction {
    None,
    Submit,
}
