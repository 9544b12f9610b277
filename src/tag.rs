//! Tags are free-form labels attached to tasks by id.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub color: String,
}

/// Creation payload for a tag.
#[derive(Debug, Clone, Default)]
pub struct NewTag {
    pub user_id: String,
    pub name: String,
    pub color: String,
}

/// The three tags every fresh store starts with.
pub fn seed_tags() -> Vec<Tag> {
    let seed = |id: &str, name: &str, color: &str| Tag {
        id: id.to_string(),
        user_id: "user1".to_string(),
        name: name.to_string(),
        color: color.to_string(),
    };
    vec![
        seed("1", "Important", "#ef4444"),
        seed("2", "Urgent", "#f59e0b"),
        seed("3", "Later", "#3b82f6"),
    ]
}
