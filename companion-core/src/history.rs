//! Translation of the stored transcript into the remote service's turn shape.

use crate::transcript::{Role, Turn};
use serde::{Deserialize, Serialize};

/// Role names the completion service understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    User,
    Model,
}

impl From<Role> for HistoryRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => HistoryRole::User,
            Role::Assistant => HistoryRole::Model,
        }
    }
}

/// One prior turn as sent to the completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: HistoryRole,
    pub parts: Vec<String>,
}

impl HistoryEntry {
    pub fn new(role: HistoryRole, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![text.into()],
        }
    }

    /// The entry's parts joined into one string.
    pub fn text(&self) -> String {
        self.parts.concat()
    }
}

/// Map stored turns to history entries, preserving order and length.
///
/// Each entry carries exactly one part holding the turn content verbatim.
/// Callers pass the transcript without the in-flight message.
pub fn translate(turns: &[Turn]) -> Vec<HistoryEntry> {
    turns
        .iter()
        .map(|turn| HistoryEntry::new(turn.role().into(), turn.content()))
        .collect()
}
