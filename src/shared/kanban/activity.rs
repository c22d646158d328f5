//! Activity log entries
//!
//! Every successful mutation appends one entry to its board's log. Entries
//! about a card also carry the card id so the card's own history can be
//! read back; they outlive the card itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::shared::error::SharedError;

pub const DEFAULT_ACTIVITY_LIMIT: i64 = 50;
pub const MAX_ACTIVITY_LIMIT: i64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    BoardCreated,
    BoardUpdated,
    MemberAdded,
    MemberRemoved,
    ListCreated,
    ListUpdated,
    ListArchived,
    ListUnarchived,
    ListMoved,
    ListDeleted,
    CardCreated,
    CardUpdated,
    CardArchived,
    CardMoved,
    CardDeleted,
    CardAssigned,
    CardUnassigned,
    CommentAdded,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BoardCreated => "board_created",
            Self::BoardUpdated => "board_updated",
            Self::MemberAdded => "member_added",
            Self::MemberRemoved => "member_removed",
            Self::ListCreated => "list_created",
            Self::ListUpdated => "list_updated",
            Self::ListArchived => "list_archived",
            Self::ListUnarchived => "list_unarchived",
            Self::ListMoved => "list_moved",
            Self::ListDeleted => "list_deleted",
            Self::CardCreated => "card_created",
            Self::CardUpdated => "card_updated",
            Self::CardArchived => "card_archived",
            Self::CardMoved => "card_moved",
            Self::CardDeleted => "card_deleted",
            Self::CardAssigned => "card_assigned",
            Self::CardUnassigned => "card_unassigned",
            Self::CommentAdded => "comment_added",
        }
    }

    /// Sentence shown in the activity feed
    pub fn describe(&self) -> &'static str {
        match self {
            Self::BoardCreated => "created the board",
            Self::BoardUpdated => "updated the board",
            Self::MemberAdded => "added a member to the board",
            Self::MemberRemoved => "removed a member from the board",
            Self::ListCreated => "added a list to the board",
            Self::ListUpdated => "updated a list",
            Self::ListArchived => "archived a list",
            Self::ListUnarchived => "unarchived a list",
            Self::ListMoved => "moved a list",
            Self::ListDeleted => "deleted a list",
            Self::CardCreated => "created this card",
            Self::CardUpdated => "updated the card",
            Self::CardArchived => "archived this card",
            Self::CardMoved => "moved this card",
            Self::CardDeleted => "deleted a card",
            Self::CardAssigned => "assigned a member to this card",
            Self::CardUnassigned => "unassigned a member from this card",
            Self::CommentAdded => "commented on this card",
        }
    }
}

impl FromStr for ActivityAction {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| SharedError::validation("action", format!("Unknown activity action '{}'", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Uuid,
    pub board_id: Uuid,
    pub card_id: Option<Uuid>,
    pub actor_id: Uuid,
    pub action: ActivityAction,
    /// Action-specific fields, e.g. the changed field names of an update
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Activity {
    pub fn new(
        board_id: Uuid,
        card_id: Option<Uuid>,
        actor_id: Uuid,
        action: ActivityAction,
        details: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            board_id,
            card_id,
            actor_id,
            action,
            details,
            created_at: Utc::now(),
        }
    }
}

/// Clamp a requested feed length to `1..=MAX_ACTIVITY_LIMIT`
pub fn activity_limit(requested: Option<&str>) -> Result<i64, SharedError> {
    match requested {
        None => Ok(DEFAULT_ACTIVITY_LIMIT),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map(|limit| limit.clamp(1, MAX_ACTIVITY_LIMIT))
            .map_err(|_| SharedError::validation("limit", "Limit must be a number")),
    }
}
