/**
 * Real-time Board Events
 *
 * Every successful mutation of a board, one of its lists or one of its
 * cards produces a `BoardEvent`. Events are scoped to a board: subscribers
 * only ever see events for the board they subscribed to.
 *
 * Move events carry enough information for a client to resynchronize
 * without a full re-fetch: the moved member, old and new positions, and
 * the new ordered id list of every container the move touched.
 */
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::kanban::ContainerOrdering;

/// Type of board event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ListCreated,
    ListUpdated,
    ListArchived,
    ListMoved,
    ListDeleted,
    CardCreated,
    CardUpdated,
    CardArchived,
    CardMoved,
    CardDeleted,
    BoardUpdated,
    BoardDeleted,
    MemberAdded,
    MemberRemoved,
    CardMemberAssigned,
    CardMemberUnassigned,
    CommentAdded,
    FavoriteToggled,
}

impl EventType {
    pub const ALL: [EventType; 18] = [
        Self::ListCreated,
        Self::ListUpdated,
        Self::ListArchived,
        Self::ListMoved,
        Self::ListDeleted,
        Self::CardCreated,
        Self::CardUpdated,
        Self::CardArchived,
        Self::CardMoved,
        Self::CardDeleted,
        Self::BoardUpdated,
        Self::BoardDeleted,
        Self::MemberAdded,
        Self::MemberRemoved,
        Self::CardMemberAssigned,
        Self::CardMemberUnassigned,
        Self::CommentAdded,
        Self::FavoriteToggled,
    ];

    /// Wire name, also used as the SSE `event:` field
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListCreated => "list_created",
            Self::ListUpdated => "list_updated",
            Self::ListArchived => "list_archived",
            Self::ListMoved => "list_moved",
            Self::ListDeleted => "list_deleted",
            Self::CardCreated => "card_created",
            Self::CardUpdated => "card_updated",
            Self::CardArchived => "card_archived",
            Self::CardMoved => "card_moved",
            Self::CardDeleted => "card_deleted",
            Self::BoardUpdated => "board_updated",
            Self::BoardDeleted => "board_deleted",
            Self::MemberAdded => "member_added",
            Self::MemberRemoved => "member_removed",
            Self::CardMemberAssigned => "card_member_assigned",
            Self::CardMemberUnassigned => "card_member_unassigned",
            Self::CommentAdded => "comment_added",
            Self::FavoriteToggled => "favorite_toggled",
        }
    }

    /// Parse a wire name; unknown names yield `None`
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

/// A change on one board, broadcast to that board's subscribers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoardEvent {
    pub event_type: EventType,
    pub board_id: Uuid,
    /// User who caused the change
    pub actor_id: Uuid,
    pub payload: serde_json::Value,
    /// RFC3339
    pub timestamp: String,
}

impl BoardEvent {
    pub fn new(
        event_type: EventType,
        board_id: Uuid,
        actor_id: Uuid,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_type,
            board_id,
            actor_id,
            payload,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Build an event from any serializable payload
    ///
    /// Serialization failures degrade to a `null` payload; the event type and
    /// board still tell subscribers to re-fetch.
    pub fn with_payload<T: Serialize>(
        event_type: EventType,
        board_id: Uuid,
        actor_id: Uuid,
        payload: &T,
    ) -> Self {
        let payload = serde_json::to_value(payload).unwrap_or_else(|e| {
            tracing::warn!("[Realtime] Failed to serialize {} payload: {}", event_type.as_str(), e);
            serde_json::Value::Null
        });
        Self::new(event_type, board_id, actor_id, payload)
    }

    /// Move event for a card or list
    ///
    /// `containers` holds each touched container's member ids in the new
    /// position order.
    pub fn moved(
        event_type: EventType,
        board_id: Uuid,
        actor_id: Uuid,
        member_id: Uuid,
        old_position: i32,
        new_position: i32,
        containers: &[ContainerOrdering],
    ) -> Self {
        Self::new(
            event_type,
            board_id,
            actor_id,
            serde_json::json!({
                "memberId": member_id,
                "oldPosition": old_position,
                "newPosition": new_position,
                "containers": containers,
            }),
        )
    }
}
