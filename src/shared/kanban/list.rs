//! Lists: members of a board, containers of cards

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::card::Card;
use crate::shared::error::{validate_length, SharedError};
use crate::shared::ordering::{Position, Positioned};

pub const MAX_LIST_TITLE: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: Uuid,
    pub title: String,
    pub board_id: Uuid,
    pub position: Position,
    /// Secondary index of card ids, kept in position order
    pub card_ids: Vec<Uuid>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl List {
    /// Create a validated list; the position is assigned by the store
    pub fn new(title: &str, board_id: Uuid) -> Result<Self, SharedError> {
        let title = validate_length("title", title, 1, MAX_LIST_TITLE, "List title")?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            title,
            board_id,
            position: 0,
            card_ids: Vec::new(),
            is_archived: false,
            created_at: now,
            updated_at: now,
        })
    }
}

impl Positioned for List {
    fn member_id(&self) -> Uuid {
        self.id
    }

    fn container_id(&self) -> Uuid {
        self.board_id
    }

    fn position(&self) -> Position {
        self.position
    }

    fn place(&mut self, container_id: Uuid, position: Position) {
        self.board_id = container_id;
        self.position = position;
        self.updated_at = Utc::now();
    }
}

/// A list together with its cards, both in position order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListWithCards {
    #[serde(flatten)]
    pub list: List,
    pub cards: Vec<Card>,
}
