//! Card comments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::{validate_length, SharedError};

pub const MAX_COMMENT_TEXT: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub card_id: Uuid,
    /// Denormalized from the card so board deletes can cascade
    pub board_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(card_id: Uuid, board_id: Uuid, author_id: Uuid, text: &str) -> Result<Self, SharedError> {
        let text = validate_length("text", text, 1, MAX_COMMENT_TEXT, "Comment")?;
        Ok(Self {
            id: Uuid::new_v4(),
            card_id,
            board_id,
            author_id,
            text,
            created_at: Utc::now(),
        })
    }
}
