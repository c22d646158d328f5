//! Request and response bodies for the board API
//!
//! Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::activity::Activity;
use super::board::{Board, Role, Visibility, MAX_BOARD_DESCRIPTION, MAX_BOARD_TITLE};
use super::card::{validate_description, Card, Label, Priority, MAX_CARD_TITLE};
use super::comment::Comment;
use super::list::{List, ListWithCards, MAX_LIST_TITLE};
use crate::shared::error::{validate_length, SharedError};
use crate::shared::ordering::{MoveKind, Position};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: Uuid,
    #[serde(default = "default_member_role")]
    pub role: Role,
}

fn default_member_role() -> Role {
    Role::Member
}

/// Which of the caller's boards `GET /api/boards` returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardFilter {
    #[default]
    All,
    Owned,
    /// Boards the caller belongs to without owning
    Member,
    Favorite,
}

impl BoardFilter {
    pub fn matches(&self, board: &Board, user_id: Uuid) -> bool {
        match self {
            Self::All => true,
            Self::Owned => board.is_owner(user_id),
            Self::Member => !board.is_owner(user_id) && board.role_of(user_id).is_some(),
            Self::Favorite => board.is_favorite(user_id),
        }
    }
}

impl std::str::FromStr for BoardFilter {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "all" => Ok(Self::All),
            "owned" => Ok(Self::Owned),
            "member" => Ok(Self::Member),
            "favorite" => Ok(Self::Favorite),
            other => Err(SharedError::validation(
                "filter",
                format!("Unknown board filter '{}'", other),
            )),
        }
    }
}

/// Partial board update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub background: Option<String>,
    pub visibility: Option<Visibility>,
}

impl UpdateBoardRequest {
    /// Validate and apply to `board`, returning the names of changed fields
    pub fn apply_to(&self, board: &mut Board) -> Result<Vec<&'static str>, SharedError> {
        let mut changed = Vec::new();
        if let Some(title) = &self.title {
            board.title = validate_length("title", title, 1, MAX_BOARD_TITLE, "Board title")?;
            changed.push("title");
        }
        if let Some(description) = &self.description {
            board.description = Some(validate_length(
                "description",
                description,
                0,
                MAX_BOARD_DESCRIPTION,
                "Description",
            )?);
            changed.push("description");
        }
        if let Some(background) = &self.background {
            board.background = background.trim().to_string();
            changed.push("background");
        }
        if let Some(visibility) = self.visibility {
            board.visibility = visibility;
            changed.push("visibility");
        }
        if !changed.is_empty() {
            board.updated_at = Utc::now();
        }
        Ok(changed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListRequest {
    pub title: String,
    pub board_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListRequest {
    pub title: String,
}

impl UpdateListRequest {
    pub fn validated_title(&self) -> Result<String, SharedError> {
        validate_length("title", &self.title, 1, MAX_LIST_TITLE, "List title")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveListRequest {
    pub new_position: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    pub title: String,
    pub description: Option<String>,
    pub list_id: Uuid,
}

/// Partial card update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub is_completed: Option<bool>,
    pub priority: Option<Priority>,
    pub labels: Option<Vec<Label>>,
}

impl UpdateCardRequest {
    /// Validate and apply to `card`, returning the names of changed fields
    pub fn apply_to(&self, card: &mut Card) -> Result<Vec<&'static str>, SharedError> {
        let mut changed = Vec::new();
        if let Some(title) = &self.title {
            card.title = validate_length("title", title, 1, MAX_CARD_TITLE, "Card title")?;
            changed.push("title");
        }
        if self.description.is_some() {
            card.description = validate_description(self.description.as_deref())?;
            changed.push("description");
        }
        if let Some(due_date) = self.due_date {
            card.due_date = Some(due_date);
            changed.push("dueDate");
        }
        if let Some(is_completed) = self.is_completed {
            card.is_completed = is_completed;
            changed.push("isCompleted");
        }
        if let Some(priority) = self.priority {
            card.priority = priority;
            changed.push("priority");
        }
        if let Some(labels) = &self.labels {
            card.labels = labels
                .iter()
                .map(Label::validate)
                .collect::<Result<Vec<_>, _>>()?;
            changed.push("labels");
        }
        if !changed.is_empty() {
            card.updated_at = Utc::now();
        }
        Ok(changed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardRequest {
    pub destination_list_id: Uuid,
    pub new_position: Position,
    /// List the client believes the card is in; a mismatch is a conflict
    pub source_list_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignMemberRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
}

/// Standard envelope: `{"success": true, "message": ..., <data fields>}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardPayload {
    pub board: Board,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardsPayload {
    pub boards: Vec<Board>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardDetail {
    pub board: Board,
    pub lists: Vec<ListWithCards>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPayload {
    pub list: List,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListsPayload {
    pub lists: Vec<List>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardPayload {
    pub card: Card,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardsPayload {
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentPayload {
    pub comment: Comment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentsPayload {
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityPayload {
    pub activity: Vec<Activity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritePayload {
    pub board_id: Uuid,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedPayload {
    pub deleted_id: Uuid,
    /// Siblings whose position changed during compaction
    pub affected_ids: Vec<Uuid>,
}

/// Ordered member ids of one list or board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerOrdering {
    pub container_id: Uuid,
    pub member_ids: Vec<Uuid>,
}

/// Result of a reconciliation pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcilePayload {
    /// Ids whose position was rewritten
    pub changed_ids: Vec<Uuid>,
    /// Containers whose membership index disagreed with their positions
    pub repaired_containers: Vec<ContainerOrdering>,
}

/// Result of a move: the updated member plus every sibling it displaced
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveOutcome<M> {
    pub member: M,
    pub kind: MoveKind,
    pub source_id: Uuid,
    pub destination_id: Uuid,
    pub old_position: Position,
    pub new_position: Position,
    pub affected_ids: Vec<Uuid>,
    /// Membership of the source and destination, read before the locks were released
    pub containers: Vec<ContainerOrdering>,
}
