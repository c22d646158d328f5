//! Store Module
//!
//! Durable storage for boards, lists and cards, split into two contracts:
//!
//! - **`PositionStore`** - the narrow surface the ordering engine needs:
//!   read a member's slot, shift a range, set one position, find the max,
//!   and maintain the container's ordered id list (the membership index).
//! - **`BoardStore`** - entity CRUD on top of `PositionStore`, plus card
//!   assignees, comments, the activity log and board favorites.
//!
//! # Adapters
//!
//! - `MemoryStore` - `tokio::sync::RwLock` over hash maps; used when no
//!   database is configured and throughout the tests
//! - `PgStore` - PostgreSQL via `sqlx`; range shifts are single filtered
//!   `UPDATE`s and `apply_plan` runs inside one transaction
//!
//! # Atomicity
//!
//! Each trait call is atomic on its own. A sequence of calls is not, unless
//! the adapter overrides `apply_plan`. Callers serialize moves per container
//! with `ContainerLocks`.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::shared::kanban::{Activity, Board, BoardMember, Card, Comment, List};
use crate::shared::ordering::{
    plan_compaction, MovePlan, OrderingError, Position, RangeShift, TargetUpdate,
};

/// In-memory adapter
pub mod memory;

/// PostgreSQL adapter
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Which kind of member a position operation is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Cards, contained by lists
    Card,
    /// Lists, contained by boards
    List,
}

impl MemberKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Card => "Card",
            Self::List => "List",
        }
    }

    pub fn container_label(&self) -> &'static str {
        match self {
            Self::Card => "List",
            Self::List => "Board",
        }
    }
}

/// Where a member currently sits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberSlot {
    pub member_id: Uuid,
    pub container_id: Uuid,
    pub position: Position,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(kind: &str, id: Uuid) -> Self {
        Self::NotFound(format!("{} {}", kind, id))
    }
}

impl From<StoreError> for OrderingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => OrderingError::not_found(what),
            StoreError::Database(sqlx::Error::RowNotFound) => OrderingError::not_found("Row"),
            other => OrderingError::storage(other.to_string()),
        }
    }
}

/// Storage operations the ordering engine depends on
#[async_trait]
pub trait PositionStore: Send + Sync {
    /// Current container and position of a member
    async fn member_slot(
        &self,
        kind: MemberKind,
        member_id: Uuid,
    ) -> Result<Option<MemberSlot>, StoreError>;

    /// Number of members in a container, archived ones included
    async fn container_size(&self, kind: MemberKind, container_id: Uuid)
        -> Result<Position, StoreError>;

    /// Every slot in a container, ordered by position then id
    async fn container_slots(
        &self,
        kind: MemberKind,
        container_id: Uuid,
    ) -> Result<Vec<MemberSlot>, StoreError>;

    /// Apply one range shift, returning the ids of the members it moved
    async fn shift_range(&self, kind: MemberKind, shift: &RangeShift)
        -> Result<Vec<Uuid>, StoreError>;

    /// Set one member's container and position
    async fn set_position(&self, kind: MemberKind, target: &TargetUpdate)
        -> Result<(), StoreError>;

    /// Highest position in a container, `None` if empty
    async fn max_position(
        &self,
        kind: MemberKind,
        container_id: Uuid,
    ) -> Result<Option<Position>, StoreError>;

    /// Ordered member ids recorded on the container
    ///
    /// Fails with `NotFound` if the container does not exist.
    async fn membership(&self, kind: MemberKind, container_id: Uuid)
        -> Result<Vec<Uuid>, StoreError>;

    /// Replace the container's ordered member ids
    async fn set_membership(
        &self,
        kind: MemberKind,
        container_id: Uuid,
        member_ids: &[Uuid],
    ) -> Result<(), StoreError>;

    /// Close the gap left by a deleted member
    async fn compact_after_delete(
        &self,
        kind: MemberKind,
        container_id: Uuid,
        deleted_position: Position,
    ) -> Result<Vec<Uuid>, StoreError> {
        self.shift_range(kind, &plan_compaction(container_id, deleted_position))
            .await
    }

    /// Apply every shift of a plan, then its target update
    ///
    /// Not transactional by default: a failure part way leaves earlier
    /// shifts applied.
    async fn apply_plan(&self, kind: MemberKind, plan: &MovePlan) -> Result<Vec<Uuid>, StoreError> {
        let mut affected = Vec::new();
        for shift in &plan.shifts {
            affected.extend(self.shift_range(kind, shift).await?);
        }
        if let Some(target) = &plan.target {
            self.set_position(kind, target).await?;
        }
        Ok(affected)
    }

    async fn remove_from_membership(
        &self,
        kind: MemberKind,
        container_id: Uuid,
        member_id: Uuid,
    ) -> Result<(), StoreError> {
        let mut ids = self.membership(kind, container_id).await?;
        ids.retain(|id| *id != member_id);
        self.set_membership(kind, container_id, &ids).await
    }

    /// Insert `member_id` at `index`, clamped to the end
    ///
    /// An existing entry for the member is removed first.
    async fn insert_into_membership(
        &self,
        kind: MemberKind,
        container_id: Uuid,
        member_id: Uuid,
        index: Position,
    ) -> Result<(), StoreError> {
        let mut ids = self.membership(kind, container_id).await?;
        ids.retain(|id| *id != member_id);
        let index = usize::try_from(index).unwrap_or(0).min(ids.len());
        ids.insert(index, member_id);
        self.set_membership(kind, container_id, &ids).await
    }
}

/// Entity storage for boards, lists and cards
///
/// Updates through this trait never touch `position`; positions only change
/// through `PositionStore`.
#[async_trait]
pub trait BoardStore: PositionStore {
    async fn insert_board(&self, board: &Board) -> Result<(), StoreError>;

    async fn get_board(&self, board_id: Uuid) -> Result<Option<Board>, StoreError>;

    /// Boards the user owns or is a member of, most recently updated first
    async fn boards_for_user(&self, user_id: Uuid) -> Result<Vec<Board>, StoreError>;

    /// Non-private boards, optionally filtered by a case-insensitive title match
    async fn public_boards(&self, search: Option<&str>) -> Result<Vec<Board>, StoreError>;

    /// Persist title, description, background, visibility and `updated_at`
    async fn update_board(&self, board: &Board) -> Result<(), StoreError>;

    /// Add a member, or change the role of an existing one
    async fn upsert_board_member(
        &self,
        board_id: Uuid,
        member: &BoardMember,
    ) -> Result<Board, StoreError>;

    async fn remove_board_member(&self, board_id: Uuid, user_id: Uuid)
        -> Result<Board, StoreError>;

    /// Delete a board with all of its lists and cards
    async fn delete_board(&self, board_id: Uuid) -> Result<(), StoreError>;

    async fn insert_list(&self, list: &List) -> Result<(), StoreError>;

    async fn get_list(&self, list_id: Uuid) -> Result<Option<List>, StoreError>;

    /// Lists of a board in position order
    async fn lists_for_board(
        &self,
        board_id: Uuid,
        include_archived: bool,
    ) -> Result<Vec<List>, StoreError>;

    /// Persist title, archive flag and `updated_at`
    async fn update_list(&self, list: &List) -> Result<(), StoreError>;

    /// Delete a list and its cards, returning the deleted card ids
    async fn delete_list(&self, list_id: Uuid) -> Result<Vec<Uuid>, StoreError>;

    async fn insert_card(&self, card: &Card) -> Result<(), StoreError>;

    async fn get_card(&self, card_id: Uuid) -> Result<Option<Card>, StoreError>;

    /// Cards of a list in position order
    async fn cards_for_list(
        &self,
        list_id: Uuid,
        include_archived: bool,
    ) -> Result<Vec<Card>, StoreError>;

    /// Persist every field except list, position and assignees
    async fn update_card(&self, card: &Card) -> Result<(), StoreError>;

    async fn delete_card(&self, card_id: Uuid) -> Result<(), StoreError>;

    /// Add a user to a card's assignees; `false` if they already were
    async fn assign_card_member(&self, card_id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;

    /// Remove a user from a card's assignees; `false` if they were not assigned
    async fn unassign_card_member(&self, card_id: Uuid, user_id: Uuid)
        -> Result<bool, StoreError>;

    async fn insert_comment(&self, comment: &Comment) -> Result<(), StoreError>;

    /// Comments on a card, oldest first
    async fn comments_for_card(&self, card_id: Uuid) -> Result<Vec<Comment>, StoreError>;

    async fn record_activity(&self, activity: &Activity) -> Result<(), StoreError>;

    /// Newest `limit` entries of a board's log
    async fn activity_for_board(&self, board_id: Uuid, limit: i64)
        -> Result<Vec<Activity>, StoreError>;

    /// Newest `limit` entries about one card
    async fn activity_for_card(&self, card_id: Uuid, limit: i64) -> Result<Vec<Activity>, StoreError>;

    /// Star or unstar a board for a user, returning the new state
    async fn toggle_favorite(&self, board_id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;
}
