//! Board HTTP Handlers
//!
//! Handlers load the entity, resolve its board, check the caller's access,
//! call the store or `ContainerService`, append to the board's activity log
//! and publish a `BoardEvent` on success. Errors are `BackendError`s and
//! render as JSON.

/// Board, membership and reconciliation handlers
pub mod boards;

/// Card handlers
pub mod cards;

/// List handlers
pub mod lists;

use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::kanban::{Activity, ActivityAction, Board, Card, List};

pub(crate) async fn load_board(state: &AppState, board_id: Uuid) -> Result<Board, BackendError> {
    state
        .service
        .store()
        .get_board(board_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Board"))
}

pub(crate) async fn load_list(state: &AppState, list_id: Uuid) -> Result<List, BackendError> {
    state
        .service
        .store()
        .get_list(list_id)
        .await?
        .ok_or_else(|| BackendError::not_found("List"))
}

pub(crate) async fn load_card(state: &AppState, card_id: Uuid) -> Result<Card, BackendError> {
    state
        .service
        .store()
        .get_card(card_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Card"))
}

/// Append an entry to the board's activity log
///
/// Runs after the mutation is stored; a failed write is logged, not returned.
pub(crate) async fn record_activity(
    state: &AppState,
    board_id: Uuid,
    card_id: Option<Uuid>,
    actor_id: Uuid,
    action: ActivityAction,
    details: serde_json::Value,
) {
    let entry = Activity::new(board_id, card_id, actor_id, action, details);
    if let Err(e) = state.service.store().record_activity(&entry).await {
        tracing::warn!(
            "[Board] Failed to record {} on board {}: {}",
            action.as_str(),
            board_id,
            e
        );
    }
}
