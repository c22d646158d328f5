/**
 * List Handlers
 *
 * Creating, moving and deleting a list go through `ContainerService` so the
 * board's positions stay contiguous. Title edits and archiving never touch
 * positions: an archived list keeps its slot and reappears there when
 * unarchived.
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use super::{load_board, load_list, record_activity};
use crate::backend::board::access::{authorize, Access};
use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::kanban::{
    ActivityAction, ApiResponse, CreateListRequest, DeletedPayload, List, ListPayload, ListsPayload,
    MoveListRequest, MoveOutcome, UpdateListRequest,
};
use crate::shared::ordering::MoveKind;
use crate::shared::{BoardEvent, EventType};

/// Append a list to a board (POST /api/lists)
pub async fn create_list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateListRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ListPayload>>), BackendError> {
    let board = load_board(&state, request.board_id).await?;
    authorize(&board, user.user_id, Access::Edit)?;

    let list = List::new(&request.title, board.id)?;
    let list = state.service.insert_list(list).await?;
    record_activity(
        &state,
        board.id,
        None,
        user.user_id,
        ActivityAction::ListCreated,
        serde_json::json!({ "listId": list.id, "title": &list.title }),
    )
    .await;

    state.channels.publish(BoardEvent::with_payload(
        EventType::ListCreated,
        board.id,
        user.user_id,
        &list,
    ));
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(ListPayload { list }, "List created")),
    ))
}

/// Non-archived lists of a board in position order (GET /api/lists/board/{board_id})
pub async fn lists_for_board(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(board_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ListsPayload>>, BackendError> {
    let board = load_board(&state, board_id).await?;
    authorize(&board, user.user_id, Access::View)?;

    let lists = state.service.store().lists_for_board(board_id, false).await?;
    Ok(Json(ApiResponse::ok(ListsPayload { lists })))
}

pub async fn update_list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(list_id): Path<Uuid>,
    Json(request): Json<UpdateListRequest>,
) -> Result<Json<ApiResponse<ListPayload>>, BackendError> {
    let mut list = load_list(&state, list_id).await?;
    let board = load_board(&state, list.board_id).await?;
    authorize(&board, user.user_id, Access::Edit)?;

    list.title = request.validated_title()?;
    list.updated_at = Utc::now();
    state.service.store().update_list(&list).await?;
    record_activity(
        &state,
        board.id,
        None,
        user.user_id,
        ActivityAction::ListUpdated,
        serde_json::json!({ "listId": list.id, "title": &list.title }),
    )
    .await;

    state.channels.publish(BoardEvent::with_payload(
        EventType::ListUpdated,
        board.id,
        user.user_id,
        &list,
    ));
    Ok(Json(ApiResponse::with_message(ListPayload { list }, "List updated")))
}

/// Toggle a list's archived flag (PUT /api/lists/{list_id}/archive)
pub async fn archive_list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(list_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ListPayload>>, BackendError> {
    let mut list = load_list(&state, list_id).await?;
    let board = load_board(&state, list.board_id).await?;
    authorize(&board, user.user_id, Access::Delete)?;

    list.is_archived = !list.is_archived;
    list.updated_at = Utc::now();
    state.service.store().update_list(&list).await?;

    let (message, action) = if list.is_archived {
        ("List archived", ActivityAction::ListArchived)
    } else {
        ("List unarchived", ActivityAction::ListUnarchived)
    };
    record_activity(
        &state,
        board.id,
        None,
        user.user_id,
        action,
        serde_json::json!({ "listId": list.id }),
    )
    .await;
    state.channels.publish(BoardEvent::with_payload(
        EventType::ListArchived,
        board.id,
        user.user_id,
        &list,
    ));
    Ok(Json(ApiResponse::with_message(ListPayload { list }, message)))
}

/// Reorder a list within its board (PUT /api/lists/{list_id}/move)
pub async fn move_list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(list_id): Path<Uuid>,
    Json(request): Json<MoveListRequest>,
) -> Result<Json<ApiResponse<MoveOutcome<List>>>, BackendError> {
    let list = load_list(&state, list_id).await?;
    let board = load_board(&state, list.board_id).await?;
    authorize(&board, user.user_id, Access::Edit)?;

    let outcome = state
        .service
        .move_list(list_id, Some(board.id), request.new_position)
        .await?;
    if outcome.kind != MoveKind::NoOp {
        record_activity(
            &state,
            board.id,
            None,
            user.user_id,
            ActivityAction::ListMoved,
            serde_json::json!({ "listId": list_id, "position": outcome.new_position }),
        )
        .await;
    }

    state.channels.publish(BoardEvent::moved(
        EventType::ListMoved,
        board.id,
        user.user_id,
        list_id,
        outcome.old_position,
        outcome.new_position,
        &outcome.containers,
    ));
    Ok(Json(ApiResponse::with_message(outcome, "List moved")))
}

/// Delete a list and its cards, closing the gap on the board
pub async fn delete_list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(list_id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeletedPayload>>, BackendError> {
    let list = load_list(&state, list_id).await?;
    let board = load_board(&state, list.board_id).await?;
    authorize(&board, user.user_id, Access::Delete)?;

    let deletion = state.service.delete_list(list_id).await?;
    record_activity(
        &state,
        board.id,
        None,
        user.user_id,
        ActivityAction::ListDeleted,
        serde_json::json!({ "title": &list.title, "deletedCardIds": &deletion.cascaded_ids }),
    )
    .await;

    state.channels.publish(BoardEvent::new(
        EventType::ListDeleted,
        board.id,
        user.user_id,
        serde_json::json!({
            "listId": list_id,
            "position": deletion.position,
            "affectedIds": &deletion.affected_ids,
            "deletedCardIds": &deletion.cascaded_ids,
        }),
    ));
    Ok(Json(ApiResponse::with_message(
        DeletedPayload {
            deleted_id: list_id,
            affected_ids: deletion.affected_ids,
        },
        "List deleted",
    )))
}
