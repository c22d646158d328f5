/**
 * Card Handlers
 *
 * A card moves within its list or to another list of the same board.
 * `ContainerService::move_card` rejects a list on another board before any
 * lock is taken.
 * `CardUpdated` events carry the names of the fields that changed.
 *
 * Assignees must be on the board. Comments and card activity are read by
 * anyone who can view the board.
 */
use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use super::{load_board, load_card, load_list, record_activity};
use crate::backend::board::access::{authorize, Access};
use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::kanban::activity::activity_limit;
use crate::shared::kanban::{
    ActivityAction, ActivityPayload, ApiResponse, AssignMemberRequest, Card, CardPayload,
    CardsPayload, Comment, CommentPayload, CommentsPayload, CreateCardRequest,
    CreateCommentRequest, DeletedPayload, MoveCardRequest, MoveOutcome, UpdateCardRequest,
};
use crate::shared::ordering::MoveKind;
use crate::shared::{BoardEvent, EventType};

/// Append a card to a list (POST /api/cards)
pub async fn create_card(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateCardRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CardPayload>>), BackendError> {
    let list = load_list(&state, request.list_id).await?;
    let board = load_board(&state, list.board_id).await?;
    authorize(&board, user.user_id, Access::Edit)?;

    let card = Card::new(
        &request.title,
        request.description.as_deref(),
        list.id,
        board.id,
    )?;
    let card = state.service.insert_card(card).await?;
    record_activity(
        &state,
        board.id,
        Some(card.id),
        user.user_id,
        ActivityAction::CardCreated,
        serde_json::json!({ "title": &card.title, "listId": list.id }),
    )
    .await;

    state.channels.publish(BoardEvent::with_payload(
        EventType::CardCreated,
        board.id,
        user.user_id,
        &card,
    ));
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(CardPayload { card }, "Card created")),
    ))
}

pub async fn get_card(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(card_id): Path<Uuid>,
) -> Result<Json<ApiResponse<CardPayload>>, BackendError> {
    let card = load_card(&state, card_id).await?;
    let board = load_board(&state, card.board_id).await?;
    authorize(&board, user.user_id, Access::View)?;
    Ok(Json(ApiResponse::ok(CardPayload { card })))
}

/// Non-archived cards of a list in position order (GET /api/cards/list/{list_id})
pub async fn cards_for_list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(list_id): Path<Uuid>,
) -> Result<Json<ApiResponse<CardsPayload>>, BackendError> {
    let list = load_list(&state, list_id).await?;
    let board = load_board(&state, list.board_id).await?;
    authorize(&board, user.user_id, Access::View)?;

    let cards = state.service.store().cards_for_list(list_id, false).await?;
    Ok(Json(ApiResponse::ok(CardsPayload { cards })))
}

/// Non-archived cards of every list on a board, list by list
pub async fn cards_for_board(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(board_id): Path<Uuid>,
) -> Result<Json<ApiResponse<CardsPayload>>, BackendError> {
    let board = load_board(&state, board_id).await?;
    authorize(&board, user.user_id, Access::View)?;

    let store = state.service.store();
    let mut cards = Vec::new();
    for list in store.lists_for_board(board_id, true).await? {
        cards.extend(store.cards_for_list(list.id, false).await?);
    }
    Ok(Json(ApiResponse::ok(CardsPayload { cards })))
}

pub async fn update_card(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(card_id): Path<Uuid>,
    Json(request): Json<UpdateCardRequest>,
) -> Result<Json<ApiResponse<CardPayload>>, BackendError> {
    let mut card = load_card(&state, card_id).await?;
    let board = load_board(&state, card.board_id).await?;
    authorize(&board, user.user_id, Access::Edit)?;

    let changed = request.apply_to(&mut card)?;
    if changed.is_empty() {
        return Ok(Json(ApiResponse::ok(CardPayload { card })));
    }
    state.service.store().update_card(&card).await?;
    record_activity(
        &state,
        board.id,
        Some(card_id),
        user.user_id,
        ActivityAction::CardUpdated,
        serde_json::json!({ "changedFields": &changed }),
    )
    .await;

    state.channels.publish(BoardEvent::new(
        EventType::CardUpdated,
        board.id,
        user.user_id,
        serde_json::json!({ "card": &card, "changedFields": changed }),
    ));
    Ok(Json(ApiResponse::with_message(CardPayload { card }, "Card updated")))
}

/// Toggle a card's archived flag (PUT /api/cards/{card_id}/archive)
pub async fn archive_card(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(card_id): Path<Uuid>,
) -> Result<Json<ApiResponse<CardPayload>>, BackendError> {
    let mut card = load_card(&state, card_id).await?;
    let board = load_board(&state, card.board_id).await?;
    authorize(&board, user.user_id, Access::Delete)?;

    card.is_archived = !card.is_archived;
    card.updated_at = Utc::now();
    state.service.store().update_card(&card).await?;

    let message = if card.is_archived {
        "Card archived"
    } else {
        "Card unarchived"
    };
    record_activity(
        &state,
        board.id,
        Some(card_id),
        user.user_id,
        ActivityAction::CardArchived,
        serde_json::json!({ "isArchived": card.is_archived }),
    )
    .await;
    state.channels.publish(BoardEvent::with_payload(
        EventType::CardArchived,
        board.id,
        user.user_id,
        &card,
    ));
    Ok(Json(ApiResponse::with_message(CardPayload { card }, message)))
}

/// Move a card within its list or to another list (PUT /api/cards/{card_id}/move)
pub async fn move_card(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(card_id): Path<Uuid>,
    Json(request): Json<MoveCardRequest>,
) -> Result<Json<ApiResponse<MoveOutcome<Card>>>, BackendError> {
    let card = load_card(&state, card_id).await?;
    let board = load_board(&state, card.board_id).await?;
    authorize(&board, user.user_id, Access::Edit)?;

    // The service rejects destinations on another board
    let outcome = state
        .service
        .move_card(
            card_id,
            request.source_list_id,
            request.destination_list_id,
            request.new_position,
        )
        .await?;
    if outcome.kind != MoveKind::NoOp {
        record_activity(
            &state,
            board.id,
            Some(card_id),
            user.user_id,
            ActivityAction::CardMoved,
            serde_json::json!({
                "fromListId": outcome.source_id,
                "toListId": outcome.destination_id,
                "position": outcome.new_position,
            }),
        )
        .await;
    }

    state.channels.publish(BoardEvent::moved(
        EventType::CardMoved,
        board.id,
        user.user_id,
        card_id,
        outcome.old_position,
        outcome.new_position,
        &outcome.containers,
    ));
    Ok(Json(ApiResponse::with_message(outcome, "Card moved")))
}

/// Delete a card, closing the gap in its list
pub async fn delete_card(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(card_id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeletedPayload>>, BackendError> {
    let card = load_card(&state, card_id).await?;
    let board = load_board(&state, card.board_id).await?;
    authorize(&board, user.user_id, Access::Delete)?;

    let deletion = state.service.delete_card(card_id).await?;
    record_activity(
        &state,
        board.id,
        Some(card_id),
        user.user_id,
        ActivityAction::CardDeleted,
        serde_json::json!({ "title": &card.title, "listId": deletion.container_id }),
    )
    .await;

    state.channels.publish(BoardEvent::new(
        EventType::CardDeleted,
        board.id,
        user.user_id,
        serde_json::json!({
            "cardId": card_id,
            "listId": deletion.container_id,
            "position": deletion.position,
            "affectedIds": &deletion.affected_ids,
        }),
    ));
    Ok(Json(ApiResponse::with_message(
        DeletedPayload {
            deleted_id: card_id,
            affected_ids: deletion.affected_ids,
        },
        "Card deleted",
    )))
}

/// Assign a board user to a card (POST /api/cards/{card_id}/assign)
pub async fn assign_member(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(card_id): Path<Uuid>,
    Json(request): Json<AssignMemberRequest>,
) -> Result<Json<ApiResponse<CardPayload>>, BackendError> {
    let card = load_card(&state, card_id).await?;
    let board = load_board(&state, card.board_id).await?;
    authorize(&board, user.user_id, Access::Edit)?;

    if board.role_of(request.user_id).is_none() {
        return Err(BackendError::bad_request(
            "Only board members can be assigned to a card",
        ));
    }
    let assigned = state
        .service
        .store()
        .assign_card_member(card_id, request.user_id)
        .await?;
    if !assigned {
        return Err(BackendError::bad_request("User is already assigned to this card"));
    }
    let card = load_card(&state, card_id).await?;
    tracing::info!("[Board] User {} assigned {} to card {}", user.user_id, request.user_id, card_id);
    record_activity(
        &state,
        board.id,
        Some(card_id),
        user.user_id,
        ActivityAction::CardAssigned,
        serde_json::json!({ "userId": request.user_id }),
    )
    .await;

    state.channels.publish(BoardEvent::new(
        EventType::CardMemberAssigned,
        board.id,
        user.user_id,
        serde_json::json!({ "cardId": card_id, "userId": request.user_id }),
    ));
    Ok(Json(ApiResponse::with_message(CardPayload { card }, "Member assigned")))
}

/// Remove an assignee (DELETE /api/cards/{card_id}/assign/{user_id})
pub async fn unassign_member(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((card_id, assignee_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<CardPayload>>, BackendError> {
    let card = load_card(&state, card_id).await?;
    let board = load_board(&state, card.board_id).await?;
    authorize(&board, user.user_id, Access::Edit)?;

    let removed = state
        .service
        .store()
        .unassign_card_member(card_id, assignee_id)
        .await?;
    if !removed {
        return Err(BackendError::not_found("Assignee"));
    }
    let card = load_card(&state, card_id).await?;
    record_activity(
        &state,
        board.id,
        Some(card_id),
        user.user_id,
        ActivityAction::CardUnassigned,
        serde_json::json!({ "userId": assignee_id }),
    )
    .await;

    state.channels.publish(BoardEvent::new(
        EventType::CardMemberUnassigned,
        board.id,
        user.user_id,
        serde_json::json!({ "cardId": card_id, "userId": assignee_id }),
    ));
    Ok(Json(ApiResponse::with_message(CardPayload { card }, "Member unassigned")))
}

/// Comment on a card (POST /api/cards/{card_id}/comments)
pub async fn add_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(card_id): Path<Uuid>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CommentPayload>>), BackendError> {
    let card = load_card(&state, card_id).await?;
    let board = load_board(&state, card.board_id).await?;
    authorize(&board, user.user_id, Access::Edit)?;

    let comment = Comment::new(card_id, board.id, user.user_id, &request.text)?;
    state.service.store().insert_comment(&comment).await?;
    record_activity(
        &state,
        board.id,
        Some(card_id),
        user.user_id,
        ActivityAction::CommentAdded,
        serde_json::json!({ "commentId": comment.id }),
    )
    .await;

    state.channels.publish(BoardEvent::with_payload(
        EventType::CommentAdded,
        board.id,
        user.user_id,
        &comment,
    ));
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(CommentPayload { comment }, "Comment added")),
    ))
}

/// Comments on a card, oldest first (GET /api/cards/{card_id}/comments)
pub async fn card_comments(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(card_id): Path<Uuid>,
) -> Result<Json<ApiResponse<CommentsPayload>>, BackendError> {
    let card = load_card(&state, card_id).await?;
    let board = load_board(&state, card.board_id).await?;
    authorize(&board, user.user_id, Access::View)?;

    let comments = state.service.store().comments_for_card(card_id).await?;
    Ok(Json(ApiResponse::ok(CommentsPayload { comments })))
}

/// Newest log entries about a card (GET /api/cards/{card_id}/activity)
pub async fn card_activity(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(card_id): Path<Uuid>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<ActivityPayload>>, BackendError> {
    let card = load_card(&state, card_id).await?;
    let board = load_board(&state, card.board_id).await?;
    authorize(&board, user.user_id, Access::View)?;

    let limit = activity_limit(query.get("limit").map(String::as_str))?;
    let activity = state.service.store().activity_for_card(card_id, limit).await?;
    Ok(Json(ApiResponse::ok(ActivityPayload { activity })))
}
