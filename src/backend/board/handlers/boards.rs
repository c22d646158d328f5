/**
 * Board Handlers
 *
 * - `POST   /api/boards` - create; the caller becomes owner
 * - `GET    /api/boards?filter=` - the caller's boards: all, owned, member or favorite
 * - `GET    /api/boards/public?search=` - non-private boards
 * - `GET    /api/boards/{board_id}` - board with its lists and cards
 * - `PUT    /api/boards/{board_id}` - title, description, background, visibility
 * - `DELETE /api/boards/{board_id}` - owner only, cascades
 * - `POST   /api/boards/{board_id}/members` - add a member
 * - `DELETE /api/boards/{board_id}/members/{user_id}` - remove a member
 * - `POST   /api/boards/{board_id}/reconcile` - renumber every container
 * - `PUT    /api/boards/{board_id}/favorite` - star or unstar for the caller
 * - `GET    /api/boards/{board_id}/activity?limit=` - newest log entries first
 */
use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use super::{load_board, record_activity};
use crate::backend::board::access::{authorize, Access};
use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;
use crate::backend::store::MemberKind;
use crate::shared::kanban::activity::activity_limit;
use crate::shared::kanban::{
    ActivityAction, ActivityPayload, AddMemberRequest, ApiResponse, Board, BoardDetail,
    BoardFilter, BoardMember, BoardPayload, BoardsPayload, ContainerOrdering, CreateBoardRequest,
    DeletedPayload, FavoritePayload, ListWithCards, ReconcilePayload, Role, UpdateBoardRequest,
};
use crate::shared::{BoardEvent, EventType};

/// Create a board (POST /api/boards)
pub async fn create_board(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateBoardRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BoardPayload>>), BackendError> {
    let board = Board::new(
        &request.title,
        request.description.as_deref(),
        request.visibility,
        user.user_id,
    )?;
    state.service.store().insert_board(&board).await?;
    tracing::info!("[Board] User {} created board {}", user.user_id, board.id);
    record_activity(
        &state,
        board.id,
        None,
        user.user_id,
        ActivityAction::BoardCreated,
        serde_json::json!({ "title": &board.title }),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(BoardPayload { board }, "Board created")),
    ))
}

/// Boards the caller owns or is a member of (GET /api/boards)
pub async fn list_boards(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<BoardsPayload>>, BackendError> {
    let filter: BoardFilter = match query.get("filter") {
        Some(raw) => raw.parse()?,
        None => BoardFilter::default(),
    };
    let boards = state
        .service
        .store()
        .boards_for_user(user.user_id)
        .await?
        .into_iter()
        .filter(|board| filter.matches(board, user.user_id))
        .collect();
    Ok(Json(ApiResponse::ok(BoardsPayload { boards })))
}

/// Team and public boards, optionally filtered by title (GET /api/boards/public)
pub async fn public_boards(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<BoardsPayload>>, BackendError> {
    let search = query.get("search").map(String::as_str);
    let boards = state.service.store().public_boards(search).await?;
    Ok(Json(ApiResponse::ok(BoardsPayload { boards })))
}

/// Board with its non-archived lists and cards in position order
pub async fn get_board(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(board_id): Path<Uuid>,
) -> Result<Json<ApiResponse<BoardDetail>>, BackendError> {
    let board = load_board(&state, board_id).await?;
    authorize(&board, user.user_id, Access::View)?;

    let store = state.service.store();
    let mut lists = Vec::new();
    for list in store.lists_for_board(board_id, false).await? {
        let cards = store.cards_for_list(list.id, false).await?;
        lists.push(ListWithCards { list, cards });
    }
    Ok(Json(ApiResponse::ok(BoardDetail { board, lists })))
}

pub async fn update_board(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(board_id): Path<Uuid>,
    Json(request): Json<UpdateBoardRequest>,
) -> Result<Json<ApiResponse<BoardPayload>>, BackendError> {
    let mut board = load_board(&state, board_id).await?;
    authorize(&board, user.user_id, Access::Manage)?;

    let changed = request.apply_to(&mut board)?;
    if changed.is_empty() {
        return Ok(Json(ApiResponse::ok(BoardPayload { board })));
    }
    state.service.store().update_board(&board).await?;
    record_activity(
        &state,
        board_id,
        None,
        user.user_id,
        ActivityAction::BoardUpdated,
        serde_json::json!({ "changedFields": &changed }),
    )
    .await;

    state.channels.publish(BoardEvent::new(
        EventType::BoardUpdated,
        board_id,
        user.user_id,
        serde_json::json!({ "board": &board, "changedFields": changed }),
    ));
    Ok(Json(ApiResponse::with_message(BoardPayload { board }, "Board updated")))
}

/// Delete a board and everything on it (owner only)
pub async fn delete_board(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(board_id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeletedPayload>>, BackendError> {
    let board = load_board(&state, board_id).await?;
    authorize(&board, user.user_id, Access::Own)?;

    // Hold the board so no list is inserted or moved while it goes away
    let _guard = state.service.locks().acquire(&[board_id]).await;
    state.service.store().delete_board(board_id).await?;
    tracing::info!("[Board] User {} deleted board {}", user.user_id, board_id);

    state.channels.publish(BoardEvent::new(
        EventType::BoardDeleted,
        board_id,
        user.user_id,
        serde_json::json!({ "boardId": board_id }),
    ));
    state.channels.close(board_id);

    Ok(Json(ApiResponse::with_message(
        DeletedPayload {
            deleted_id: board_id,
            affected_ids: Vec::new(),
        },
        "Board deleted",
    )))
}

/// Add a member (owner or admin)
pub async fn add_member(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(board_id): Path<Uuid>,
    Json(request): Json<AddMemberRequest>,
) -> Result<Json<ApiResponse<BoardPayload>>, BackendError> {
    let board = load_board(&state, board_id).await?;
    authorize(&board, user.user_id, Access::Manage)?;

    if request.role == Role::Owner {
        return Err(BackendError::bad_request("A board has exactly one owner"));
    }
    if board.is_owner(request.user_id) || board.role_of(request.user_id).is_some() {
        return Err(BackendError::bad_request("User is already a member"));
    }

    let member = BoardMember {
        user_id: request.user_id,
        role: request.role,
        added_at: Utc::now(),
    };
    let board = state
        .service
        .store()
        .upsert_board_member(board_id, &member)
        .await?;
    tracing::info!(
        "[Board] User {} added {} to board {} as {}",
        user.user_id,
        member.user_id,
        board_id,
        member.role.as_str()
    );
    record_activity(
        &state,
        board_id,
        None,
        user.user_id,
        ActivityAction::MemberAdded,
        serde_json::json!({ "userId": member.user_id, "role": member.role }),
    )
    .await;

    state.channels.publish(BoardEvent::with_payload(
        EventType::MemberAdded,
        board_id,
        user.user_id,
        &member,
    ));
    Ok(Json(ApiResponse::with_message(BoardPayload { board }, "Member added")))
}

/// Remove a member; users may always remove themselves
pub async fn remove_member(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((board_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<BoardPayload>>, BackendError> {
    let board = load_board(&state, board_id).await?;
    if member_id != user.user_id {
        authorize(&board, user.user_id, Access::Manage)?;
    }
    if board.is_owner(member_id) {
        return Err(BackendError::bad_request("Cannot remove the board owner"));
    }
    if board.role_of(member_id).is_none() {
        return Err(BackendError::not_found("Member"));
    }

    let board = state
        .service
        .store()
        .remove_board_member(board_id, member_id)
        .await?;
    tracing::info!("[Board] User {} removed {} from board {}", user.user_id, member_id, board_id);
    record_activity(
        &state,
        board_id,
        None,
        user.user_id,
        ActivityAction::MemberRemoved,
        serde_json::json!({ "userId": member_id }),
    )
    .await;

    state.channels.publish(BoardEvent::new(
        EventType::MemberRemoved,
        board_id,
        user.user_id,
        serde_json::json!({ "userId": member_id }),
    ));
    Ok(Json(ApiResponse::with_message(BoardPayload { board }, "Member removed")))
}

/// Renumber the board's lists and every list's cards to `0..n`
///
/// The repair path for a container left inconsistent by a partial failure.
/// When positions or a membership index changed, subscribers get a
/// `list_moved` event with the board's ordering and every rebuilt container
/// so they re-fetch.
pub async fn reconcile_board(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(board_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReconcilePayload>>, BackendError> {
    let board = load_board(&state, board_id).await?;
    authorize(&board, user.user_id, Access::Edit)?;

    let result = state.service.reconcile_board(board_id).await?;
    if !result.is_empty() {
        let mut containers = vec![ContainerOrdering {
            container_id: board_id,
            member_ids: state.service.ordering(MemberKind::List, board_id).await?,
        }];
        containers.extend(
            result
                .repaired
                .iter()
                .filter(|ordering| ordering.container_id != board_id)
                .cloned(),
        );
        state.channels.publish(BoardEvent::new(
            EventType::ListMoved,
            board_id,
            user.user_id,
            serde_json::json!({
                "reconciled": true,
                "changedIds": result.changed_ids,
                "containers": containers,
            }),
        ));
    }
    Ok(Json(ApiResponse::ok(ReconcilePayload {
        changed_ids: result.changed_ids,
        repaired_containers: result.repaired,
    })))
}

/// Star or unstar a board for the caller (PUT /api/boards/{board_id}/favorite)
pub async fn toggle_favorite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(board_id): Path<Uuid>,
) -> Result<Json<ApiResponse<FavoritePayload>>, BackendError> {
    let board = load_board(&state, board_id).await?;
    authorize(&board, user.user_id, Access::View)?;

    let is_favorite = state
        .service
        .store()
        .toggle_favorite(board_id, user.user_id)
        .await?;
    tracing::debug!(
        "[Board] User {} {} board {}",
        user.user_id,
        if is_favorite { "starred" } else { "unstarred" },
        board_id
    );

    state.channels.publish(BoardEvent::new(
        EventType::FavoriteToggled,
        board_id,
        user.user_id,
        serde_json::json!({ "userId": user.user_id, "isFavorite": is_favorite }),
    ));
    let message = if is_favorite {
        "Board added to favorites"
    } else {
        "Board removed from favorites"
    };
    Ok(Json(ApiResponse::with_message(
        FavoritePayload {
            board_id,
            is_favorite,
        },
        message,
    )))
}

/// Newest entries of the board's activity log (GET /api/boards/{board_id}/activity)
pub async fn board_activity(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(board_id): Path<Uuid>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<ActivityPayload>>, BackendError> {
    let board = load_board(&state, board_id).await?;
    authorize(&board, user.user_id, Access::View)?;

    let limit = activity_limit(query.get("limit").map(String::as_str))?;
    let activity = state
        .service
        .store()
        .activity_for_board(board_id, limit)
        .await?;
    Ok(Json(ApiResponse::ok(ActivityPayload { activity })))
}
