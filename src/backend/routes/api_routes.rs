/**
 * API Routes
 *
 * Paths are relative to `/api`; the router nests them and adds the auth
 * middleware.
 *
 * ## Boards
 * - `POST /boards`, `GET /boards`, `GET /boards/public`
 * - `GET|PUT|DELETE /boards/{board_id}`
 * - `POST /boards/{board_id}/members`, `DELETE /boards/{board_id}/members/{user_id}`
 * - `POST /boards/{board_id}/reconcile`
 * - `PUT /boards/{board_id}/favorite`, `GET /boards/{board_id}/activity`
 * - `GET /boards/{board_id}/events` - SSE
 *
 * ## Lists
 * - `POST /lists`, `GET /lists/board/{board_id}`
 * - `PUT|DELETE /lists/{list_id}`, `PUT /lists/{list_id}/archive`, `PUT /lists/{list_id}/move`
 *
 * ## Cards
 * - `POST /cards`, `GET /cards/list/{list_id}`, `GET /cards/board/{board_id}`
 * - `GET|PUT|DELETE /cards/{card_id}`, `PUT /cards/{card_id}/archive`, `PUT /cards/{card_id}/move`
 * - `POST /cards/{card_id}/assign`, `DELETE /cards/{card_id}/assign/{user_id}`
 * - `GET|POST /cards/{card_id}/comments`, `GET /cards/{card_id}/activity`
 */
use axum::{
    http::StatusCode,
    routing::{get, post, put},
    Router,
};

use crate::backend::board::handlers::{boards, cards, lists};
use crate::backend::error::BackendError;
use crate::backend::realtime::handle_board_subscription;
use crate::backend::server::state::AppState;

async fn api_not_found() -> BackendError {
    BackendError::with_status(StatusCode::NOT_FOUND, "Route not found")
}

/// Configure every `/api` route
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        // Boards
        .route("/boards", post(boards::create_board).get(boards::list_boards))
        .route("/boards/public", get(boards::public_boards))
        .route(
            "/boards/{board_id}",
            get(boards::get_board)
                .put(boards::update_board)
                .delete(boards::delete_board),
        )
        .route("/boards/{board_id}/members", post(boards::add_member))
        .route(
            "/boards/{board_id}/members/{user_id}",
            axum::routing::delete(boards::remove_member),
        )
        .route("/boards/{board_id}/reconcile", post(boards::reconcile_board))
        .route("/boards/{board_id}/favorite", put(boards::toggle_favorite))
        .route("/boards/{board_id}/activity", get(boards::board_activity))
        .route("/boards/{board_id}/events", get(handle_board_subscription))
        // Lists
        .route("/lists", post(lists::create_list))
        .route("/lists/board/{board_id}", get(lists::lists_for_board))
        .route(
            "/lists/{list_id}",
            put(lists::update_list).delete(lists::delete_list),
        )
        .route("/lists/{list_id}/archive", put(lists::archive_list))
        .route("/lists/{list_id}/move", put(lists::move_list))
        // Cards
        .route("/cards", post(cards::create_card))
        .route("/cards/list/{list_id}", get(cards::cards_for_list))
        .route("/cards/board/{board_id}", get(cards::cards_for_board))
        .route(
            "/cards/{card_id}",
            get(cards::get_card)
                .put(cards::update_card)
                .delete(cards::delete_card),
        )
        .route("/cards/{card_id}/archive", put(cards::archive_card))
        .route("/cards/{card_id}/move", put(cards::move_card))
        .route("/cards/{card_id}/assign", post(cards::assign_member))
        .route(
            "/cards/{card_id}/assign/{user_id}",
            axum::routing::delete(cards::unassign_member),
        )
        .route(
            "/cards/{card_id}/comments",
            get(cards::card_comments).post(cards::add_comment),
        )
        .route("/cards/{card_id}/activity", get(cards::card_activity))
        .fallback(api_not_found)
}
