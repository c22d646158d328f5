/**
 * Board Subscription Handler
 *
 * `GET /api/boards/{board_id}/events` streams the board's events as
 * Server-Sent Events. The SSE `event:` name is the event type's wire name
 * (`card_moved`, `list_deleted`, ...) and `data:` is the JSON `BoardEvent`.
 *
 * # Event Filtering
 *
 * - `?types=card_moved,list_moved` - only those event types
 * - no parameter - every event type
 *
 * Unknown type names are ignored. Lagged receivers log and keep going; the
 * client is expected to re-fetch the board after a gap.
 */
use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::backend::board::access::{authorize, Access};
use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::{BoardEvent, EventType};

/// Parse the `types` query value; `None` means no filtering
pub fn parse_type_filter(types: Option<&str>) -> Option<Vec<EventType>> {
    types
        .map(|types| types.split(',').filter_map(EventType::parse).collect::<Vec<_>>())
        .filter(|types| !types.is_empty())
}

fn to_sse(event: &BoardEvent) -> Option<Event> {
    match serde_json::to_string(event) {
        Ok(data) => Some(Event::default().event(event.event_type.as_str()).data(data)),
        Err(e) => {
            tracing::error!("[Realtime] Failed to serialize event: {:?}", e);
            None
        }
    }
}

/// Handle board subscription (GET /api/boards/{board_id}/events)
pub async fn handle_board_subscription(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(board_id): Path<Uuid>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, axum::Error>>>, BackendError> {
    let board = state
        .service
        .store()
        .get_board(board_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Board"))?;
    authorize(&board, user.user_id, Access::View)?;

    let filter = parse_type_filter(query.get("types").map(String::as_str));
    match &filter {
        Some(types) => tracing::info!(
            "[Realtime] User {} subscribed to board {} filtering {:?}",
            user.user_id,
            board_id,
            types
        ),
        None => tracing::info!("[Realtime] User {} subscribed to board {}", user.user_id, board_id),
    }

    let receiver = state.channels.subscribe(board_id);
    let stream = stream::unfold((receiver, filter), |(mut rx, filter)| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(types) = &filter {
                        if !types.contains(&event.event_type) {
                            continue;
                        }
                    }
                    let Some(sse_event) = to_sse(&event) else {
                        continue;
                    };
                    return Some((Ok(sse_event), (rx, filter)));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Realtime] Subscriber lagged, skipped {} events", skipped);
                    continue;
                }
                Err(RecvError::Closed) => {
                    tracing::debug!("[Realtime] Board channel closed, ending stream");
                    return None;
                }
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
