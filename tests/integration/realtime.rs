//! Server-Sent Events delivery through the router

use std::time::Duration;

use axum::{
    body::{Body, BodyDataStream},
    http::{Method, Request, StatusCode},
};
use futures_util::StreamExt;
use tower::ServiceExt;
use uuid::Uuid;

use crate::common::TestApp;

async fn subscribe(app: &TestApp, user: Uuid, board_id: Uuid, query: &str) -> BodyDataStream {
    let uri = format!(
        "/api/boards/{}/events?access_token={}{}",
        board_id,
        TestApp::token(user),
        query
    );
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response.into_body().into_data_stream()
}

/// Read frames until one names `event_name`, returning its `data:` JSON
async fn next_event(stream: &mut BodyDataStream, event_name: &str) -> serde_json::Value {
    let marker = format!("event: {}", event_name);
    let mut buffer = String::new();
    loop {
        let chunk = tokio::time::timeout(Duration::from_secs(2), stream.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .unwrap();
        buffer.push_str(&String::from_utf8_lossy(&chunk));
        if let Some(start) = buffer.find(&marker) {
            let frame = &buffer[start..];
            if let Some(end) = frame.find("\n\n") {
                let data = frame[..end]
                    .lines()
                    .find_map(|line| line.strip_prefix("data: "))
                    .unwrap();
                return serde_json::from_str(data).unwrap();
            }
        }
    }
}

#[tokio::test]
async fn test_card_move_is_broadcast_with_orderings() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let board_id = app.create_board(owner, "Live").await;
    let todo = app.create_list(owner, board_id, "Todo").await;
    let first = app.create_card(owner, todo, "A").await;
    let second = app.create_card(owner, todo, "B").await;

    let mut events = subscribe(&app, owner, board_id, "&types=card_moved").await;

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/cards/{}/move", second),
            Some(owner),
            Some(serde_json::json!({ "destinationListId": todo, "newPosition": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let event = next_event(&mut events, "card_moved").await;
    assert_eq!(event["eventType"], "card_moved");
    assert_eq!(event["boardId"], board_id.to_string());
    assert_eq!(event["payload"]["memberId"], second.to_string());
    assert_eq!(event["payload"]["oldPosition"], 1);
    assert_eq!(event["payload"]["newPosition"], 0);
    let containers = event["payload"]["containers"].as_array().unwrap();
    assert_eq!(containers.len(), 1);
    assert_eq!(
        containers[0]["memberIds"],
        serde_json::json!([second.to_string(), first.to_string()])
    );
}

#[tokio::test]
async fn test_events_are_scoped_to_board() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let watched = app.create_board(owner, "Watched").await;
    let other = app.create_board(owner, "Other").await;

    let mut events = subscribe(&app, owner, watched, "").await;

    app.create_list(owner, other, "Elsewhere").await;
    let list_id = app.create_list(owner, watched, "Here").await;

    let event = next_event(&mut events, "list_created").await;
    assert_eq!(event["boardId"], watched.to_string());
    assert_eq!(event["payload"]["id"], list_id.to_string());
}

#[tokio::test]
async fn test_outsider_cannot_subscribe() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let board_id = app.create_board(owner, "Private").await;

    let uri = format!(
        "/api/boards/{}/events?access_token={}",
        board_id,
        TestApp::token(Uuid::new_v4())
    );
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_membership_repair_is_broadcast() {
    use taskboard::backend::store::{MemberKind, PositionStore};

    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let board_id = app.create_board(owner, "Repair").await;
    let todo = app.create_list(owner, board_id, "Todo").await;
    let first = app.create_card(owner, todo, "A").await;
    let second = app.create_card(owner, todo, "B").await;
    // Positions are untouched; only the index disagrees with them
    app.store
        .set_membership(MemberKind::Card, todo, &[second, first])
        .await
        .unwrap();

    let mut events = subscribe(&app, owner, board_id, "&types=list_moved").await;
    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/boards/{}/reconcile", board_id),
            Some(owner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["changedIds"].as_array().unwrap().is_empty());
    assert_eq!(body["repairedContainers"][0]["containerId"], todo.to_string());

    let event = next_event(&mut events, "list_moved").await;
    assert_eq!(event["payload"]["reconciled"], true);
    let containers = event["payload"]["containers"].as_array().unwrap();
    let repaired = containers
        .iter()
        .find(|container| container["containerId"] == todo.to_string())
        .unwrap();
    assert_eq!(
        repaired["memberIds"],
        serde_json::json!([first.to_string(), second.to_string()])
    );
}

#[tokio::test]
async fn test_assignment_and_comment_events() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let board_id = app.create_board(owner, "Live").await;
    let todo = app.create_list(owner, board_id, "Todo").await;
    let card = app.create_card(owner, todo, "A").await;

    let mut events = subscribe(
        &app,
        owner,
        board_id,
        "&types=card_member_assigned,card_member_unassigned,comment_added,favorite_toggled",
    )
    .await;

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/cards/{}/assign", card),
            Some(owner),
            Some(serde_json::json!({ "userId": owner })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let event = next_event(&mut events, "card_member_assigned").await;
    assert_eq!(event["payload"]["cardId"], card.to_string());
    assert_eq!(event["payload"]["userId"], owner.to_string());

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/cards/{}/assign/{}", card, owner),
            Some(owner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let event = next_event(&mut events, "card_member_unassigned").await;
    assert_eq!(event["payload"]["userId"], owner.to_string());

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/cards/{}/comments", card),
            Some(owner),
            Some(serde_json::json!({ "text": "On it" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let event = next_event(&mut events, "comment_added").await;
    assert_eq!(event["payload"]["text"], "On it");
    assert_eq!(event["payload"]["cardId"], card.to_string());

    let (status, _) = app
        .send(Method::PUT, &format!("/api/boards/{}/favorite", board_id), Some(owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let event = next_event(&mut events, "favorite_toggled").await;
    assert_eq!(event["payload"]["isFavorite"], true);
}
