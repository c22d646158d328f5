//! Assignees, comments, the activity log and favorites through the router

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use crate::common::TestApp;

async fn add_member(app: &TestApp, owner: Uuid, board_id: Uuid, user: Uuid) {
    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/boards/{}/members", board_id),
            Some(owner),
            Some(serde_json::json!({ "userId": user })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
}

fn actions(body: &serde_json::Value) -> Vec<String> {
    body["activity"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["action"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_assign_and_unassign_member() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let teammate = Uuid::new_v4();
    let board_id = app.create_board(owner, "Launch").await;
    add_member(&app, owner, board_id, teammate).await;
    let todo = app.create_list(owner, board_id, "Todo").await;
    let card = app.create_card(owner, todo, "Spec").await;
    let assign_path = format!("/api/cards/{}/assign", card);

    let (status, body) = app
        .send(
            Method::POST,
            &assign_path,
            Some(owner),
            Some(serde_json::json!({ "userId": teammate })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["card"]["assignedMembers"], serde_json::json!([teammate.to_string()]));

    let (status, body) = app
        .send(
            Method::POST,
            &assign_path,
            Some(owner),
            Some(serde_json::json!({ "userId": teammate })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User is already assigned to this card");

    let (status, _) = app
        .send(
            Method::POST,
            &assign_path,
            Some(owner),
            Some(serde_json::json!({ "userId": Uuid::new_v4() })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let unassign_path = format!("/api/cards/{}/assign/{}", card, teammate);
    let (status, body) = app.send(Method::DELETE, &unassign_path, Some(owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["card"]["assignedMembers"], serde_json::json!([]));

    let (status, _) = app.send(Method::DELETE, &unassign_path, Some(owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_outsider_cannot_assign() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let board_id = app.create_board(owner, "Launch").await;
    let todo = app.create_list(owner, board_id, "Todo").await;
    let card = app.create_card(owner, todo, "Spec").await;

    let outsider = Uuid::new_v4();
    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/cards/{}/assign", card),
            Some(outsider),
            Some(serde_json::json!({ "userId": outsider })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_comment_lifecycle() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let board_id = app.create_board(owner, "Launch").await;
    let todo = app.create_list(owner, board_id, "Todo").await;
    let card = app.create_card(owner, todo, "Spec").await;
    let path = format!("/api/cards/{}/comments", card);

    let (status, body) = app
        .send(
            Method::POST,
            &path,
            Some(owner),
            Some(serde_json::json!({ "text": " Ready for review " })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["comment"]["text"], "Ready for review");
    assert_eq!(body["comment"]["authorId"], owner.to_string());

    let (status, body) = app
        .send(Method::POST, &path, Some(owner), Some(serde_json::json!({ "text": "  " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "text");

    let long = "c".repeat(1001);
    let (status, _) = app
        .send(Method::POST, &path, Some(owner), Some(serde_json::json!({ "text": long })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.send(Method::GET, &path, Some(owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comments"].as_array().unwrap().len(), 1);

    let (status, _) = app.send(Method::GET, &path, Some(Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_activity_log_records_mutations() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let board_id = app.create_board(owner, "Launch").await;
    let todo = app.create_list(owner, board_id, "Todo").await;
    let doing = app.create_list(owner, board_id, "Doing").await;
    let card = app.create_card(owner, todo, "Spec").await;

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/cards/{}/move", card),
            Some(owner),
            Some(serde_json::json!({ "destinationListId": doing, "newPosition": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/cards/{}/comments", card),
            Some(owner),
            Some(serde_json::json!({ "text": "Moved to doing" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .send(Method::GET, &format!("/api/boards/{}/activity", board_id), Some(owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        actions(&body),
        vec![
            "comment_added",
            "card_moved",
            "card_created",
            "list_created",
            "list_created",
            "board_created",
        ]
    );
    assert_eq!(body["activity"][0]["actorId"], owner.to_string());

    let (_, body) = app
        .send(
            Method::GET,
            &format!("/api/boards/{}/activity?limit=2", board_id),
            Some(owner),
            None,
        )
        .await;
    assert_eq!(actions(&body), vec!["comment_added", "card_moved"]);

    let (status, body) = app
        .send(Method::GET, &format!("/api/cards/{}/activity", card), Some(owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(actions(&body), vec!["comment_added", "card_moved", "card_created"]);

    let (status, body) = app
        .send(
            Method::GET,
            &format!("/api/boards/{}/activity?limit=lots", board_id),
            Some(owner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "limit");
}

#[tokio::test]
async fn test_noop_move_is_not_logged() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let board_id = app.create_board(owner, "Launch").await;
    let todo = app.create_list(owner, board_id, "Todo").await;
    let card = app.create_card(owner, todo, "Spec").await;

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/cards/{}/move", card),
            Some(owner),
            Some(serde_json::json!({ "destinationListId": todo, "newPosition": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app
        .send(Method::GET, &format!("/api/cards/{}/activity", card), Some(owner), None)
        .await;
    assert_eq!(actions(&body), vec!["card_created"]);
}

#[tokio::test]
async fn test_favorite_toggle_and_filters() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let teammate = Uuid::new_v4();
    let own_board = app.create_board(owner, "Mine").await;
    let shared_board = app.create_board(teammate, "Theirs").await;
    add_member(&app, teammate, shared_board, owner).await;

    let favorite_path = format!("/api/boards/{}/favorite", shared_board);
    let (status, body) = app.send(Method::PUT, &favorite_path, Some(owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isFavorite"], true);
    assert_eq!(body["message"], "Board added to favorites");

    let list = |filter: &'static str| {
        let app = &app;
        async move {
            let (status, body) = app
                .send(Method::GET, &format!("/api/boards?filter={}", filter), Some(owner), None)
                .await;
            assert_eq!(status, StatusCode::OK);
            body["boards"]
                .as_array()
                .unwrap()
                .iter()
                .map(|board| board["id"].as_str().unwrap().parse::<Uuid>().unwrap())
                .collect::<Vec<_>>()
        }
    };
    assert_eq!(list("favorite").await, vec![shared_board]);
    assert_eq!(list("owned").await, vec![own_board]);
    assert_eq!(list("member").await, vec![shared_board]);
    assert_eq!(list("all").await.len(), 2);

    // Favorites are per user
    let (_, body) = app
        .send(Method::GET, "/api/boards?filter=favorite", Some(teammate), None)
        .await;
    assert!(body["boards"].as_array().unwrap().is_empty());

    let (_, body) = app.send(Method::PUT, &favorite_path, Some(owner), None).await;
    assert_eq!(body["isFavorite"], false);
    assert!(list("favorite").await.is_empty());

    let (status, _) = app
        .send(Method::GET, "/api/boards?filter=starred", Some(owner), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(Method::PUT, &favorite_path, Some(Uuid::new_v4()), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
