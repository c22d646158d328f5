//! HTTP API tests through the full router

use axum::http::{Method, StatusCode};
use uuid::Uuid;

use crate::common::TestApp;

#[tokio::test]
async fn test_health_needs_no_token() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_api_requires_token() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/api/boards", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_board_lifecycle() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let board_id = app.create_board(owner, "Launch").await;
    let todo = app.create_list(owner, board_id, "Todo").await;
    let done = app.create_list(owner, board_id, "Done").await;
    for title in ["Spec", "Build", "Ship"] {
        app.create_card(owner, todo, title).await;
    }

    let (status, body) = app
        .send(Method::GET, &format!("/api/boards/{}", board_id), Some(owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let lists = body["lists"].as_array().unwrap();
    assert_eq!(lists.len(), 2);
    assert_eq!(lists[0]["id"], todo.to_string());
    assert_eq!(lists[1]["id"], done.to_string());
    let titles: Vec<&str> = lists[0]["cards"]
        .as_array()
        .unwrap()
        .iter()
        .map(|card| card["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Spec", "Build", "Ship"]);

    let (status, body) = app.send(Method::GET, "/api/boards", Some(owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["boards"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_move_card_across_lists() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let board_id = app.create_board(owner, "Launch").await;
    let todo = app.create_list(owner, board_id, "Todo").await;
    let done = app.create_list(owner, board_id, "Done").await;
    let card = app.create_card(owner, todo, "Spec").await;
    app.create_card(owner, todo, "Build").await;
    app.create_card(owner, done, "Plan").await;

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/cards/{}/move", card),
            Some(owner),
            Some(serde_json::json!({
                "destinationListId": done,
                "newPosition": 0,
                "sourceListId": todo,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["kind"], "cross_container");
    assert_eq!(body["member"]["listId"], done.to_string());
    assert_eq!(body["member"]["position"], 0);

    let (_, body) = app
        .send(Method::GET, &format!("/api/cards/list/{}", done), Some(owner), None)
        .await;
    let titles: Vec<&str> = body["cards"]
        .as_array()
        .unwrap()
        .iter()
        .map(|card| card["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Spec", "Plan"]);
}

#[tokio::test]
async fn test_move_out_of_range_is_bad_request() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let board_id = app.create_board(owner, "Launch").await;
    let todo = app.create_list(owner, board_id, "Todo").await;
    let card = app.create_card(owner, todo, "Spec").await;

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/cards/{}/move", card),
            Some(owner),
            Some(serde_json::json!({ "destinationListId": todo, "newPosition": 5 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_move_with_stale_source_is_conflict() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let board_id = app.create_board(owner, "Launch").await;
    let todo = app.create_list(owner, board_id, "Todo").await;
    let done = app.create_list(owner, board_id, "Done").await;
    let card = app.create_card(owner, todo, "Spec").await;

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/cards/{}/move", card),
            Some(owner),
            Some(serde_json::json!({
                "destinationListId": todo,
                "newPosition": 0,
                "sourceListId": done,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["resync"], true);
}

#[tokio::test]
async fn test_move_card_to_other_board_rejected() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let first = app.create_board(owner, "One").await;
    let second = app.create_board(owner, "Two").await;
    let todo = app.create_list(owner, first, "Todo").await;
    let elsewhere = app.create_list(owner, second, "Elsewhere").await;
    let card = app.create_card(owner, todo, "Spec").await;

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/cards/{}/move", card),
            Some(owner),
            Some(serde_json::json!({ "destinationListId": elsewhere, "newPosition": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cards can only move between lists of the same board");

    let (_, body) = app
        .send(Method::GET, &format!("/api/cards/{}", card), Some(owner), None)
        .await;
    assert_eq!(body["card"]["listId"], todo.to_string());
    assert_eq!(body["card"]["boardId"], first.to_string());
}

#[tokio::test]
async fn test_outsider_cannot_view_private_board() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let board_id = app.create_board(owner, "Secret").await;

    let (status, body) = app
        .send(Method::GET, &format!("/api/boards/{}", board_id), Some(Uuid::new_v4()), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access denied");
}

#[tokio::test]
async fn test_observer_can_move_but_not_delete() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let observer = Uuid::new_v4();
    let board_id = app.create_board(owner, "Launch").await;
    let todo = app.create_list(owner, board_id, "Todo").await;
    let card = app.create_card(owner, todo, "Spec").await;
    app.create_card(owner, todo, "Build").await;

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/boards/{}/members", board_id),
            Some(owner),
            Some(serde_json::json!({ "userId": observer, "role": "observer" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/cards/{}/move", card),
            Some(observer),
            Some(serde_json::json!({ "destinationListId": todo, "newPosition": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/cards/{}", card), Some(observer), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_add_existing_member_rejected() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let board_id = app.create_board(owner, "Launch").await;

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/boards/{}/members", board_id),
            Some(owner),
            Some(serde_json::json!({ "userId": owner })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User is already a member");
}

#[tokio::test]
async fn test_owner_cannot_be_removed() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let board_id = app.create_board(owner, "Launch").await;

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/boards/{}/members/{}", board_id, owner),
            Some(owner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_card_compacts_list() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let board_id = app.create_board(owner, "Launch").await;
    let todo = app.create_list(owner, board_id, "Todo").await;
    let first = app.create_card(owner, todo, "A").await;
    app.create_card(owner, todo, "B").await;
    app.create_card(owner, todo, "C").await;

    let (status, body) = app
        .send(Method::DELETE, &format!("/api/cards/{}", first), Some(owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedId"], first.to_string());
    assert_eq!(body["affectedIds"].as_array().unwrap().len(), 2);

    let (_, body) = app
        .send(Method::GET, &format!("/api/cards/list/{}", todo), Some(owner), None)
        .await;
    let positions: Vec<i64> = body["cards"]
        .as_array()
        .unwrap()
        .iter()
        .map(|card| card["position"].as_i64().unwrap())
        .collect();
    assert_eq!(positions, vec![0, 1]);
}

#[tokio::test]
async fn test_archived_card_keeps_its_slot() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let board_id = app.create_board(owner, "Launch").await;
    let todo = app.create_list(owner, board_id, "Todo").await;
    app.create_card(owner, todo, "A").await;
    let middle = app.create_card(owner, todo, "B").await;
    app.create_card(owner, todo, "C").await;

    let (status, body) = app
        .send(Method::PUT, &format!("/api/cards/{}/archive", middle), Some(owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["card"]["isArchived"], true);

    let (_, body) = app
        .send(Method::GET, &format!("/api/cards/list/{}", todo), Some(owner), None)
        .await;
    assert_eq!(body["cards"].as_array().unwrap().len(), 2);

    let (_, body) = app
        .send(Method::PUT, &format!("/api/cards/{}/archive", middle), Some(owner), None)
        .await;
    assert_eq!(body["card"]["isArchived"], false);
    assert_eq!(body["card"]["position"], 1);
}

#[tokio::test]
async fn test_storage_outage_is_service_unavailable() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let board_id = app.create_board(owner, "Launch").await;
    let todo = app.create_list(owner, board_id, "Todo").await;
    let card = app.create_card(owner, todo, "Spec").await;

    app.store.set_available(false);
    let (status, body) = app
        .send(Method::GET, &format!("/api/cards/{}", card), Some(owner), None)
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["resync"], true);
    app.store.set_available(true);
}

#[tokio::test]
async fn test_reconcile_on_consistent_board_changes_nothing() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let board_id = app.create_board(owner, "Launch").await;
    let todo = app.create_list(owner, board_id, "Todo").await;
    app.create_card(owner, todo, "A").await;

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
}

#[tokio::test]
async fn test_unknown_api_route_is_json_404() {
    let app = TestApp::new();
    let (status, body) = app
        .send(Method::GET, "/api/nothing-here", Some(Uuid::new_v4()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}
