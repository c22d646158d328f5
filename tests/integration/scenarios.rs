//! Concrete ordering scenarios through `ContainerService`

use pretty_assertions::assert_eq;

use crate::common::{expected, Fixture};
use taskboard::backend::store::{BoardStore, MemberKind, PositionStore};
use taskboard::shared::ordering::{MoveKind, OrderingError};

#[tokio::test]
async fn test_move_last_card_to_front() {
    let fx = Fixture::new().await;
    let (list, cards) = fx.list_with_cards("Todo", &["A", "B", "C"]).await;

    let outcome = assert_ok!(fx.service.move_card(cards[2].id, Some(list.id), list.id, 0).await);
    assert_eq!(outcome.kind, MoveKind::Backward);
    assert_eq!(outcome.old_position, 2);
    assert_eq!(outcome.new_position, 0);

    assert_eq!(
        fx.card_positions(list.id).await,
        expected(&[("C", 0), ("A", 1), ("B", 2)])
    );
    assert_eq!(fx.card_membership(list.id).await, vec!["C", "A", "B"]);
}

#[tokio::test]
async fn test_move_first_card_forward() {
    let fx = Fixture::new().await;
    let (list, cards) = fx.list_with_cards("Todo", &["A", "B", "C", "D"]).await;

    let outcome = assert_ok!(fx.service.move_card(cards[0].id, None, list.id, 2).await);
    assert_eq!(outcome.kind, MoveKind::Forward);
    let mut affected = outcome.affected_ids.clone();
    affected.sort();
    let mut shifted = vec![cards[1].id, cards[2].id];
    shifted.sort();
    assert_eq!(affected, shifted);

    assert_eq!(
        fx.card_positions(list.id).await,
        expected(&[("B", 0), ("C", 1), ("A", 2), ("D", 3)])
    );
    assert_eq!(fx.card_membership(list.id).await, vec!["B", "C", "A", "D"]);
}

#[tokio::test]
async fn test_move_card_to_end_of_other_list() {
    let fx = Fixture::new().await;
    let (first, cards) = fx.list_with_cards("L1", &["A", "B"]).await;
    let (second, _) = fx.list_with_cards("L2", &["X"]).await;

    let outcome = assert_ok!(fx.service.move_card(cards[0].id, Some(first.id), second.id, 1).await);
    assert_eq!(outcome.kind, MoveKind::CrossContainer);
    assert_eq!(outcome.member.list_id, second.id);
    assert_eq!(outcome.member.position, 1);

    assert_eq!(fx.card_positions(first.id).await, expected(&[("B", 0)]));
    assert_eq!(
        fx.card_positions(second.id).await,
        expected(&[("X", 0), ("A", 1)])
    );
    assert_eq!(fx.card_membership(first.id).await, vec!["B"]);
    assert_eq!(fx.card_membership(second.id).await, vec!["X", "A"]);
}

#[tokio::test]
async fn test_move_card_to_front_of_other_list() {
    let fx = Fixture::new().await;
    let (first, cards) = fx.list_with_cards("L1", &["A", "B"]).await;
    let (second, _) = fx.list_with_cards("L2", &["X", "Y"]).await;

    assert_ok!(fx.service.move_card(cards[1].id, Some(first.id), second.id, 0).await);

    assert_eq!(fx.card_positions(first.id).await, expected(&[("A", 0)]));
    assert_eq!(
        fx.card_positions(second.id).await,
        expected(&[("B", 0), ("X", 1), ("Y", 2)])
    );
}

#[tokio::test]
async fn test_delete_middle_list_compacts_board() {
    let fx = Fixture::new().await;
    fx.list("L1").await;
    let middle = fx.list("L2").await;
    fx.list("L3").await;

    let deletion = assert_ok!(fx.service.delete_list(middle.id).await);
    assert_eq!(deletion.position, 1);
    assert_eq!(deletion.affected_ids.len(), 1);

    assert_eq!(fx.list_positions().await, expected(&[("L1", 0), ("L3", 1)]));
    let board = fx.store.get_board(fx.board.id).await.unwrap().unwrap();
    assert_eq!(board.list_ids.len(), 2);
    assert!(!board.list_ids.contains(&middle.id));
}

#[tokio::test]
async fn test_insert_into_empty_list() {
    let fx = Fixture::new().await;
    let list = fx.list("Empty").await;

    let card = fx.card(&list, "New").await;
    assert_eq!(card.position, 0);
    assert_eq!(fx.card_positions(list.id).await, expected(&[("New", 0)]));
}

#[tokio::test]
async fn test_move_to_current_position_changes_nothing() {
    let fx = Fixture::new().await;
    let (list, cards) = fx.list_with_cards("Todo", &["A", "B", "C"]).await;
    let before = fx.store.cards_for_list(list.id, true).await.unwrap();

    let outcome = assert_ok!(fx.service.move_card(cards[1].id, Some(list.id), list.id, 1).await);
    assert_eq!(outcome.kind, MoveKind::NoOp);
    assert!(outcome.affected_ids.is_empty());

    let after = fx.store.cards_for_list(list.id, true).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_insert_after_reorder_still_appends() {
    let fx = Fixture::new().await;
    let (list, cards) = fx.list_with_cards("Todo", &["A", "B", "C"]).await;
    assert_ok!(fx.service.move_card(cards[2].id, None, list.id, 0).await);

    let card = fx.card(&list, "D").await;
    assert_eq!(card.position, 3);
}

#[tokio::test]
async fn test_move_to_missing_list_is_not_found() {
    let fx = Fixture::new().await;
    let (list, cards) = fx.list_with_cards("Todo", &["A"]).await;

    let result = fx
        .service
        .move_card(cards[0].id, Some(list.id), uuid::Uuid::new_v4(), 0)
        .await;
    assert!(matches!(result, Err(OrderingError::NotFound { .. })));
    assert_eq!(fx.card_positions(list.id).await, expected(&[("A", 0)]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_moves_keep_positions_contiguous() {
    const ROUNDS: usize = 200;

    let fx = Fixture::new().await;
    let (first, mut first_cards) = fx
        .list_with_cards("L1", &["A", "B", "C", "D", "E"])
        .await;
    let (second, mut second_cards) = fx.list_with_cards("L2", &["V", "W", "X", "Y", "Z"]).await;
    let lists = [first.id, second.id];

    for round in 0..ROUNDS {
        let mut handles = Vec::new();
        // Cross-list moves in both directions plus reorders within each list
        for (index, card) in first_cards.iter().chain(second_cards.iter()).enumerate() {
            let service = fx.service.clone();
            let card_id = card.id;
            let destination = lists[(round + index) % 2];
            let desired = ((round * 7 + index * 3) % 5) as i32;
            handles.push(tokio::spawn(async move {
                service.move_card(card_id, None, destination, desired).await
            }));
        }
        for handle in handles {
            // Moves may lose a race and be rejected; none may corrupt positions
            let _ = handle.await.unwrap();
        }

        let mut total = 0;
        for list_id in lists {
            let slots = fx.store.container_slots(MemberKind::Card, list_id).await.unwrap();
            let positions: Vec<i32> = slots.iter().map(|slot| slot.position).collect();
            assert!(
                taskboard::shared::ordering::is_contiguous(positions.clone()),
                "round {}: list {} has positions {:?}",
                round,
                list_id,
                positions
            );
            let membership = fx.store.membership(MemberKind::Card, list_id).await.unwrap();
            let by_position: Vec<_> = slots.iter().map(|slot| slot.member_id).collect();
            assert_eq!(membership, by_position, "round {}: list {}", round, list_id);
            total += slots.len();
        }
        assert_eq!(total, 10, "round {}: cards lost or duplicated", round);

        // Next round starts from wherever the cards ended up
        first_cards = fx.store.cards_for_list(first.id, true).await.unwrap();
        second_cards = fx.store.cards_for_list(second.id, true).await.unwrap();
    }
}

#[tokio::test]
async fn test_reorder_lists_on_board() {
    let fx = Fixture::new().await;
    let first = fx.list("L1").await;
    fx.list("L2").await;
    fx.list("L3").await;

    let outcome = assert_ok!(fx.service.move_list(first.id, Some(fx.board.id), 2).await);
    assert_eq!(outcome.member.position, 2);
    assert_eq!(
        fx.list_positions().await,
        expected(&[("L2", 0), ("L3", 1), ("L1", 2)])
    );
}
