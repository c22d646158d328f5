//! The same properties through `ContainerService` and `MemoryStore`

use std::sync::Arc;

use proptest::prelude::*;
use uuid::Uuid;

use taskboard::backend::store::{BoardStore, MemberKind, PositionStore};
use taskboard::backend::{ContainerService, MemoryStore};
use taskboard::shared::kanban::{Board, Card, List, Visibility};
use taskboard::shared::ordering::{is_contiguous, Position};

struct Seeded {
    store: Arc<MemoryStore>,
    service: ContainerService,
    lists: Vec<List>,
    cards: Vec<Vec<Card>>,
}

async fn seed(sizes: &[usize]) -> Seeded {
    let store = Arc::new(MemoryStore::new());
    let service = ContainerService::new(store.clone());
    let board = Board::new("Prop", None, Visibility::Private, Uuid::new_v4()).unwrap();
    store.insert_board(&board).await.unwrap();

    let mut lists = Vec::new();
    let mut cards = Vec::new();
    for (index, size) in sizes.iter().enumerate() {
        let list = service
            .insert_list(List::new(&format!("L{}", index), board.id).unwrap())
            .await
            .unwrap();
        let mut list_cards = Vec::new();
        for n in 0..*size {
            let card = Card::new(&format!("C{}", n), None, list.id, board.id).unwrap();
            list_cards.push(service.insert_card(card).await.unwrap());
        }
        lists.push(list);
        cards.push(list_cards);
    }
    Seeded {
        store,
        service,
        lists,
        cards,
    }
}

/// Positions are `0..n` and the membership index matches position order
async fn assert_consistent(store: &MemoryStore, list_id: Uuid) -> Vec<Uuid> {
    let slots = store.container_slots(MemberKind::Card, list_id).await.unwrap();
    assert!(is_contiguous(slots.iter().map(|slot| slot.position)));
    let ordered: Vec<Uuid> = slots.iter().map(|slot| slot.member_id).collect();
    assert_eq!(store.membership(MemberKind::Card, list_id).await.unwrap(), ordered);
    ordered
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn service_moves_within_list((n, from, to) in (1usize..12).prop_flat_map(|n| (Just(n), 0..n, 0..n))) {
        runtime().block_on(async {
            let seeded = seed(&[n]).await;
            let list = &seeded.lists[0];
            let moved = seeded.cards[0][from].id;

            let outcome = seeded
                .service
                .move_card(moved, Some(list.id), list.id, to as Position)
                .await
                .unwrap();
            assert_eq!(outcome.member.position, to as Position);

            let order = assert_consistent(&seeded.store, list.id).await;
            assert_eq!(order[to], moved);
        });
    }

    #[test]
    fn service_moves_across_lists(
        (a, b, from, to) in (1usize..10, 0usize..10)
            .prop_flat_map(|(a, b)| (Just(a), Just(b), 0..a, 0..=b))
    ) {
        runtime().block_on(async {
            let seeded = seed(&[a, b]).await;
            let (source, destination) = (&seeded.lists[0], &seeded.lists[1]);
            let moved = seeded.cards[0][from].id;

            seeded
                .service
                .move_card(moved, Some(source.id), destination.id, to as Position)
                .await
                .unwrap();

            assert_eq!(assert_consistent(&seeded.store, source.id).await.len(), a - 1);
            let order = assert_consistent(&seeded.store, destination.id).await;
            assert_eq!(order.len(), b + 1);
            assert_eq!(order[to], moved);
        });
    }

    #[test]
    fn service_delete_compacts((n, k) in (1usize..12).prop_flat_map(|n| (Just(n), 0..n))) {
        runtime().block_on(async {
            let seeded = seed(&[n]).await;
            let list = &seeded.lists[0];
            let deleted = seeded.cards[0][k].id;

            seeded.service.delete_card(deleted).await.unwrap();

            let order = assert_consistent(&seeded.store, list.id).await;
            let expected: Vec<Uuid> = seeded.cards[0]
                .iter()
                .map(|card| card.id)
                .filter(|id| *id != deleted)
                .collect();
            assert_eq!(order, expected);
        });
    }

    #[test]
    fn service_insert_appends(n in 0usize..12) {
        runtime().block_on(async {
            let seeded = seed(&[n]).await;
            let list = &seeded.lists[0];
            let card = Card::new("Last", None, list.id, list.board_id).unwrap();
            let card = seeded.service.insert_card(card).await.unwrap();
            assert_eq!(card.position, n as Position);
            assert_consistent(&seeded.store, list.id).await;
        });
    }
}
