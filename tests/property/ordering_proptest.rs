//! Properties of `plan_move` and `plan_compaction` applied in memory

use proptest::prelude::*;
use uuid::Uuid;

use taskboard::shared::ordering::{
    apply_plan, apply_shift, is_contiguous, plan_append, plan_compaction, plan_move, MoveRequest,
    Position, Positioned,
};

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    id: Uuid,
    container: Uuid,
    position: Position,
}

impl Positioned for Slot {
    fn member_id(&self) -> Uuid {
        self.id
    }

    fn container_id(&self) -> Uuid {
        self.container
    }

    fn position(&self) -> Position {
        self.position
    }

    fn place(&mut self, container_id: Uuid, position: Position) {
        self.container = container_id;
        self.position = position;
    }
}

fn container(id: Uuid, size: usize) -> Vec<Slot> {
    (0..size)
        .map(|index| Slot {
            id: Uuid::new_v4(),
            container: id,
            position: index as Position,
        })
        .collect()
}

/// Member ids of one container in position order
fn order_of(slots: &[Slot], container: Uuid) -> Vec<Uuid> {
    let mut members: Vec<&Slot> = slots.iter().filter(|s| s.container == container).collect();
    members.sort_by_key(|s| s.position);
    members.into_iter().map(|s| s.id).collect()
}

fn positions_of(slots: &[Slot], container: Uuid) -> Vec<Position> {
    slots
        .iter()
        .filter(|s| s.container == container)
        .map(|s| s.position)
        .collect()
}

/// A container size with a valid current and desired index inside it
fn within_container() -> impl Strategy<Value = (usize, usize, usize)> {
    (1usize..40).prop_flat_map(|n| (Just(n), 0..n, 0..n))
}

/// Source size, destination size, index in source, index in destination
fn across_containers() -> impl Strategy<Value = (usize, usize, usize, usize)> {
    (1usize..30, 0usize..30)
        .prop_flat_map(|(a, b)| (Just(a), Just(b), 0..a, 0..=b))
}

proptest! {
    #[test]
    fn moves_within_container_stay_contiguous((n, from, to) in within_container()) {
        let list = Uuid::new_v4();
        let mut slots = container(list, n);
        let before = order_of(&slots, list);
        let moved = before[from];

        let plan = plan_move(&MoveRequest {
            member_id: moved,
            source: list,
            destination: list,
            current_position: from as Position,
            desired_position: to as Position,
            destination_size: (n - 1) as Position,
        }).unwrap();
        apply_plan(&plan, &mut slots);

        prop_assert!(is_contiguous(positions_of(&slots, list)));
        let after = order_of(&slots, list);
        prop_assert_eq!(after[to], moved);

        let others_before: Vec<Uuid> = before.into_iter().filter(|id| *id != moved).collect();
        let others_after: Vec<Uuid> = after.into_iter().filter(|id| *id != moved).collect();
        prop_assert_eq!(others_before, others_after);
    }

    #[test]
    fn moves_across_containers_stay_contiguous((a, b, from, to) in across_containers()) {
        let (source, destination) = (Uuid::new_v4(), Uuid::new_v4());
        let mut slots = container(source, a);
        slots.extend(container(destination, b));
        let moved = order_of(&slots, source)[from];

        let plan = plan_move(&MoveRequest {
            member_id: moved,
            source,
            destination,
            current_position: from as Position,
            desired_position: to as Position,
            destination_size: b as Position,
        }).unwrap();
        apply_plan(&plan, &mut slots);

        let source_positions = positions_of(&slots, source);
        let destination_positions = positions_of(&slots, destination);
        prop_assert_eq!(source_positions.len(), a - 1);
        prop_assert_eq!(destination_positions.len(), b + 1);
        prop_assert!(is_contiguous(source_positions));
        prop_assert!(is_contiguous(destination_positions));

        let placed = slots.iter().find(|s| s.id == moved).unwrap();
        prop_assert_eq!(placed.container, destination);
        prop_assert_eq!(placed.position, to as Position);
    }

    #[test]
    fn append_takes_next_position(n in 0usize..50) {
        let list = Uuid::new_v4();
        let slots = container(list, n);
        let max = slots.iter().map(|s| s.position).max();
        prop_assert_eq!(plan_append(max), n as Position);
    }

    #[test]
    fn delete_then_compact_stays_contiguous((n, k) in (1usize..40).prop_flat_map(|n| (Just(n), 0..n))) {
        let list = Uuid::new_v4();
        let mut slots = container(list, n);
        let before = order_of(&slots, list);
        let deleted = slots.remove(k);

        apply_shift(&plan_compaction(list, deleted.position), slots.iter_mut());

        prop_assert!(is_contiguous(positions_of(&slots, list)));
        let expected: Vec<Uuid> = before.into_iter().filter(|id| *id != deleted.id).collect();
        prop_assert_eq!(order_of(&slots, list), expected);
    }

    #[test]
    fn moving_to_current_position_is_noop((n, at) in (1usize..40).prop_flat_map(|n| (Just(n), 0..n))) {
        let list = Uuid::new_v4();
        let mut slots = container(list, n);
        let original = slots.clone();

        let plan = plan_move(&MoveRequest {
            member_id: slots[at].id,
            source: list,
            destination: list,
            current_position: at as Position,
            desired_position: at as Position,
            destination_size: (n - 1) as Position,
        }).unwrap();
        prop_assert!(plan.is_noop());
        prop_assert!(apply_plan(&plan, &mut slots).is_empty());
        prop_assert_eq!(slots, original);
    }

    #[test]
    fn out_of_range_is_rejected(n in 1usize..40, beyond in 1i32..10) {
        let list = Uuid::new_v4();
        let result = plan_move(&MoveRequest {
            member_id: Uuid::new_v4(),
            source: list,
            destination: list,
            current_position: 0,
            desired_position: (n - 1) as Position + beyond,
            destination_size: (n - 1) as Position,
        });
        prop_assert!(result.is_err());
    }
}
