/**
 * Container Mutation Service
 *
 * Orchestrates inserts, moves and deletes of lists and cards: takes the
 * container locks, reads current positions from the store, asks the
 * ordering engine for a plan, applies it, then brings the container's
 * ordered id list (membership index) in line with the new positions.
 *
 * # Consistency
 *
 * Moves touching a container are serialized by `ContainerLocks` held from
 * the first read to the last write, so the member slot and the destination
 * size always come from the same snapshot. The PostgreSQL store additionally
 * applies each plan in one transaction. Membership updates are separate
 * writes; a failure there surfaces as `StorageUnavailable` and the container
 * can be repaired with `reconcile`.
 *
 * No positions are cached between calls; every operation re-reads.
 */
use std::sync::Arc;

use uuid::Uuid;

use super::locks::ContainerLocks;
use crate::backend::store::{BoardStore, MemberKind, MemberSlot};
use crate::shared::kanban::{Card, ContainerOrdering, List, MoveOutcome};
use crate::shared::ordering::{
    plan_append, plan_move, plan_renumber, MoveKind, MoveRequest, OrderingError, Position,
    TargetUpdate,
};

/// Kind-independent result of a move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveSummary {
    pub member_id: Uuid,
    pub kind: MoveKind,
    pub source_id: Uuid,
    pub destination_id: Uuid,
    pub old_position: Position,
    pub new_position: Position,
    /// Siblings whose position changed, the moved member excluded
    pub affected_ids: Vec<Uuid>,
    /// Source and destination membership as of the end of the move
    pub containers: Vec<ContainerOrdering>,
}

impl MoveSummary {
    pub fn into_outcome<M>(self, member: M) -> MoveOutcome<M> {
        MoveOutcome {
            member,
            kind: self.kind,
            source_id: self.source_id,
            destination_id: self.destination_id,
            old_position: self.old_position,
            new_position: self.new_position,
            affected_ids: self.affected_ids,
            containers: self.containers,
        }
    }

    /// Source and destination, deduplicated
    pub fn container_ids(&self) -> Vec<Uuid> {
        if self.source_id == self.destination_id {
            vec![self.source_id]
        } else {
            vec![self.source_id, self.destination_id]
        }
    }
}

/// Result of a reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Members whose position was rewritten
    pub changed_ids: Vec<Uuid>,
    /// Containers whose membership index was rebuilt, with the new order
    pub repaired: Vec<ContainerOrdering>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.changed_ids.is_empty() && self.repaired.is_empty()
    }

    fn merge(&mut self, other: Reconciliation) {
        self.changed_ids.extend(other.changed_ids);
        self.repaired.extend(other.repaired);
    }
}

/// Result of deleting a member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deletion {
    pub member_id: Uuid,
    pub container_id: Uuid,
    pub position: Position,
    /// Siblings shifted down to close the gap
    pub affected_ids: Vec<Uuid>,
    /// Cards removed along with a deleted list
    pub cascaded_ids: Vec<Uuid>,
}

#[derive(Clone)]
pub struct ContainerService {
    store: Arc<dyn BoardStore>,
    locks: ContainerLocks,
}

impl ContainerService {
    pub fn new(store: Arc<dyn BoardStore>) -> Self {
        Self {
            store,
            locks: ContainerLocks::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn BoardStore> {
        &self.store
    }

    pub fn locks(&self) -> &ContainerLocks {
        &self.locks
    }

    async fn slot(&self, kind: MemberKind, member_id: Uuid) -> Result<MemberSlot, OrderingError> {
        self.store
            .member_slot(kind, member_id)
            .await?
            .ok_or_else(|| OrderingError::not_found(format!("{} {}", kind.label(), member_id)))
    }

    /// Append a list to the end of its board
    pub async fn insert_list(&self, mut list: List) -> Result<List, OrderingError> {
        let _guard = self.locks.acquire(&[list.board_id]).await;
        list.position = self.append_position(MemberKind::List, list.board_id).await?;
        self.store.insert_list(&list).await?;
        self.store
            .insert_into_membership(MemberKind::List, list.board_id, list.id, list.position)
            .await?;
        tracing::info!(
            "[Board] Created list {} at position {} on board {}",
            list.id,
            list.position,
            list.board_id
        );
        Ok(list)
    }

    /// Append a card to the end of its list
    pub async fn insert_card(&self, mut card: Card) -> Result<Card, OrderingError> {
        let _guard = self.locks.acquire(&[card.list_id]).await;
        card.position = self.append_position(MemberKind::Card, card.list_id).await?;
        self.store.insert_card(&card).await?;
        self.store
            .insert_into_membership(MemberKind::Card, card.list_id, card.id, card.position)
            .await?;
        tracing::info!(
            "[Board] Created card {} at position {} in list {}",
            card.id,
            card.position,
            card.list_id
        );
        Ok(card)
    }

    /// Caller must hold the container lock until the member is stored
    async fn append_position(
        &self,
        kind: MemberKind,
        container_id: Uuid,
    ) -> Result<Position, OrderingError> {
        // Fails with NotFound for a missing container
        self.store.membership(kind, container_id).await?;
        Ok(plan_append(self.store.max_position(kind, container_id).await?))
    }

    /// Move a card within its list or to another list
    ///
    /// `expected_source` is the list the caller believes the card is in; a
    /// mismatch fails with `StaleState` before anything is written. The
    /// destination must be on the card's board.
    pub async fn move_card(
        &self,
        card_id: Uuid,
        expected_source: Option<Uuid>,
        destination_list_id: Uuid,
        desired_position: Position,
    ) -> Result<MoveOutcome<Card>, OrderingError> {
        let card = self
            .store
            .get_card(card_id)
            .await?
            .ok_or_else(|| OrderingError::not_found(format!("Card {}", card_id)))?;
        let destination = self
            .store
            .get_list(destination_list_id)
            .await?
            .ok_or_else(|| OrderingError::not_found(format!("List {}", destination_list_id)))?;
        // Lists never change board, so this holds without the container locks
        if destination.board_id != card.board_id {
            tracing::warn!(
                "[Board] Rejected move of card {} into list {} on board {}",
                card_id,
                destination.id,
                destination.board_id
            );
            return Err(OrderingError::foreign(
                card_id,
                destination.id,
                "Cards can only move between lists of the same board",
            ));
        }

        let summary = self
            .move_member(
                MemberKind::Card,
                card_id,
                expected_source,
                Some(destination_list_id),
                desired_position,
            )
            .await?;
        let card = self
            .store
            .get_card(card_id)
            .await?
            .ok_or_else(|| OrderingError::not_found(format!("Card {}", card_id)))?;
        Ok(summary.into_outcome(card))
    }

    /// Reorder a list within its board
    pub async fn move_list(
        &self,
        list_id: Uuid,
        expected_board: Option<Uuid>,
        desired_position: Position,
    ) -> Result<MoveOutcome<List>, OrderingError> {
        let summary = self
            .move_member(MemberKind::List, list_id, expected_board, None, desired_position)
            .await?;
        let list = self
            .store
            .get_list(list_id)
            .await?
            .ok_or_else(|| OrderingError::not_found(format!("List {}", list_id)))?;
        Ok(summary.into_outcome(list))
    }

    /// Move any member; `destination` of `None` means its current container
    pub async fn move_member(
        &self,
        kind: MemberKind,
        member_id: Uuid,
        expected_source: Option<Uuid>,
        destination: Option<Uuid>,
        desired_position: Position,
    ) -> Result<MoveSummary, OrderingError> {
        let observed = self.slot(kind, member_id).await?;
        check_source(kind, &observed, expected_source)?;
        let destination = destination.unwrap_or(observed.container_id);

        let _guard = self
            .locks
            .acquire(&[observed.container_id, destination])
            .await;

        // Re-read under the lock; the unlocked read only chose which locks to take
        let slot = self.slot(kind, member_id).await?;
        if slot.container_id != observed.container_id {
            return Err(OrderingError::stale(
                member_id,
                format!(
                    "{} moved to another {} concurrently",
                    kind.label(),
                    kind.container_label().to_lowercase()
                ),
            ));
        }
        // Fails with NotFound for a missing destination
        self.store.membership(kind, destination).await?;

        let same_container = slot.container_id == destination;
        let size = self.store.container_size(kind, destination).await?;
        let request = MoveRequest {
            member_id,
            source: slot.container_id,
            destination,
            current_position: slot.position,
            desired_position,
            destination_size: if same_container { size - 1 } else { size },
        };
        let plan = plan_move(&request)?;

        let mut summary = MoveSummary {
            member_id,
            kind: plan.kind,
            source_id: slot.container_id,
            destination_id: destination,
            old_position: slot.position,
            new_position: desired_position,
            affected_ids: Vec::new(),
            containers: Vec::new(),
        };
        if plan.is_noop() {
            tracing::debug!("[Board] {} {} already at {}", kind.label(), member_id, desired_position);
            summary.containers = self.snapshot(kind, &summary.container_ids()).await?;
            return Ok(summary);
        }

        summary.affected_ids = self.store.apply_plan(kind, &plan).await.map_err(|e| {
            tracing::error!(
                "[Board] Failed to apply {:?} move of {} {}; containers {:?} need reconciliation: {}",
                plan.kind,
                kind.label(),
                member_id,
                plan.touched_containers(),
                e
            );
            OrderingError::from(e)
        })?;

        if !same_container {
            self.store
                .remove_from_membership(kind, slot.container_id, member_id)
                .await?;
        }
        self.store
            .insert_into_membership(kind, destination, member_id, desired_position)
            .await?;
        summary.containers = self.snapshot(kind, &summary.container_ids()).await?;

        tracing::info!(
            "[Board] Moved {} {} from {}:{} to {}:{} ({} sibling(s) shifted)",
            kind.label(),
            member_id,
            slot.container_id,
            slot.position,
            destination,
            desired_position,
            summary.affected_ids.len()
        );
        Ok(summary)
    }

    pub async fn delete_card(&self, card_id: Uuid) -> Result<Deletion, OrderingError> {
        self.delete_member(MemberKind::Card, card_id).await
    }

    /// Delete a list and its cards, compacting the board
    pub async fn delete_list(&self, list_id: Uuid) -> Result<Deletion, OrderingError> {
        self.delete_member(MemberKind::List, list_id).await
    }

    async fn delete_member(&self, kind: MemberKind, member_id: Uuid) -> Result<Deletion, OrderingError> {
        let observed = self.slot(kind, member_id).await?;
        // A list is also a container; hold it so no card moves in mid-delete
        let mut containers = vec![observed.container_id];
        if kind == MemberKind::List {
            containers.push(member_id);
        }
        let _guard = self.locks.acquire(&containers).await;

        let slot = self.slot(kind, member_id).await?;
        if slot.container_id != observed.container_id {
            return Err(OrderingError::stale(
                member_id,
                format!("{} moved while waiting to be deleted", kind.label()),
            ));
        }

        let cascaded_ids = match kind {
            MemberKind::Card => {
                self.store.delete_card(member_id).await?;
                Vec::new()
            }
            MemberKind::List => self.store.delete_list(member_id).await?,
        };
        let affected_ids = self
            .store
            .compact_after_delete(kind, slot.container_id, slot.position)
            .await?;
        self.store
            .remove_from_membership(kind, slot.container_id, member_id)
            .await?;

        tracing::info!(
            "[Board] Deleted {} {} from position {} of {} ({} compacted, {} cascaded)",
            kind.label(),
            member_id,
            slot.position,
            slot.container_id,
            affected_ids.len(),
            cascaded_ids.len()
        );
        Ok(Deletion {
            member_id,
            container_id: slot.container_id,
            position: slot.position,
            affected_ids,
            cascaded_ids,
        })
    }

    /// Membership of each container; callers hold the containers' locks
    async fn snapshot(
        &self,
        kind: MemberKind,
        containers: &[Uuid],
    ) -> Result<Vec<ContainerOrdering>, OrderingError> {
        let mut orderings = Vec::with_capacity(containers.len());
        for container_id in containers {
            orderings.push(ContainerOrdering {
                container_id: *container_id,
                member_ids: self.store.membership(kind, *container_id).await?,
            });
        }
        Ok(orderings)
    }

    /// Current ordered member ids of a container
    pub async fn ordering(&self, kind: MemberKind, container_id: Uuid) -> Result<Vec<Uuid>, OrderingError> {
        Ok(self.store.membership(kind, container_id).await?)
    }

    /// Renumber a container to `0..n` and rebuild its membership index
    ///
    /// Ties between duplicate positions are broken by id. The membership
    /// index is only rewritten when it disagrees with position order.
    pub async fn reconcile(
        &self,
        kind: MemberKind,
        container_id: Uuid,
    ) -> Result<Reconciliation, OrderingError> {
        let _guard = self.locks.acquire(&[container_id]).await;
        let membership = self.store.membership(kind, container_id).await?;
        let slots = self.store.container_slots(kind, container_id).await?;
        let current: Vec<(Uuid, Position)> = slots
            .iter()
            .map(|slot| (slot.member_id, slot.position))
            .collect();

        let changes = plan_renumber(&current);
        for (member_id, position) in &changes {
            self.store
                .set_position(
                    kind,
                    &TargetUpdate {
                        member_id: *member_id,
                        container_id,
                        position: *position,
                    },
                )
                .await?;
        }

        let mut result = Reconciliation {
            changed_ids: changes.iter().map(|(id, _)| *id).collect(),
            repaired: Vec::new(),
        };
        // container_slots is ordered by (position, id), the same order plan_renumber uses
        let ordered: Vec<Uuid> = slots.iter().map(|slot| slot.member_id).collect();
        if ordered != membership {
            self.store.set_membership(kind, container_id, &ordered).await?;
            result.repaired.push(ContainerOrdering {
                container_id,
                member_ids: ordered,
            });
        }

        if !result.is_empty() {
            tracing::warn!(
                "[Board] Reconciled {} {}: renumbered {} member(s), membership {}",
                kind.container_label(),
                container_id,
                result.changed_ids.len(),
                if result.repaired.is_empty() { "intact" } else { "rebuilt" }
            );
        }
        Ok(result)
    }

    /// Reconcile a board's lists and then every list's cards
    pub async fn reconcile_board(&self, board_id: Uuid) -> Result<Reconciliation, OrderingError> {
        let mut result = self.reconcile(MemberKind::List, board_id).await?;
        let lists = self.store.container_slots(MemberKind::List, board_id).await?;
        for list in lists {
            result.merge(self.reconcile(MemberKind::Card, list.member_id).await?);
        }
        Ok(result)
    }
}

fn check_source(
    kind: MemberKind,
    slot: &MemberSlot,
    expected_source: Option<Uuid>,
) -> Result<(), OrderingError> {
    match expected_source {
        Some(expected) if expected != slot.container_id => Err(OrderingError::stale(
            slot.member_id,
            format!(
                "{} is in {} {}, not {}",
                kind.label(),
                kind.container_label().to_lowercase(),
                slot.container_id,
                expected
            ),
        )),
        _ => Ok(()),
    }
}
