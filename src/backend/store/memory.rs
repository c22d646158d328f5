/**
 * In-memory board store
 *
 * All tables live behind one `tokio::sync::RwLock`, so each trait call sees
 * and leaves a consistent snapshot. Range shifts reuse the pure
 * `apply_shift` from the ordering engine.
 *
 * `set_available(false)` makes every call fail with `Unavailable`, which is
 * how storage outages are exercised without a database.
 */
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BoardStore, MemberKind, MemberSlot, PositionStore, StoreError};
use crate::shared::kanban::{Activity, Board, BoardMember, Card, Comment, List, Visibility};
use crate::shared::ordering::{apply_shift, Position, Positioned, RangeShift, TargetUpdate};

#[derive(Debug, Default)]
struct Tables {
    boards: HashMap<Uuid, Board>,
    lists: HashMap<Uuid, List>,
    cards: HashMap<Uuid, Card>,
    /// Append order is creation order
    comments: Vec<Comment>,
    activity: Vec<Activity>,
}

impl Tables {
    fn slots(&self, kind: MemberKind, container_id: Uuid) -> Vec<MemberSlot> {
        let mut slots: Vec<MemberSlot> = match kind {
            MemberKind::Card => collect_slots(self.cards.values(), container_id),
            MemberKind::List => collect_slots(self.lists.values(), container_id),
        };
        slots.sort_by(|a, b| {
            a.position
                .cmp(&b.position)
                .then_with(|| a.member_id.cmp(&b.member_id))
        });
        slots
    }

    fn membership_mut(
        &mut self,
        kind: MemberKind,
        container_id: Uuid,
    ) -> Result<&mut Vec<Uuid>, StoreError> {
        match kind {
            MemberKind::Card => self
                .lists
                .get_mut(&container_id)
                .map(|list| &mut list.card_ids)
                .ok_or_else(|| StoreError::not_found("List", container_id)),
            MemberKind::List => self
                .boards
                .get_mut(&container_id)
                .map(|board| &mut board.list_ids)
                .ok_or_else(|| StoreError::not_found("Board", container_id)),
        }
    }
}

fn collect_slots<'a, M, I>(members: I, container_id: Uuid) -> Vec<MemberSlot>
where
    M: Positioned + 'a,
    I: Iterator<Item = &'a M>,
{
    members
        .filter(|member| member.container_id() == container_id)
        .map(slot_of)
        .collect()
}

fn slot_of<M: Positioned>(member: &M) -> MemberSlot {
    MemberSlot {
        member_id: member.member_id(),
        container_id: member.container_id(),
        position: member.position(),
    }
}

#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate a storage outage (`false`) or recovery (`true`)
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        }
    }
}

#[async_trait]
impl PositionStore for MemoryStore {
    async fn member_slot(
        &self,
        kind: MemberKind,
        member_id: Uuid,
    ) -> Result<Option<MemberSlot>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(match kind {
            MemberKind::Card => tables.cards.get(&member_id).map(slot_of),
            MemberKind::List => tables.lists.get(&member_id).map(slot_of),
        })
    }

    async fn container_size(
        &self,
        kind: MemberKind,
        container_id: Uuid,
    ) -> Result<Position, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.slots(kind, container_id).len() as Position)
    }

    async fn container_slots(
        &self,
        kind: MemberKind,
        container_id: Uuid,
    ) -> Result<Vec<MemberSlot>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.slots(kind, container_id))
    }

    async fn shift_range(
        &self,
        kind: MemberKind,
        shift: &RangeShift,
    ) -> Result<Vec<Uuid>, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        Ok(match kind {
            MemberKind::Card => apply_shift(shift, tables.cards.values_mut()),
            MemberKind::List => apply_shift(shift, tables.lists.values_mut()),
        })
    }

    async fn set_position(&self, kind: MemberKind, target: &TargetUpdate) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let placed = match kind {
            MemberKind::Card => tables
                .cards
                .get_mut(&target.member_id)
                .map(|card| card.place(target.container_id, target.position)),
            MemberKind::List => tables
                .lists
                .get_mut(&target.member_id)
                .map(|list| list.place(target.container_id, target.position)),
        };
        placed.ok_or_else(|| StoreError::not_found(kind.label(), target.member_id))
    }

    async fn max_position(
        &self,
        kind: MemberKind,
        container_id: Uuid,
    ) -> Result<Option<Position>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .slots(kind, container_id)
            .last()
            .map(|slot| slot.position))
    }

    async fn membership(&self, kind: MemberKind, container_id: Uuid) -> Result<Vec<Uuid>, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        tables.membership_mut(kind, container_id).map(|ids| ids.clone())
    }

    async fn set_membership(
        &self,
        kind: MemberKind,
        container_id: Uuid,
        member_ids: &[Uuid],
    ) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let ids = tables.membership_mut(kind, container_id)?;
        *ids = member_ids.to_vec();
        Ok(())
    }
}

#[async_trait]
impl BoardStore for MemoryStore {
    async fn insert_board(&self, board: &Board) -> Result<(), StoreError> {
        self.check_available()?;
        self.tables.write().await.boards.insert(board.id, board.clone());
        Ok(())
    }

    async fn get_board(&self, board_id: Uuid) -> Result<Option<Board>, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().await.boards.get(&board_id).cloned())
    }

    async fn boards_for_user(&self, user_id: Uuid) -> Result<Vec<Board>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut boards: Vec<Board> = tables
            .boards
            .values()
            .filter(|board| board.is_owner(user_id) || board.role_of(user_id).is_some())
            .cloned()
            .collect();
        boards.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(boards)
    }

    async fn public_boards(&self, search: Option<&str>) -> Result<Vec<Board>, StoreError> {
        self.check_available()?;
        let needle = search.map(|term| term.trim().to_lowercase());
        let tables = self.tables.read().await;
        let mut boards: Vec<Board> = tables
            .boards
            .values()
            .filter(|board| board.visibility != Visibility::Private && !board.is_archived)
            .filter(|board| match &needle {
                Some(needle) => board.title.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .cloned()
            .collect();
        boards.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(boards)
    }

    async fn update_board(&self, board: &Board) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let stored = tables
            .boards
            .get_mut(&board.id)
            .ok_or_else(|| StoreError::not_found("Board", board.id))?;
        stored.title = board.title.clone();
        stored.description = board.description.clone();
        stored.background = board.background.clone();
        stored.visibility = board.visibility;
        stored.updated_at = board.updated_at;
        Ok(())
    }
    async fn upsert_board_member(
        &self,
        board_id: Uuid,
        member: &BoardMember,
    ) -> Result<Board, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let board = tables
            .boards
            .get_mut(&board_id)
            .ok_or_else(|| StoreError::not_found("Board", board_id))?;
        match board
            .members
            .iter_mut()
            .find(|existing| existing.user_id == member.user_id)
        {
            Some(existing) => existing.role = member.role,
            None => board.members.push(member.clone()),
        }
        board.updated_at = chrono::Utc::now();
        Ok(board.clone())
    }

    async fn remove_board_member(
        &self,
        board_id: Uuid,
        user_id: Uuid,
    ) -> Result<Board, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let board = tables
            .boards
            .get_mut(&board_id)
            .ok_or_else(|| StoreError::not_found("Board", board_id))?;
        board.members.retain(|member| member.user_id != user_id);
        board.updated_at = chrono::Utc::now();
        Ok(board.clone())
    }

    async fn delete_board(&self, board_id: Uuid) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        tables
            .boards
            .remove(&board_id)
            .ok_or_else(|| StoreError::not_found("Board", board_id))?;
        tables.lists.retain(|_, list| list.board_id != board_id);
        tables.cards.retain(|_, card| card.board_id != board_id);
        tables.comments.retain(|comment| comment.board_id != board_id);
        tables.activity.retain(|entry| entry.board_id != board_id);
        Ok(())
    }

    async fn insert_list(&self, list: &List) -> Result<(), StoreError> {
        self.check_available()?;
        self.tables.write().await.lists.insert(list.id, list.clone());
        Ok(())
    }

    async fn get_list(&self, list_id: Uuid) -> Result<Option<List>, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().await.lists.get(&list_id).cloned())
    }

    async fn lists_for_board(
        &self,
        board_id: Uuid,
        include_archived: bool,
    ) -> Result<Vec<List>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut lists: Vec<List> = tables
            .lists
            .values()
            .filter(|list| list.board_id == board_id && (include_archived || !list.is_archived))
            .cloned()
            .collect();
        lists.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
        Ok(lists)
    }

    async fn update_list(&self, list: &List) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let stored = tables
            .lists
            .get_mut(&list.id)
            .ok_or_else(|| StoreError::not_found("List", list.id))?;
        stored.title = list.title.clone();
        stored.is_archived = list.is_archived;
        stored.updated_at = list.updated_at;
        Ok(())
    }

    async fn delete_list(&self, list_id: Uuid) -> Result<Vec<Uuid>, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        tables
            .lists
            .remove(&list_id)
            .ok_or_else(|| StoreError::not_found("List", list_id))?;
        let deleted: Vec<Uuid> = tables
            .cards
            .values()
            .filter(|card| card.list_id == list_id)
            .map(|card| card.id)
            .collect();
        for card_id in &deleted {
            tables.cards.remove(card_id);
        }
        tables
            .comments
            .retain(|comment| !deleted.contains(&comment.card_id));
        Ok(deleted)
    }

    async fn insert_card(&self, card: &Card) -> Result<(), StoreError> {
        self.check_available()?;
        self.tables.write().await.cards.insert(card.id, card.clone());
        Ok(())
    }

    async fn get_card(&self, card_id: Uuid) -> Result<Option<Card>, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().await.cards.get(&card_id).cloned())
    }

    async fn cards_for_list(
        &self,
        list_id: Uuid,
        include_archived: bool,
    ) -> Result<Vec<Card>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut cards: Vec<Card> = tables
            .cards
            .values()
            .filter(|card| card.list_id == list_id && (include_archived || !card.is_archived))
            .cloned()
            .collect();
        cards.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
        Ok(cards)
    }

    async fn update_card(&self, card: &Card) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let stored = tables
            .cards
            .get_mut(&card.id)
            .ok_or_else(|| StoreError::not_found("Card", card.id))?;
        let assigned = std::mem::take(&mut stored.assigned_members);
        let (list_id, position) = (stored.list_id, stored.position);
        *stored = card.clone();
        stored.list_id = list_id;
        stored.position = position;
        stored.assigned_members = assigned;
        Ok(())
    }

    async fn delete_card(&self, card_id: Uuid) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        tables
            .cards
            .remove(&card_id)
            .ok_or_else(|| StoreError::not_found("Card", card_id))?;
        tables.comments.retain(|comment| comment.card_id != card_id);
        Ok(())
    }

    async fn assign_card_member(&self, card_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let card = tables
            .cards
            .get_mut(&card_id)
            .ok_or_else(|| StoreError::not_found("Card", card_id))?;
        if card.is_assigned(user_id) {
            return Ok(false);
        }
        card.assigned_members.push(user_id);
        card.updated_at = chrono::Utc::now();
        Ok(true)
    }

    async fn unassign_card_member(
        &self,
        card_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let card = tables
            .cards
            .get_mut(&card_id)
            .ok_or_else(|| StoreError::not_found("Card", card_id))?;
        let before = card.assigned_members.len();
        card.assigned_members.retain(|id| *id != user_id);
        if card.assigned_members.len() == before {
            return Ok(false);
        }
        card.updated_at = chrono::Utc::now();
        Ok(true)
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if !tables.cards.contains_key(&comment.card_id) {
            return Err(StoreError::not_found("Card", comment.card_id));
        }
        tables.comments.push(comment.clone());
        Ok(())
    }

    async fn comments_for_card(&self, card_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .iter()
            .filter(|comment| comment.card_id == card_id)
            .cloned()
            .collect())
    }

    async fn record_activity(&self, activity: &Activity) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if !tables.boards.contains_key(&activity.board_id) {
            return Err(StoreError::not_found("Board", activity.board_id));
        }
        tables.activity.push(activity.clone());
        Ok(())
    }

    async fn activity_for_board(
        &self,
        board_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Activity>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(newest(&tables.activity, limit, |entry| entry.board_id == board_id))
    }

    async fn activity_for_card(&self, card_id: Uuid, limit: i64) -> Result<Vec<Activity>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(newest(&tables.activity, limit, |entry| entry.card_id == Some(card_id)))
    }

    async fn toggle_favorite(&self, board_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let board = tables
            .boards
            .get_mut(&board_id)
            .ok_or_else(|| StoreError::not_found("Board", board_id))?;
        if board.is_favorite(user_id) {
            board.favorited_by.retain(|id| *id != user_id);
            Ok(false)
        } else {
            board.favorited_by.push(user_id);
            Ok(true)
        }
    }
}

fn newest<F>(entries: &[Activity], limit: i64, keep: F) -> Vec<Activity>
where
    F: Fn(&Activity) -> bool,
{
    let limit = usize::try_from(limit).unwrap_or(0);
    entries
        .iter()
        .rev()
        .filter(|entry| keep(entry))
        .take(limit)
        .cloned()
        .collect()
}
