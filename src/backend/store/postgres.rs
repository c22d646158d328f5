/**
 * PostgreSQL board store
 *
 * Tables are created by the files under `migrations/`. Positions are plain
 * `INTEGER` columns with a non-unique `(container, position)` index: a shift
 * moves many rows in one statement, so a unique constraint would be violated
 * mid-update.
 *
 * Queries that run both standalone and inside a move transaction are written
 * once against `PgExecutor`.
 */
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::{BoardStore, MemberKind, MemberSlot, PositionStore, StoreError};
use crate::shared::error::SharedError;
use crate::shared::kanban::{Activity, Board, BoardMember, Card, Comment, Label, List};
use crate::shared::ordering::{MovePlan, Position, RangeShift, TargetUpdate};

/// Table and column names for one member kind
struct Columns {
    table: &'static str,
    container: &'static str,
    owner_table: &'static str,
    index_column: &'static str,
}

fn columns(kind: MemberKind) -> Columns {
    match kind {
        MemberKind::Card => Columns {
            table: "cards",
            container: "list_id",
            owner_table: "lists",
            index_column: "card_ids",
        },
        MemberKind::List => Columns {
            table: "lists",
            container: "board_id",
            owner_table: "boards",
            index_column: "list_ids",
        },
    }
}

fn decode_error(err: SharedError) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}

#[derive(sqlx::FromRow)]
struct SlotRow {
    id: Uuid,
    container_id: Uuid,
    position: i32,
}

impl From<SlotRow> for MemberSlot {
    fn from(row: SlotRow) -> Self {
        MemberSlot {
            member_id: row.id,
            container_id: row.container_id,
            position: row.position,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BoardRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    background: String,
    owner_id: Uuid,
    list_ids: Vec<Uuid>,
    visibility: String,
    favorited_by: Vec<Uuid>,
    is_archived: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BoardRow {
    fn into_board(self, members: Vec<BoardMember>) -> Result<Board, sqlx::Error> {
        Ok(Board {
            id: self.id,
            title: self.title,
            description: self.description,
            background: self.background,
            owner_id: self.owner_id,
            members,
            list_ids: self.list_ids,
            visibility: self.visibility.parse().map_err(decode_error)?,
            favorited_by: self.favorited_by,
            is_archived: self.is_archived,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    board_id: Uuid,
    user_id: Uuid,
    role: String,
    added_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ListRow {
    id: Uuid,
    title: String,
    board_id: Uuid,
    position: i32,
    card_ids: Vec<Uuid>,
    is_archived: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ListRow> for List {
    fn from(row: ListRow) -> Self {
        List {
            id: row.id,
            title: row.title,
            board_id: row.board_id,
            position: row.position,
            card_ids: row.card_ids,
            is_archived: row.is_archived,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CardRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    list_id: Uuid,
    board_id: Uuid,
    position: i32,
    labels: Json<Vec<Label>>,
    due_date: Option<DateTime<Utc>>,
    is_completed: bool,
    priority: String,
    assigned_members: Vec<Uuid>,
    is_archived: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CardRow> for Card {
    type Error = sqlx::Error;

    fn try_from(row: CardRow) -> Result<Self, Self::Error> {
        Ok(Card {
            id: row.id,
            title: row.title,
            description: row.description,
            list_id: row.list_id,
            board_id: row.board_id,
            position: row.position,
            labels: row.labels.0,
            due_date: row.due_date,
            is_completed: row.is_completed,
            priority: row.priority.parse().map_err(decode_error)?,
            assigned_members: row.assigned_members,
            is_archived: row.is_archived,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    card_id: Uuid,
    board_id: Uuid,
    author_id: Uuid,
    text: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            card_id: row.card_id,
            board_id: row.board_id,
            author_id: row.author_id,
            text: row.text,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ActivityRow {
    id: Uuid,
    board_id: Uuid,
    card_id: Option<Uuid>,
    actor_id: Uuid,
    action: String,
    details: Json<serde_json::Value>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ActivityRow> for Activity {
    type Error = sqlx::Error;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        Ok(Activity {
            id: row.id,
            board_id: row.board_id,
            card_id: row.card_id,
            actor_id: row.actor_id,
            action: row.action.parse().map_err(decode_error)?,
            details: row.details.0,
            created_at: row.created_at,
        })
    }
}

const BOARD_COLUMNS: &str = "id, title, description, background, owner_id, list_ids, visibility, \
     favorited_by, is_archived, created_at, updated_at";
const LIST_COLUMNS: &str =
    "id, title, board_id, position, card_ids, is_archived, created_at, updated_at";
const CARD_COLUMNS: &str = "id, title, description, list_id, board_id, position, labels, due_date, \
     is_completed, priority, assigned_members, is_archived, created_at, updated_at";
const ACTIVITY_COLUMNS: &str = "id, board_id, card_id, actor_id, action, details, created_at";

async fn shift_with<'c, E>(
    executor: E,
    kind: MemberKind,
    shift: &RangeShift,
) -> Result<Vec<Uuid>, sqlx::Error>
where
    E: PgExecutor<'c>,
{
    if shift.range.is_empty() {
        return Ok(Vec::new());
    }
    let cols = columns(kind);
    let (lower, upper) = shift.range.inclusive();
    let sql = format!(
        "UPDATE {} SET position = position + $1, updated_at = NOW() \
         WHERE {} = $2 AND position >= $3 AND ($4::INT4 IS NULL OR position <= $4) \
         RETURNING id",
        cols.table, cols.container
    );
    sqlx::query_scalar::<_, Uuid>(&sql)
        .bind(shift.delta.amount())
        .bind(shift.container_id)
        .bind(lower)
        .bind(upper)
        .fetch_all(executor)
        .await
}

async fn set_position_with<'c, E>(
    executor: E,
    kind: MemberKind,
    target: &TargetUpdate,
) -> Result<(), StoreError>
where
    E: PgExecutor<'c>,
{
    let cols = columns(kind);
    let sql = format!(
        "UPDATE {} SET {} = $1, position = $2, updated_at = NOW() WHERE id = $3",
        cols.table, cols.container
    );
    let result = sqlx::query(&sql)
        .bind(target.container_id)
        .bind(target.position)
        .bind(target.member_id)
        .execute(executor)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::not_found(kind.label(), target.member_id));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn members_by_board(
        &self,
        board_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<BoardMember>>, sqlx::Error> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT board_id, user_id, role, added_at
            FROM board_members
            WHERE board_id = ANY($1)
            ORDER BY added_at ASC
            "#,
        )
        .bind(board_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut members: HashMap<Uuid, Vec<BoardMember>> = HashMap::new();
        for row in rows {
            members.entry(row.board_id).or_default().push(BoardMember {
                user_id: row.user_id,
                role: row.role.parse().map_err(decode_error)?,
                added_at: row.added_at,
            });
        }
        Ok(members)
    }

    async fn card_exists(&self, card_id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM cards WHERE id = $1)")
            .bind(card_id)
            .fetch_one(&self.pool)
            .await
    }

    /// `false` for a card that exists but was not updated
    async fn card_updated(&self, card_id: Uuid, rows_affected: u64) -> Result<bool, StoreError> {
        if rows_affected > 0 {
            return Ok(true);
        }
        if self.card_exists(card_id).await? {
            Ok(false)
        } else {
            Err(StoreError::not_found("Card", card_id))
        }
    }

    async fn hydrate_boards(&self, rows: Vec<BoardRow>) -> Result<Vec<Board>, StoreError> {
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut members = self.members_by_board(&ids).await?;
        rows.into_iter()
            .map(|row| {
                let board_members = members.remove(&row.id).unwrap_or_default();
                row.into_board(board_members).map_err(StoreError::from)
            })
            .collect()
    }
}

#[async_trait]
impl PositionStore for PgStore {
    async fn member_slot(
        &self,
        kind: MemberKind,
        member_id: Uuid,
    ) -> Result<Option<MemberSlot>, StoreError> {
        let cols = columns(kind);
        let sql = format!(
            "SELECT id, {} AS container_id, position FROM {} WHERE id = $1",
            cols.container, cols.table
        );
        let row = sqlx::query_as::<_, SlotRow>(&sql)
            .bind(member_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(MemberSlot::from))
    }

    async fn container_size(
        &self,
        kind: MemberKind,
        container_id: Uuid,
    ) -> Result<Position, StoreError> {
        let cols = columns(kind);
        let sql = format!("SELECT COUNT(*) FROM {} WHERE {} = $1", cols.table, cols.container);
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(container_id)
            .fetch_one(&self.pool)
            .await?;
        Position::try_from(count)
            .map_err(|_| StoreError::Unavailable(format!("container {} is too large", container_id)))
    }

    async fn container_slots(
        &self,
        kind: MemberKind,
        container_id: Uuid,
    ) -> Result<Vec<MemberSlot>, StoreError> {
        let cols = columns(kind);
        let sql = format!(
            "SELECT id, {container} AS container_id, position FROM {table} \
             WHERE {container} = $1 ORDER BY position ASC, id ASC",
            container = cols.container,
            table = cols.table
        );
        let rows = sqlx::query_as::<_, SlotRow>(&sql)
            .bind(container_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(MemberSlot::from).collect())
    }

    async fn shift_range(
        &self,
        kind: MemberKind,
        shift: &RangeShift,
    ) -> Result<Vec<Uuid>, StoreError> {
        Ok(shift_with(&self.pool, kind, shift).await?)
    }

    async fn set_position(&self, kind: MemberKind, target: &TargetUpdate) -> Result<(), StoreError> {
        set_position_with(&self.pool, kind, target).await
    }

    async fn max_position(
        &self,
        kind: MemberKind,
        container_id: Uuid,
    ) -> Result<Option<Position>, StoreError> {
        let cols = columns(kind);
        let sql = format!("SELECT MAX(position) FROM {} WHERE {} = $1", cols.table, cols.container);
        let max = sqlx::query_scalar::<_, Option<i32>>(&sql)
            .bind(container_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(max)
    }

    async fn membership(&self, kind: MemberKind, container_id: Uuid) -> Result<Vec<Uuid>, StoreError> {
        let cols = columns(kind);
        let sql = format!("SELECT {} FROM {} WHERE id = $1", cols.index_column, cols.owner_table);
        sqlx::query_scalar::<_, Vec<Uuid>>(&sql)
            .bind(container_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found(kind.container_label(), container_id))
    }

    async fn set_membership(
        &self,
        kind: MemberKind,
        container_id: Uuid,
        member_ids: &[Uuid],
    ) -> Result<(), StoreError> {
        let cols = columns(kind);
        let sql = format!(
            "UPDATE {} SET {} = $1, updated_at = NOW() WHERE id = $2",
            cols.owner_table, cols.index_column
        );
        let result = sqlx::query(&sql)
            .bind(member_ids)
            .bind(container_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(kind.container_label(), container_id));
        }
        Ok(())
    }

    /// Every shift and the target update commit together or not at all
    async fn apply_plan(&self, kind: MemberKind, plan: &MovePlan) -> Result<Vec<Uuid>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut affected = Vec::new();
        for shift in &plan.shifts {
            affected.extend(shift_with(&mut *tx, kind, shift).await?);
        }
        if let Some(target) = &plan.target {
            set_position_with(&mut *tx, kind, target).await?;
        }
        tx.commit().await?;
        tracing::debug!(
            "[Store] Committed {:?} plan touching {} sibling(s)",
            plan.kind,
            affected.len()
        );
        Ok(affected)
    }
}

#[async_trait]
impl BoardStore for PgStore {
    async fn insert_board(&self, board: &Board) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO boards (id, title, description, background, owner_id, list_ids,
                                visibility, favorited_by, is_archived, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(board.id)
        .bind(&board.title)
        .bind(&board.description)
        .bind(&board.background)
        .bind(board.owner_id)
        .bind(&board.list_ids)
        .bind(board.visibility.as_str())
        .bind(&board.favorited_by)
        .bind(board.is_archived)
        .bind(board.created_at)
        .bind(board.updated_at)
        .execute(&mut *tx)
        .await?;

        for member in &board.members {
            sqlx::query(
                r#"
                INSERT INTO board_members (board_id, user_id, role, added_at)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(board.id)
            .bind(member.user_id)
            .bind(member.role.as_str())
            .bind(member.added_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn get_board(&self, board_id: Uuid) -> Result<Option<Board>, StoreError> {
        let sql = format!("SELECT {} FROM boards WHERE id = $1", BOARD_COLUMNS);
        let row = sqlx::query_as::<_, BoardRow>(&sql)
            .bind(board_id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(self.hydrate_boards(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn boards_for_user(&self, user_id: Uuid) -> Result<Vec<Board>, StoreError> {
        let sql = format!(
            "SELECT {} FROM boards b WHERE b.owner_id = $1 \
             OR EXISTS (SELECT 1 FROM board_members m WHERE m.board_id = b.id AND m.user_id = $1) \
             ORDER BY b.updated_at DESC",
            BOARD_COLUMNS
        );
        let rows = sqlx::query_as::<_, BoardRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        self.hydrate_boards(rows).await
    }

    async fn public_boards(&self, search: Option<&str>) -> Result<Vec<Board>, StoreError> {
        let pattern = search
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(|term| format!("%{}%", term));
        let sql = format!(
            "SELECT {} FROM boards WHERE visibility <> 'private' AND NOT is_archived \
             AND ($1::TEXT IS NULL OR title ILIKE $1) ORDER BY updated_at DESC",
            BOARD_COLUMNS
        );
        let rows = sqlx::query_as::<_, BoardRow>(&sql)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;
        self.hydrate_boards(rows).await
    }

    async fn update_board(&self, board: &Board) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE boards SET title = $1, description = $2, background = $3, visibility = $4,
                              updated_at = $5
            WHERE id = $6
            "#,
        )
        .bind(&board.title)
        .bind(&board.description)
        .bind(&board.background)
        .bind(board.visibility.as_str())
        .bind(board.updated_at)
        .bind(board.id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Board", board.id));
        }
        Ok(())
    }

    async fn upsert_board_member(
        &self,
        board_id: Uuid,
        member: &BoardMember,
    ) -> Result<Board, StoreError> {
        let mut tx = self.pool.begin().await?;
        let touched = sqlx::query("UPDATE boards SET updated_at = NOW() WHERE id = $1")
            .bind(board_id)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            return Err(StoreError::not_found("Board", board_id));
        }
        sqlx::query(
            r#"
            INSERT INTO board_members (board_id, user_id, role, added_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (board_id, user_id) DO UPDATE SET role = EXCLUDED.role
            "#,
        )
        .bind(board_id)
        .bind(member.user_id)
        .bind(member.role.as_str())
        .bind(member.added_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        self.get_board(board_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Board", board_id))
    }

    async fn remove_board_member(
        &self,
        board_id: Uuid,
        user_id: Uuid,
    ) -> Result<Board, StoreError> {
        sqlx::query("DELETE FROM board_members WHERE board_id = $1 AND user_id = $2")
            .bind(board_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("UPDATE boards SET updated_at = NOW() WHERE id = $1")
            .bind(board_id)
            .execute(&self.pool)
            .await?;
        self.get_board(board_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Board", board_id))
    }

    async fn delete_board(&self, board_id: Uuid) -> Result<(), StoreError> {
        // lists, cards, members, comments and activity cascade
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(board_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Board", board_id));
        }
        Ok(())
    }

    async fn insert_list(&self, list: &List) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO lists (id, title, board_id, position, card_ids, is_archived, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(list.id)
        .bind(&list.title)
        .bind(list.board_id)
        .bind(list.position)
        .bind(&list.card_ids)
        .bind(list.is_archived)
        .bind(list.created_at)
        .bind(list.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_list(&self, list_id: Uuid) -> Result<Option<List>, StoreError> {
        let sql = format!("SELECT {} FROM lists WHERE id = $1", LIST_COLUMNS);
        let row = sqlx::query_as::<_, ListRow>(&sql)
            .bind(list_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(List::from))
    }

    async fn lists_for_board(
        &self,
        board_id: Uuid,
        include_archived: bool,
    ) -> Result<Vec<List>, StoreError> {
        let sql = format!(
            "SELECT {} FROM lists WHERE board_id = $1 AND ($2 OR NOT is_archived) \
             ORDER BY position ASC, id ASC",
            LIST_COLUMNS
        );
        let rows = sqlx::query_as::<_, ListRow>(&sql)
            .bind(board_id)
            .bind(include_archived)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(List::from).collect())
    }

    async fn update_list(&self, list: &List) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE lists SET title = $1, is_archived = $2, updated_at = $3 WHERE id = $4",
        )
        .bind(&list.title)
        .bind(list.is_archived)
        .bind(list.updated_at)
        .bind(list.id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("List", list.id));
        }
        Ok(())
    }

    async fn delete_list(&self, list_id: Uuid) -> Result<Vec<Uuid>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let deleted = sqlx::query_scalar::<_, Uuid>("DELETE FROM cards WHERE list_id = $1 RETURNING id")
            .bind(list_id)
            .fetch_all(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM lists WHERE id = $1")
            .bind(list_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("List", list_id));
        }
        tx.commit().await?;
        Ok(deleted)
    }

    async fn insert_card(&self, card: &Card) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO cards (id, title, description, list_id, board_id, position, labels, due_date,
                               is_completed, priority, assigned_members, is_archived,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(card.id)
        .bind(&card.title)
        .bind(&card.description)
        .bind(card.list_id)
        .bind(card.board_id)
        .bind(card.position)
        .bind(Json(&card.labels))
        .bind(card.due_date)
        .bind(card.is_completed)
        .bind(card.priority.as_str())
        .bind(&card.assigned_members)
        .bind(card.is_archived)
        .bind(card.created_at)
        .bind(card.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_card(&self, card_id: Uuid) -> Result<Option<Card>, StoreError> {
        let sql = format!("SELECT {} FROM cards WHERE id = $1", CARD_COLUMNS);
        let row = sqlx::query_as::<_, CardRow>(&sql)
            .bind(card_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Card::try_from).transpose()?)
    }

    async fn cards_for_list(
        &self,
        list_id: Uuid,
        include_archived: bool,
    ) -> Result<Vec<Card>, StoreError> {
        let sql = format!(
            "SELECT {} FROM cards WHERE list_id = $1 AND ($2 OR NOT is_archived) \
             ORDER BY position ASC, id ASC",
            CARD_COLUMNS
        );
        let rows = sqlx::query_as::<_, CardRow>(&sql)
            .bind(list_id)
            .bind(include_archived)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(Card::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn update_card(&self, card: &Card) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE cards SET title = $1, description = $2, labels = $3, due_date = $4,
                             is_completed = $5, priority = $6, is_archived = $7, updated_at = $8
            WHERE id = $9
            "#,
        )
        .bind(&card.title)
        .bind(&card.description)
        .bind(Json(&card.labels))
        .bind(card.due_date)
        .bind(card.is_completed)
        .bind(card.priority.as_str())
        .bind(card.is_archived)
        .bind(card.updated_at)
        .bind(card.id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Card", card.id));
        }
        Ok(())
    }

    async fn delete_card(&self, card_id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(card_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Card", card_id));
        }
        Ok(())
    }

    async fn assign_card_member(&self, card_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE cards SET assigned_members = array_append(assigned_members, $2), updated_at = NOW()
            WHERE id = $1 AND NOT ($2 = ANY(assigned_members))
            "#,
        )
        .bind(card_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        self.card_updated(card_id, result.rows_affected()).await
    }

    async fn unassign_card_member(
        &self,
        card_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE cards SET assigned_members = array_remove(assigned_members, $2), updated_at = NOW()
            WHERE id = $1 AND $2 = ANY(assigned_members)
            "#,
        )
        .bind(card_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        self.card_updated(card_id, result.rows_affected()).await
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO card_comments (id, card_id, board_id, author_id, text, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(comment.id)
        .bind(comment.card_id)
        .bind(comment.board_id)
        .bind(comment.author_id)
        .bind(&comment.text)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            let missing_card =
                matches!(&err, sqlx::Error::Database(db) if db.is_foreign_key_violation());
            if missing_card {
                StoreError::not_found("Card", comment.card_id)
            } else {
                StoreError::from(err)
            }
        })?;
        Ok(())
    }

    async fn comments_for_card(&self, card_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, card_id, board_id, author_id, text, created_at
            FROM card_comments
            WHERE card_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(card_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn record_activity(&self, activity: &Activity) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO activity (id, board_id, card_id, actor_id, action, details, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(activity.id)
        .bind(activity.board_id)
        .bind(activity.card_id)
        .bind(activity.actor_id)
        .bind(activity.action.as_str())
        .bind(Json(&activity.details))
        .bind(activity.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn activity_for_board(
        &self,
        board_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Activity>, StoreError> {
        let sql = format!(
            "SELECT {} FROM activity WHERE board_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2",
            ACTIVITY_COLUMNS
        );
        let rows = sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(board_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(Activity::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn activity_for_card(&self, card_id: Uuid, limit: i64) -> Result<Vec<Activity>, StoreError> {
        let sql = format!(
            "SELECT {} FROM activity WHERE card_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2",
            ACTIVITY_COLUMNS
        );
        let rows = sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(card_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(Activity::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn toggle_favorite(&self, board_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            UPDATE boards SET favorited_by = CASE
                WHEN $2 = ANY(favorited_by) THEN array_remove(favorited_by, $2)
                ELSE array_append(favorited_by, $2)
            END
            WHERE id = $1
            RETURNING $2 = ANY(favorited_by)
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Board", board_id))
    }
}
