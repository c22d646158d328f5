/**
 * Move Planning
 *
 * Pure decision logic for keeping container positions contiguous. Given
 * where a member is and where it should go, `plan_move` returns the range
 * shifts and the single target update that restore a `0..n` sequence in
 * every container the move touches.
 *
 * # Cases
 *
 * - **Forward** (same container, `desired > current`): siblings in
 *   `(current, desired]` shift down by one.
 * - **Backward** (same container, `desired < current`): siblings in
 *   `[desired, current)` shift up by one.
 * - **Cross-container**: source siblings above `current` shift down, destination
 *   members at or above `desired` shift up.
 * - **No-op**: same container, same index.
 *
 * The planner performs no I/O and trusts `current_position`; the caller must
 * have read it from the store inside the same scope it applies the plan in.
 */

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

use super::error::OrderingError;
use super::range::{Position, PositionRange, RangeShift, ShiftDelta};

/// Everything the planner needs to know about one move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    pub member_id: Uuid,
    pub source: Uuid,
    pub destination: Uuid,
    /// Position read from the store, not from the client
    pub current_position: Position,
    pub desired_position: Position,
    /// Member count of the destination, not counting the moving member
    ///
    /// Within a container this is `n - 1`, across containers it is the
    /// destination's current count. `desired_position == destination_size`
    /// means "last".
    pub destination_size: Position,
}

impl MoveRequest {
    pub fn is_same_container(&self) -> bool {
        self.source == self.destination
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    NoOp,
    Forward,
    Backward,
    CrossContainer,
}

/// Final placement of the moved member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetUpdate {
    pub member_id: Uuid,
    pub container_id: Uuid,
    pub position: Position,
}

/// Position deltas plus the target update for one move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    pub kind: MoveKind,
    pub shifts: Vec<RangeShift>,
    pub target: Option<TargetUpdate>,
}

impl MovePlan {
    fn noop() -> Self {
        Self {
            kind: MoveKind::NoOp,
            shifts: Vec::new(),
            target: None,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.kind == MoveKind::NoOp
    }

    /// Container ids this plan writes to, ascending and deduplicated
    pub fn touched_containers(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self
            .shifts
            .iter()
            .map(|shift| shift.container_id)
            .chain(self.target.iter().map(|target| target.container_id))
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

/// Compute the shifts and target update for a move
///
/// # Errors
///
/// `InvalidRange` if `desired_position` is negative or greater than
/// `destination_size`.
pub fn plan_move(request: &MoveRequest) -> Result<MovePlan, OrderingError> {
    let desired = request.desired_position;
    if desired < 0 || desired > request.destination_size {
        return Err(OrderingError::InvalidRange {
            desired,
            max: request.destination_size.max(0),
        });
    }

    let current = request.current_position;
    let target = Some(TargetUpdate {
        member_id: request.member_id,
        container_id: request.destination,
        position: desired,
    });

    if request.is_same_container() {
        let container_id = request.source;
        let plan = match desired.cmp(&current) {
            Ordering::Equal => MovePlan::noop(),
            Ordering::Greater => MovePlan {
                kind: MoveKind::Forward,
                shifts: vec![RangeShift {
                    container_id,
                    range: PositionRange::new(
                        std::ops::Bound::Excluded(current),
                        std::ops::Bound::Included(desired),
                    ),
                    delta: ShiftDelta::Down,
                }],
                target,
            },
            Ordering::Less => MovePlan {
                kind: MoveKind::Backward,
                shifts: vec![RangeShift {
                    container_id,
                    range: PositionRange::new(
                        std::ops::Bound::Included(desired),
                        std::ops::Bound::Excluded(current),
                    ),
                    delta: ShiftDelta::Up,
                }],
                target,
            },
        };
        return Ok(plan);
    }

    let mut shifts = vec![plan_compaction(request.source, current)];
    // Appending never displaces anyone in the destination
    if desired < request.destination_size {
        shifts.push(RangeShift {
            container_id: request.destination,
            range: PositionRange::at_or_above(desired),
            delta: ShiftDelta::Up,
        });
    }

    Ok(MovePlan {
        kind: MoveKind::CrossContainer,
        shifts,
        target,
    })
}

/// Position for a newly created member
pub fn plan_append(max_position: Option<Position>) -> Position {
    max_position.map_or(0, |max| max + 1)
}

/// Shift that closes the gap left by deleting the member at `deleted_position`
pub fn plan_compaction(container_id: Uuid, deleted_position: Position) -> RangeShift {
    RangeShift {
        container_id,
        range: PositionRange::above(deleted_position),
        delta: ShiftDelta::Down,
    }
}

/// Anything that occupies a slot in a container
pub trait Positioned {
    fn member_id(&self) -> Uuid;
    fn container_id(&self) -> Uuid;
    fn position(&self) -> Position;
    fn place(&mut self, container_id: Uuid, position: Position);
}

/// Apply one range shift to in-memory members, returning the ids it moved
pub fn apply_shift<'a, M, I>(shift: &RangeShift, members: I) -> Vec<Uuid>
where
    M: Positioned + 'a,
    I: IntoIterator<Item = &'a mut M>,
{
    members
        .into_iter()
        .filter(|member| member.container_id() == shift.container_id)
        .filter_map(|member| {
            let moved = shift.shifted(member.position())?;
            let container_id = member.container_id();
            member.place(container_id, moved);
            Some(member.member_id())
        })
        .collect()
}

/// Apply a full plan to in-memory members, returning the sibling ids that moved
///
/// The moved member itself is not included in the returned ids.
pub fn apply_plan<M: Positioned>(plan: &MovePlan, members: &mut [M]) -> Vec<Uuid> {
    let mut affected = Vec::new();
    for shift in &plan.shifts {
        affected.extend(apply_shift(shift, members.iter_mut()));
    }
    if let Some(target) = plan.target {
        if let Some(member) = members
            .iter_mut()
            .find(|member| member.member_id() == target.member_id)
        {
            member.place(target.container_id, target.position);
        }
    }
    affected
}

/// Renumber an ordered id list to `0..n`, keeping only the entries that change
///
/// `current` is the container's members as `(id, position)`, in any order.
/// Ties are broken by id so the result is deterministic.
pub fn plan_renumber(current: &[(Uuid, Position)]) -> Vec<(Uuid, Position)> {
    let mut sorted = current.to_vec();
    sorted.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    sorted
        .into_iter()
        .enumerate()
        .filter_map(|(index, (id, position))| {
            let index = index as Position;
            (index != position).then_some((id, index))
        })
        .collect()
}

/// Whether positions are exactly `0..n` with no duplicates
pub fn is_contiguous<I: IntoIterator<Item = Position>>(positions: I) -> bool {
    let mut positions: Vec<Position> = positions.into_iter().collect();
    positions.sort_unstable();
    positions
        .iter()
        .enumerate()
        .all(|(index, position)| index as Position == *position)
}
