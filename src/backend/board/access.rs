//! Board access rules
//!
//! | Access   | Granted to                                         |
//! |----------|----------------------------------------------------|
//! | `View`   | any member, or anyone if the board is not private  |
//! | `Edit`   | any member, observers included                     |
//! | `Delete` | the owner and members other than observers         |
//! | `Manage` | the owner and admins                               |
//! | `Own`    | the owner                                          |
//!
//! `Edit` covers creating, updating and moving lists and cards. `Delete`
//! covers deleting and archiving them.

use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::shared::kanban::{Board, Role, Visibility};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    View,
    Edit,
    Delete,
    Manage,
    Own,
}

/// Whether `user_id` may perform `access` on `board`
pub fn allows(board: &Board, user_id: Uuid, access: Access) -> bool {
    let role = if board.is_owner(user_id) {
        Some(Role::Owner)
    } else {
        board.role_of(user_id)
    };
    match access {
        Access::View => role.is_some() || board.visibility != Visibility::Private,
        Access::Edit => role.is_some(),
        Access::Delete => matches!(role, Some(Role::Owner | Role::Admin | Role::Member)),
        Access::Manage => matches!(role, Some(Role::Owner | Role::Admin)),
        Access::Own => role == Some(Role::Owner),
    }
}

/// `allows`, as a 403 error
pub fn authorize(board: &Board, user_id: Uuid, access: Access) -> Result<(), BackendError> {
    if allows(board, user_id, access) {
        Ok(())
    } else {
        tracing::warn!(
            "[Board] User {} denied {:?} access to board {}",
            user_id,
            access,
            board.id
        );
        Err(BackendError::forbidden("Access denied"))
    }
}
