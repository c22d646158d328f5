//! Board domain types
//!
//! Boards own lists, lists own cards. Lists and cards are both
//! [`Positioned`](crate::shared::ordering::Positioned) members of their
//! container, which is all the ordering engine needs to know about them.

/// Boards, members and roles
pub mod board;

/// Lists
pub mod list;

/// Cards
pub mod card;

/// Card comments
pub mod comment;

/// Board and card activity log
pub mod activity;

/// Request/response bodies
pub mod api;

pub use activity::{Activity, ActivityAction};
pub use api::*;
pub use board::{Board, BoardMember, Role, Visibility};
pub use card::{Card, Label, Priority};
pub use comment::Comment;
pub use list::{List, ListWithCards};
