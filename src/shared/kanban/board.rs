//! Board, membership and access roles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::shared::error::{validate_length, SharedError};

pub const MAX_BOARD_TITLE: usize = 100;
pub const MAX_BOARD_DESCRIPTION: usize = 500;
pub const DEFAULT_BACKGROUND: &str = "#0079bf";

/// Role a user holds on a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Member,
    /// Read-only; may move cards but not delete or archive
    Observer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
            Self::Observer => "observer",
        }
    }
}

impl FromStr for Role {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            "observer" => Ok(Self::Observer),
            other => Err(SharedError::validation("role", format!("Unknown role '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Team,
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Team => "team",
            Self::Public => "public",
        }
    }
}

impl FromStr for Visibility {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Self::Private),
            "team" => Ok(Self::Team),
            "public" => Ok(Self::Public),
            other => Err(SharedError::validation(
                "visibility",
                format!("Unknown visibility '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardMember {
    pub user_id: Uuid,
    pub role: Role,
    pub added_at: DateTime<Utc>,
}

/// A board: the container that owns lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub background: String,
    pub owner_id: Uuid,
    pub members: Vec<BoardMember>,
    /// Secondary index of list ids, kept in position order
    pub list_ids: Vec<Uuid>,
    pub visibility: Visibility,
    /// Users who starred the board
    pub favorited_by: Vec<Uuid>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    /// Create a validated board owned by `owner_id`
    ///
    /// The owner is also recorded as the first member with the `Owner` role.
    pub fn new(
        title: &str,
        description: Option<&str>,
        visibility: Visibility,
        owner_id: Uuid,
    ) -> Result<Self, SharedError> {
        let title = validate_length("title", title, 1, MAX_BOARD_TITLE, "Board title")?;
        let description = description
            .map(|d| validate_length("description", d, 0, MAX_BOARD_DESCRIPTION, "Description"))
            .transpose()?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            title,
            description,
            background: DEFAULT_BACKGROUND.to_string(),
            owner_id,
            members: vec![BoardMember {
                user_id: owner_id,
                role: Role::Owner,
                added_at: now,
            }],
            list_ids: Vec::new(),
            visibility,
            favorited_by: Vec::new(),
            is_archived: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_owner(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    pub fn is_favorite(&self, user_id: Uuid) -> bool {
        self.favorited_by.contains(&user_id)
    }

    /// Role of `user_id`, with the owner always reported as `Owner`
    pub fn role_of(&self, user_id: Uuid) -> Option<Role> {
        if self.is_owner(user_id) {
            return Some(Role::Owner);
        }
        self.members
            .iter()
            .find(|member| member.user_id == user_id)
            .map(|member| member.role)
    }
}
