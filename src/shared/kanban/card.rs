//! Cards: members of a list

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::shared::error::{validate_length, SharedError};
use crate::shared::ordering::{Position, Positioned};

pub const MAX_CARD_TITLE: usize = 200;
pub const MAX_CARD_DESCRIPTION: usize = 2000;
pub const MAX_LABEL_NAME: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl FromStr for Priority {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(SharedError::validation(
                "priority",
                format!("Unknown priority '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub color: String,
}

impl Label {
    pub fn validate(&self) -> Result<Label, SharedError> {
        let name = validate_length("labels.name", &self.name, 1, MAX_LABEL_NAME, "Label name")?;
        Ok(Label {
            name,
            color: self.color.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub list_id: Uuid,
    /// Denormalized so access checks need a single board read
    pub board_id: Uuid,
    pub position: Position,
    pub labels: Vec<Label>,
    pub due_date: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub priority: Priority,
    /// Board users assigned to the card
    pub assigned_members: Vec<Uuid>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Create a validated card; the position is assigned by the store
    pub fn new(
        title: &str,
        description: Option<&str>,
        list_id: Uuid,
        board_id: Uuid,
    ) -> Result<Self, SharedError> {
        let title = validate_length("title", title, 1, MAX_CARD_TITLE, "Card title")?;
        let description = validate_description(description)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            title,
            description,
            list_id,
            board_id,
            position: 0,
            labels: Vec::new(),
            due_date: None,
            is_completed: false,
            priority: Priority::default(),
            assigned_members: Vec::new(),
            is_archived: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_assigned(&self, user_id: Uuid) -> bool {
        self.assigned_members.contains(&user_id)
    }
}

pub(crate) fn validate_description(description: Option<&str>) -> Result<Option<String>, SharedError> {
    description
        .map(|d| validate_length("description", d, 0, MAX_CARD_DESCRIPTION, "Description"))
        .transpose()
}

impl Positioned for Card {
    fn member_id(&self) -> Uuid {
        self.id
    }

    fn container_id(&self) -> Uuid {
        self.list_id
    }

    fn position(&self) -> Position {
        self.position
    }

    fn place(&mut self, container_id: Uuid, position: Position) {
        self.list_id = container_id;
        self.position = position;
        self.updated_at = Utc::now();
    }
}
