//! Ordering Error Types
//!
//! Every position operation (plan, insert, move, delete) fails with one of
//! these variants. Callers are expected to re-fetch the affected container
//! after any of them except `ForeignContainer`, which is caught before any
//! position is read.

use thiserror::Error;
use uuid::Uuid;

use super::range::Position;

/// Errors raised while planning or applying position changes
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderingError {
    /// Desired index is negative or past the end of the destination
    ///
    /// No state has been mutated.
    #[error("Position {desired} is out of range (expected 0..={max})")]
    InvalidRange {
        /// Index the caller asked for
        desired: Position,
        /// Largest index accepted for the destination
        max: Position,
    },

    /// Referenced member or container does not exist
    ///
    /// No state has been mutated.
    #[error("{what} not found")]
    NotFound {
        /// Human-readable description of the missing entity
        what: String,
    },

    /// The member is no longer where the caller thinks it is
    ///
    /// No state has been mutated; re-fetch and retry.
    #[error("Stale state for {member_id}: {message}")]
    StaleState {
        /// Member whose stored slot disagreed with the request
        member_id: Uuid,
        /// What disagreed
        message: String,
    },

    /// The destination container belongs to a different parent than the member
    ///
    /// Cards only move between lists of the same board. No state has been
    /// mutated.
    #[error("{member_id} cannot move into {container_id}: {message}")]
    ForeignContainer {
        member_id: Uuid,
        container_id: Uuid,
        message: String,
    },

    /// A store operation could not complete
    ///
    /// Partial application is possible and is not rolled back.
    #[error("Storage unavailable: {message}")]
    StorageUnavailable {
        /// Underlying store failure
        message: String,
    },
}

impl OrderingError {
    /// Create a not-found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create a stale-state error
    pub fn stale(member_id: Uuid, message: impl Into<String>) -> Self {
        Self::StaleState {
            member_id,
            message: message.into(),
        }
    }

    pub fn foreign(member_id: Uuid, container_id: Uuid, message: impl Into<String>) -> Self {
        Self::ForeignContainer {
            member_id,
            container_id,
            message: message.into(),
        }
    }

    /// Create a storage-unavailable error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            message: message.into(),
        }
    }

    /// Whether the affected containers may have been partially written
    pub fn needs_reconciliation(&self) -> bool {
        matches!(self, Self::StorageUnavailable { .. })
    }
}
