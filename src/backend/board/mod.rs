//! Board Module
//!
//! Everything that mutates boards, lists and cards on the server.
//!
//! - **`service`** - `ContainerService`: locked insert/move/delete through the
//!   ordering engine, plus reconciliation
//! - **`locks`** - per-container async mutexes
//! - **`access`** - role checks
//! - **`handlers`** - the HTTP surface; every successful mutation is
//!   appended to the activity log and publishes a `BoardEvent`

/// Role checks for board operations
pub mod access;

/// HTTP handlers for boards, lists and cards
pub mod handlers;

/// Per-container mutation locks
pub mod locks;

/// Ordered insert, move and delete
pub mod service;

pub use access::Access;
pub use locks::ContainerLocks;
pub use service::{ContainerService, Deletion, MoveSummary, Reconciliation};
