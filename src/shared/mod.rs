//! Shared Module
//!
//! This module contains types and logic that do not depend on the server:
//! the board domain model, the request/response bodies of the HTTP API,
//! realtime event types, and the position ordering engine.
//!
//! # Overview
//!
//! Everything here is plain data plus pure functions. Nothing in this module
//! performs I/O, which is what lets the ordering engine be tested
//! exhaustively without a store.

/// Board domain model and API bodies
pub mod kanban;

/// Position ordering engine
pub mod ordering;

/// Real-time event system
pub mod event;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use error::SharedError;
pub use event::{BoardEvent, EventType};
pub use ordering::OrderingError;
