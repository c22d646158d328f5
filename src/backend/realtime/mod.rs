//! Real-time Update Module
//!
//! Board-scoped event delivery over Server-Sent Events.
//!
//! - **`broadcast`** - `BoardChannels`, one broadcast channel per board
//! - **`subscription`** - the SSE handler with `?types=` filtering
//!
//! Handlers publish a `BoardEvent` after every successful mutation. Move
//! events carry the new ordered id list of each touched container so
//! clients can resynchronize without a full re-fetch.

/// Per-board event broadcasting
pub mod broadcast;

/// Server-Sent Events subscription handler
pub mod subscription;

pub use broadcast::BoardChannels;
pub use subscription::handle_board_subscription;
