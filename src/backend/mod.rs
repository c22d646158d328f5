//! Backend Module
//!
//! Server-side code for the board service: an Axum HTTP API over a position
//! store, with per-board Server-Sent Events.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - initialization, `AppState`, configuration
//! - **`routes`** - router assembly
//! - **`board`** - `ContainerService`, container locks, access rules and
//!   the board/list/card handlers
//! - **`store`** - `PositionStore`/`BoardStore` and their in-memory and
//!   PostgreSQL adapters
//! - **`realtime`** - per-board broadcast channels and the SSE handler
//! - **`auth`** - JWT verification
//! - **`middleware`** - bearer token middleware and the `AuthUser` extractor
//! - **`error`** - `BackendError` and its JSON rendering
//!
//! # Request Flow
//!
//! A move request passes `auth_middleware`, the handler checks the caller's
//! role on the board, `ContainerService` locks the source and destination
//! containers, re-reads positions, plans the move with
//! `shared::ordering::plan_move` and applies it through the store. On
//! success the handler publishes a `card_moved`/`list_moved` event carrying
//! the new orderings of every touched container.
//!
//! # Error Handling
//!
//! Handlers return `Result<_, BackendError>`. Ordering errors map to 400
//! (invalid range), 404 (missing member or container), 409 (stale state) and
//! 503 (storage). The JSON body carries `"resync": true` when the client
//! should re-fetch the board.

/// Bootstrap, state and environment config
pub mod server;

/// Route configuration
pub mod routes;

/// Board, list and card mutations and handlers
pub mod board;

/// Storage adapters
pub mod store;

/// Per-board event channels and SSE
pub mod realtime;

/// Backend error types
pub mod error;

/// Authentication tokens
pub mod auth;

/// Bearer token guard
pub mod middleware;

pub use board::ContainerService;
pub use error::BackendError;
pub use realtime::{handle_board_subscription, BoardChannels};
pub use server::create_app;
pub use store::{BoardStore, MemoryStore, PgStore, PositionStore};
