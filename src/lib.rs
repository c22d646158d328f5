//! Taskboard - Main Library
//!
//! Taskboard is a collaborative kanban server: boards contain ordered lists,
//! lists contain ordered cards, and every change is pushed to the board's
//! subscribers in real time.
//!
//! # Module Structure
//!
//! - **`shared`** - Types and pure logic with no server dependency
//!   - Board, list and card models, API request/response bodies
//!   - The position ordering engine (`shared::ordering`)
//!   - Realtime event types, configuration, error types
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server and routes
//!   - Position store adapters (in-memory and PostgreSQL)
//!   - Container mutation service with per-container locking
//!   - Per-board SSE broadcasting
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - enables the backend modules and the
//!   `taskboard-server` binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use taskboard::backend::server::create_app;
//! use taskboard::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::builder().jwt_secret("change-me").build()?;
//! let app = create_app(config).await;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Ordering Model
//!
//! Every list and card carries an integer `position`, its zero-based rank in
//! the parent container. Positions in a container always form `0..n`. Moves
//! are planned as pure range shifts (`shared::ordering::plan_move`) and then
//! applied by a `PositionStore`.

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
