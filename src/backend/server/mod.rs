//! Server Module
//!
//! Initialization and configuration of the Axum HTTP server.
//!
//! - **`state`** - `AppState` and its `FromRef` implementations
//! - **`config`** - environment loading and store selection
//! - **`init`** - `create_app`: state, background cleanup, router
//!
//! # Initialization Flow
//!
//! 1. **Configuration**: `AppConfig::from_env` (or a config built in code)
//! 2. **Store**: PostgreSQL when `DATABASE_URL` is set and reachable,
//!    otherwise the in-memory store
//! 3. **State**: `ContainerService` over the store plus `BoardChannels`
//! 4. **Background Tasks**: periodic pruning of idle channels and locks
//! 5. **Router**: every route and the auth middleware
//!
//! # Example
//!
//! ```rust,no_run
//! use taskboard::backend::server::create_app;
//! use taskboard::shared::AppConfig;
//!
//! # async fn example() {
//! let config = AppConfig::from_env().unwrap();
//! let app = create_app(config).await;
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use init::{create_app, create_app_with_store};
pub use state::AppState;
