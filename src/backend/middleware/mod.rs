//! Middleware Module
//!
//! - **`auth`** - bearer token verification for the `/api` routes

pub mod auth;

pub use auth::{auth_middleware, AuthUser, AuthenticatedUser};
