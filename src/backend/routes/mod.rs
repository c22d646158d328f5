//! Route Configuration Module
//!
//! - **`router`** - assembles `/health`, the authenticated `/api` tree and
//!   static file serving
//! - **`api_routes`** - every `/api` route
//!
//! # Route Organization
//!
//! 1. **Health** - `GET /health`, unauthenticated
//! 2. **API** - under `/api`, behind `auth_middleware`
//! 3. **Fallback** - files from `static_dir`, `index.html` for anything else
//!
//! Unknown `/api` paths get a JSON 404 instead of the client's index page.

/// Main router creation
pub mod router;

/// API endpoint routes
pub mod api_routes;

pub use router::create_router;
