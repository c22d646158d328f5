//! Backend Error Module
//!
//! Error types used by HTTP handlers. Every variant maps to one status code
//! and renders as a JSON body, so handlers return `Result<_, BackendError>`
//! and propagate with `?`.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - BackendError and its status mapping
//! └── conversion.rs - IntoResponse implementation
//! ```
//!
//! # Status Mapping
//!
//! | Source                              | Status |
//! |-------------------------------------|--------|
//! | `OrderingError::InvalidRange`       | 400    |
//! | `OrderingError::ForeignContainer`   | 400    |
//! | `SharedError::Invalid`              | 400    |
//! | missing or invalid bearer token     | 401    |
//! | board access denied                 | 403    |
//! | `OrderingError::NotFound`           | 404    |
//! | `OrderingError::StaleState`         | 409    |
//! | `SharedError::Malformed`            | 422    |
//! | `OrderingError::StorageUnavailable` | 503    |
//! | anything else                       | 500    |

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::BackendError;
