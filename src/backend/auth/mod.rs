//! Authentication Module
//!
//! Bearer token verification. Tokens are issued by the account service; this
//! server only checks them and reads the user id from the `sub` claim.
//! Route protection itself lives in `middleware::auth`.

/// JWT creation and verification
pub mod sessions;

pub use sessions::{create_token, verify_token, Claims};
