//! Property-based tests for position maintenance
//!
//! The pure planner is exercised against an in-memory container model, and
//! the full service path against the in-memory store.

mod ordering_proptest;

#[cfg(feature = "ssr")]
mod service_proptest;
