//! Integration tests for the board server
//!
//! Everything runs against the in-memory store; no database is required.

#![cfg(feature = "ssr")]


mod api;
mod collaboration;
mod realtime;
mod scenarios;
