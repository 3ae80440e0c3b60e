//! # Courier Shared Library
//!
//! Storage, credentials and delivery seams used by the Courier API server.
//!
//! ## Module Organization
//!
//! - `db`: connection pool and migrations
//! - `models`: users, the contact queue and the message queue
//! - `auth`: password generation/hashing and Basic Auth credential checks
//! - `dispatch`: verification code delivery

pub mod auth;
pub mod db;
pub mod dispatch;
pub mod models;

/// Current version of the Courier shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
