//! # Courier API Server Library
//!
//! ## Modules
//!
//! - `app`: Application state, router and Basic Auth gate
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `outcome`: 200-status results reported in the body
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod outcome;
pub mod routes;
