//! # Taskdeck API Server Library
//!
//! Core functionality for the Taskdeck API server.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder, and auth middleware
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
