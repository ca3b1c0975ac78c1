//! RoboBox HTTP Server Library
//!
//! Provides the REST API components for testing and reuse.

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod reveal_sessions;
