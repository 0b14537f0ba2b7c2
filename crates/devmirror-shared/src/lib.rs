//! # DevMirror Shared
//!
//! Shared types, configuration and errors for DevMirror.
//! This crate provides the foundation types used across all DevMirror components.

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::*;
pub use error::*;
pub use types::*;

/// Version information for DevMirror.rs
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
