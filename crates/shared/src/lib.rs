//! Shared errors and configuration for Pocketbook.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;

pub use config::{AppConfig, DatabaseConfig, LedgerConfig, ServerConfig};
pub use error::AppError;
