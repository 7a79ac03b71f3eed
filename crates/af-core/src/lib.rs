//! Core types and utilities for agentflow
//!
//! # Modules
//!
//! - `config`: Environment loading and typed settings
//! - `error`: Error types and Result alias

pub mod config;
pub mod error;

// Re-exports
pub use config::{RunnerConfig, TrackerConfig};
pub use error::{Error, Result};
