//! Shared utilities for stock-data-rs
//!
//! This crate provides common functionality used across the workspace:
//! tracing subscriber setup and environment lookups used by configuration.

pub mod config;
pub mod logging;

pub use config::{env_var, env_var_or};
pub use logging::{init_test_tracing, init_tracing, init_tracing_with_default};
