//! Shared utilities for mosaic
//!
//! This crate provides common functionality used across the mosaic workspace,
//! including logging setup and the base application configuration.

pub mod config;
pub mod logging;

pub use config::{AppConfig, LogFormat};
pub use logging::{init_tracing, init_tracing_with};
