//! Configuration utilities.

/// `research.toml` loading and validation.
pub mod toml_config;
