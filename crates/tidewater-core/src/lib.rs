//! Tidewater Core - shared configuration and error types
//!
//! This crate provides the types every other Tidewater crate depends on:
//! - `ViewerConfig` - the TOML-driven startup configuration
//! - `TidewaterError` and the `Result` alias

pub mod config;
mod error;

pub use config::{
    RefractionCulling, ViewerConfig, WallMode, MAX_CASCADES, MAX_WALL_LIGHTS,
};
pub use error::{Result, TidewaterError};
