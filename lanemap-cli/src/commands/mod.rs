//! CLI command implementations.
//!
//! - [`config`] - Show the effective configuration
//! - [`render`] - Render a single tile to PNG

pub mod config;
pub mod render;
