//! LaneMap - lane-level road overlay tiles from OpenStreetMap data
//!
//! Renders 256×256 transparent slippy-map tiles in which every road is
//! drawn lane by lane: sidewalks, kerbs, asphalt and dashed lane dividers.
//! Road data is fetched once per base-zoom tile and shared by every deeper
//! tile inside it.
//!
//! # High-Level API
//!
//! ```ignore
//! use lanemap::cache::{CacheConfig, TileCache};
//! use lanemap::render::{Renderer, TileRenderer};
//! use lanemap::source::{AsyncReqwestClient, OverpassSource};
//!
//! let client = AsyncReqwestClient::with_timeout(60)?;
//! let source = OverpassSource::new(client, "https://overpass-api.de/api/interpreter");
//! let renderer = TileRenderer::new(TileCache::new(source, CacheConfig::default()), Renderer::default());
//!
//! let png = renderer.render_png(18, 132_323, 88_112).await?;
//! ```

pub mod cache;
pub mod config;
pub mod coord;
pub mod lanes;
pub mod logging;
pub mod osm;
pub mod render;
pub mod source;
pub mod tile;

/// Version of the LaneMap library and CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
