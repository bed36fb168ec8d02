//! Base-zoom tile cache with build deduplication.
//!
//! Road graphs are built once per tile at a fixed base zoom and shared by
//! every deeper tile inside it. The cache maps each base key to a single
//! shared build future, so concurrent resolvers of the same area join one
//! upstream fetch instead of racing to start their own.
//!
//! # Architecture
//!
//! ```text
//! resolve(18, x, y) ─┐
//!                    │   ┌──────────── mutex ────────────┐
//! resolve(17, x, y) ─┼──►│ lookup / insert / touch / evict│──► Shared build ──► fetch + classify
//!                    │   └────────────────────────────────┘        │
//! resolve(16, x, y) ─┘                                             ▼
//!                                              every resolver gets the same Arc<Tile>
//! ```
//!
//! The index mutex is held only for the synchronous bookkeeping; waiting on
//! the build happens outside it. Builds run as their own tokio tasks and
//! always run to completion, even if the entry is evicted meanwhile.

mod index;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::coord::TileKey;
use crate::osm::{self, ClassifyError};
use crate::source::{RoadDataSource, SourceError};
use crate::tile::{Tile, TileError};

use index::LruIndex;

/// Default zoom level at which road graphs are built.
pub const DEFAULT_BASE_ZOOM: u8 = 16;

/// Default number of base tiles kept in the index.
pub const DEFAULT_CAPACITY: usize = 16;

/// Errors returned when resolving a tile.
///
/// Cloneable so a single build outcome can be handed to every waiter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CacheError {
    /// The key is not a tile of the Web Mercator pyramid.
    #[error("Tile {0} is outside the tile pyramid")]
    InvalidTile(TileKey),

    /// The requested zoom is shallower than the base zoom.
    #[error("Zoom {requested} is below the cache base zoom {base}")]
    ZoomBelowBase { requested: u8, base: u8 },

    /// A base-tile lookup was made at a different zoom.
    #[error("Zoom {requested} is not the cache base zoom {base}")]
    NotBaseZoom { requested: u8, base: u8 },

    /// The map-data source failed.
    #[error("Upstream fetch failed: {0}")]
    Upstream(#[from] SourceError),

    /// The map data referenced elements it did not contain.
    #[error("Inconsistent map data: {0}")]
    Classify(#[from] ClassifyError),

    /// A tile graph was used out of order.
    #[error(transparent)]
    Tile(#[from] TileError),

    /// The build task panicked.
    #[error("Tile build aborted: {0}")]
    BuildAborted(String),
}

/// Result of a base-tile build, shared between all waiters.
pub type BuildResult = Result<Arc<Tile>, CacheError>;

type SharedBuild = Shared<BoxFuture<'static, BuildResult>>;

/// Tile cache configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Zoom level at which graphs are built and cached.
    pub base_zoom: u8,
    /// Maximum number of base tiles kept in the index.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            base_zoom: DEFAULT_BASE_ZOOM,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Resolves that joined an existing build.
    pub hits: u64,
    /// Resolves that had to start a build.
    pub misses: u64,
    /// Builds started.
    pub builds: u64,
    /// Entries removed from the index.
    pub evictions: u64,
    /// Entries currently indexed.
    pub entries: usize,
}

impl CacheStats {
    /// Returns the hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries, {} hits, {} misses, {} builds, {} evictions",
            self.entries, self.hits, self.misses, self.builds, self.evictions
        )
    }
}

/// Deduplicating, bounded cache of base-zoom tiles.
pub struct TileCache<S: RoadDataSource> {
    config: CacheConfig,
    source: Arc<S>,
    index: Mutex<LruIndex<SharedBuild>>,
    hits: AtomicU64,
    misses: AtomicU64,
    builds: AtomicU64,
    evictions: AtomicU64,
}

impl<S: RoadDataSource> TileCache<S> {
    /// Creates an empty cache backed by `source`.
    pub fn new(source: S, config: CacheConfig) -> Self {
        Self::with_shared_source(Arc::new(source), config)
    }

    /// Creates an empty cache over a source shared with other owners.
    pub fn with_shared_source(source: Arc<S>, config: CacheConfig) -> Self {
        Self {
            config,
            source,
            index: Mutex::new(LruIndex::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            builds: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    /// Resolves a tile at or below the base zoom.
    ///
    /// Returns a fresh, uncached view at `(zoom, x, y)` sharing the road
    /// graph of its base-zoom ancestor. Building the ancestor happens at most
    /// once while it stays indexed; every concurrent caller waits on the
    /// same build and sees the same outcome.
    pub async fn resolve(&self, zoom: u8, x: u32, y: u32) -> Result<Tile, CacheError> {
        let key = TileKey::new(zoom, x, y);
        if !key.is_valid() {
            return Err(CacheError::InvalidTile(key));
        }
        let base_key = key
            .ancestor(self.config.base_zoom)
            .ok_or(CacheError::ZoomBelowBase {
                requested: zoom,
                base: self.config.base_zoom,
            })?;

        let base = self.acquire(base_key).await?;
        Ok(Tile::view(key, &base)?)
    }

    /// Resolves the base-zoom tile itself.
    pub async fn resolve_base(&self, key: TileKey) -> BuildResult {
        if !key.is_valid() {
            return Err(CacheError::InvalidTile(key));
        }
        if key.zoom != self.config.base_zoom {
            return Err(CacheError::NotBaseZoom {
                requested: key.zoom,
                base: self.config.base_zoom,
            });
        }
        self.acquire(key).await
    }

    /// Returns true if `key` is currently indexed.
    pub fn contains(&self, key: &TileKey) -> bool {
        self.index.lock().contains(key)
    }

    /// Number of indexed base tiles.
    pub fn len(&self) -> usize {
        self.index.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indexed keys from least to most recently used.
    pub fn keys(&self) -> Vec<TileKey> {
        self.index.lock().keys().copied().collect()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    /// Looks up or starts the build for `key`, then trims the index.
    ///
    /// Lookup, insert, reorder and eviction share one critical section so
    /// two callers can never both start a build for the same key.
    fn acquire(&self, key: TileKey) -> SharedBuild {
        let mut index = self.index.lock();

        let build = match index.get(&key) {
            Some(build) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(tile = %key, "Joining existing tile build");
                build
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                let build = self.start_build(key);
                index.insert(key, build.clone());
                build
            }
        };

        for evicted in index.evict_over(self.config.capacity) {
            self.evictions.fetch_add(1, Ordering::Relaxed);
            debug!(tile = %evicted, entries = index.len(), "Evicted tile from cache");
        }

        build
    }

    fn start_build(&self, key: TileKey) -> SharedBuild {
        self.builds.fetch_add(1, Ordering::Relaxed);
        info!(tile = %key, source = self.source.name(), "Starting tile build");

        let tile = Arc::new(Tile::new(key));
        let handle = tokio::spawn(build_tile(Arc::clone(&self.source), tile));

        async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => Err(CacheError::BuildAborted(e.to_string())),
            }
        }
        .boxed()
        .shared()
    }
}

/// Fetches, classifies and publishes the road graph for a base tile.
async fn build_tile<S: RoadDataSource>(source: Arc<S>, tile: Arc<Tile>) -> BuildResult {
    let start = Instant::now();
    let key = tile.key();

    let elements = match source.fetch(tile.bounds()).await {
        Ok(elements) => elements,
        Err(e) => {
            warn!(tile = %key, error = %e, "Map data fetch failed");
            return Err(CacheError::Upstream(e));
        }
    };

    let graph = osm::classify(&elements).inspect_err(|e| {
        warn!(tile = %key, error = %e, "Map data is inconsistent");
    })?;
    let (roads, junctions) = (graph.ways().len(), graph.junctions().len());
    tile.set_graph(graph)?;

    info!(
        tile = %key,
        roads,
        junctions,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Tile build complete"
    );
    Ok(tile)
}
