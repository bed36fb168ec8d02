//! Map-data source abstraction
//!
//! The tile cache only needs one capability from the outside world: fetch
//! every map element inside a bounding box. [`RoadDataSource`] captures that,
//! and [`OverpassSource`] implements it against an Overpass API endpoint.
//!
//! ```ignore
//! use lanemap::source::{AsyncReqwestClient, OverpassSource};
//!
//! let client = AsyncReqwestClient::with_timeout(60)?;
//! let source = OverpassSource::new(client, "https://overpass-api.de/api/interpreter");
//! ```

mod http;
mod overpass;

pub use http::{AsyncHttpClient, AsyncReqwestClient};
pub use overpass::{build_query, OverpassSource};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;

use std::future::Future;

use thiserror::Error;

use crate::coord::BoundingBox;
use crate::osm::Element;

/// Errors that can occur while fetching map data.
///
/// Cloneable so a single failed build can be reported to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Response body could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Supplier of raw map elements for a geographic area.
pub trait RoadDataSource: Send + Sync + 'static {
    /// Fetches every node and way inside `bounds`.
    fn fetch(
        &self,
        bounds: BoundingBox,
    ) -> impl Future<Output = Result<Vec<Element>, SourceError>> + Send;

    /// Returns the source's name for logging.
    fn name(&self) -> &str;
}
