//! Overpass API map-data source.

use serde::Deserialize;
use tracing::{debug, info};

use super::{AsyncHttpClient, RoadDataSource, SourceError};
use crate::coord::BoundingBox;
use crate::osm::Element;

/// Overpass JSON response envelope.
#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
    /// Set by the server when the query hit a runtime error or timed out.
    #[serde(default)]
    remark: Option<String>,
}

/// Builds the Overpass QL query for all highway ways in `bounds`, including
/// their member nodes.
pub fn build_query(bounds: &BoundingBox, timeout_secs: u64) -> String {
    format!(
        "[out:json][timeout:{timeout}];(way[\"highway\"]({s:.7},{w:.7},{n:.7},{e:.7}););(._;>;);out body;",
        timeout = timeout_secs,
        s = bounds.south,
        w = bounds.west,
        n = bounds.north,
        e = bounds.east,
    )
}

/// Map-data source backed by an Overpass API endpoint.
pub struct OverpassSource<C: AsyncHttpClient> {
    client: C,
    url: String,
    timeout_secs: u64,
}

impl<C: AsyncHttpClient> OverpassSource<C> {
    /// Default server-side query timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 25;

    pub fn new(client: C, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the `[timeout:N]` value sent with every query.
    pub fn with_query_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn parse(body: &[u8]) -> Result<Vec<Element>, SourceError> {
        let response: OverpassResponse = serde_json::from_slice(body)
            .map_err(|e| SourceError::InvalidResponse(format!("Malformed Overpass JSON: {}", e)))?;

        if let Some(remark) = response.remark {
            if remark.contains("error") {
                return Err(SourceError::InvalidResponse(remark));
            }
            debug!(remark = %remark, "Overpass remark");
        }

        Ok(response.elements)
    }
}

impl<C: AsyncHttpClient> RoadDataSource for OverpassSource<C> {
    async fn fetch(&self, bounds: BoundingBox) -> Result<Vec<Element>, SourceError> {
        let query = build_query(&bounds, self.timeout_secs);
        debug!(url = %self.url, query = %query, "Querying Overpass");

        let body = self.client.post_text(&self.url, query).await?;
        let elements = Self::parse(&body)?;

        info!(
            elements = elements.len(),
            bytes = body.len(),
            "Fetched map data from Overpass"
        );
        Ok(elements)
    }

    fn name(&self) -> &str {
        "overpass"
    }
}
