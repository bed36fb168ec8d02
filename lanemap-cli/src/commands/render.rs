//! Render command - render a single tile to a PNG file.

use std::path::PathBuf;
use std::time::Instant;

use lanemap::cache::TileCache;
use lanemap::render::{Renderer, TileRenderer};
use lanemap::source::{AsyncReqwestClient, OverpassSource};
use tracing::{debug, info};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the render command.
pub struct RenderArgs {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Run the render command.
pub fn run(args: RenderArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.config.clone())?;
    runner.log_startup("render");
    let config = runner.config();

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(args.zoom, args.x, args.y));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Setup(format!("Failed to start async runtime: {}", e)))?;

    println!("Rendering tile {}/{}/{}", args.zoom, args.x, args.y);
    let start = Instant::now();

    let png = runtime.block_on(async {
        let client = AsyncReqwestClient::with_timeout(config.overpass.timeout)
            .map_err(|e| CliError::Setup(e.to_string()))?;
        let source = OverpassSource::new(client, config.overpass.url.clone())
            .with_query_timeout(config.overpass.timeout);
        debug!(url = source.url(), "Using Overpass endpoint");
        let renderer = TileRenderer::new(
            TileCache::new(source, config.cache_config()),
            Renderer::default(),
        );

        renderer
            .render_png(args.zoom, args.x, args.y)
            .await
            .map_err(CliError::from)
    })?;

    std::fs::write(&output, &png).map_err(|error| CliError::FileWrite {
        path: output.clone(),
        error,
    })?;

    info!(
        path = %output.display(),
        bytes = png.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Tile written"
    );
    println!(
        "Wrote {} ({} bytes) in {:.2}s",
        output.display(),
        png.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn default_output(zoom: u8, x: u32, y: u32) -> PathBuf {
    PathBuf::from(format!("{}_{}_{}.png", zoom, x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_name() {
        assert_eq!(default_output(18, 5, 7), PathBuf::from("18_5_7.png"));
    }
}
