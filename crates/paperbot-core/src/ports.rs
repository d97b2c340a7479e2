//! Hexagonal ports for the external converters.
//!
//! Adapter crates (`paperbot-convertapi`, `paperbot-tenor`) implement these;
//! the pipeline and tests depend only on the traits.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::Result;

/// Document → slide-deck conversion via an external service.
#[async_trait]
pub trait SlideConverter: Send + Sync {
    /// Submit `src`, persist the produced deck into `out_dir`, and return its
    /// final path (`converted_<millis>_<seq>.pptx`).
    async fn convert_to_slides(&self, src: &Path, out_dir: &Path) -> Result<PathBuf>;
}

/// Document → one image per page, via a local tool.
#[async_trait]
pub trait PageRasterizer: Send + Sync {
    /// Render `src` into `out_dir` and return the pages ordered by page
    /// number.
    async fn rasterize(&self, src: &Path, out_dir: &Path) -> Result<Vec<PathBuf>>;
}

/// Keyword → first matching GIF URL.
#[async_trait]
pub trait GifFinder: Send + Sync {
    /// `Ok(None)` means the search ran fine but matched nothing.
    async fn find_gif(&self, query: &str) -> Result<Option<String>>;
}
