//! PDF to image-sequence conversion via poppler's `pdftoppm`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::{ports::PageRasterizer, Error, Result};

/// Filename prefix the tool writes pages under (`page-1.png`, `page-2.png`, ...).
const PAGE_PREFIX: &str = "page";

/// Rasterizes a PDF into one PNG per page by invoking `pdftoppm`.
pub struct PdfRasterizer {
    tool_path: PathBuf,
}

impl PdfRasterizer {
    pub fn new(tool_path: impl Into<PathBuf>) -> Self {
        Self {
            tool_path: tool_path.into(),
        }
    }
}

#[async_trait]
impl PageRasterizer for PdfRasterizer {
    /// Run the tool against `src`, writing numbered page images into
    /// `out_dir`, and return the pages ordered by page number.
    ///
    /// `out_dir` is expected to be a per-invocation directory; nothing here
    /// guards against files left behind by other runs.
    async fn rasterize(&self, src: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
        tokio::fs::create_dir_all(out_dir).await?;

        let out = Command::new(&self.tool_path)
            .arg("-png")
            .arg(src)
            .arg(out_dir.join(PAGE_PREFIX))
            .output()
            .await?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(Error::Raster(format!(
                "{} exited with {}: {}",
                self.tool_path.display(),
                out.status,
                stderr.chars().take(200).collect::<String>()
            )));
        }

        let pages = collect_page_images(out_dir)?;
        debug!("rasterized {} into {} pages", src.display(), pages.len());

        if pages.is_empty() {
            return Err(Error::Raster(format!(
                "{} produced no page images",
                self.tool_path.display()
            )));
        }

        Ok(pages)
    }
}

/// List `page-*.png` files in `dir`, ordered numerically by page number.
///
/// `pdftoppm` zero-pads page numbers to the width of the last page, which
/// makes a lexical sort usually correct — but we parse the number and sort
/// numerically so ordering never depends on the tool's padding.
pub fn collect_page_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pages: Vec<(u32, PathBuf)> = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if let Some(n) = page_number(&name) {
            pages.push((n, entry.path()));
        }
    }

    pages.sort_by_key(|(n, _)| *n);
    Ok(pages.into_iter().map(|(_, p)| p).collect())
}

fn page_number(name: &str) -> Option<u32> {
    name.strip_prefix("page-")?
        .strip_suffix(".png")?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_number_parses_padded_and_unpadded() {
        assert_eq!(page_number("page-1.png"), Some(1));
        assert_eq!(page_number("page-07.png"), Some(7));
        assert_eq!(page_number("page-12.png"), Some(12));
        assert_eq!(page_number("cover.png"), None);
        assert_eq!(page_number("page-1.jpg"), None);
        assert_eq!(page_number("page-one.png"), None);
    }

    #[test]
    fn pages_are_ordered_numerically_not_lexically() {
        let dir = tempfile::tempdir().unwrap();
        // Unpadded names: a lexical sort would yield 1, 10, 2.
        for n in [10u32, 1, 2] {
            std::fs::write(dir.path().join(format!("page-{n}.png")), b"png").unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let pages = collect_page_images(dir.path()).unwrap();
        let names: Vec<String> = pages
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["page-1.png", "page-2.png", "page-10.png"]);
    }

    #[test]
    fn empty_dir_yields_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_page_images(dir.path()).unwrap().is_empty());
    }
}
