//! Per-invocation conversion pipeline.
//!
//! Each invocation runs the same linear sequence: validate → download →
//! convert → deliver → clean up. There is no retry between stages; the first
//! failure propagates and the handler maps it to a user-facing message.
//! Temp inputs and artifacts are held by scoped guards so cleanup happens on
//! every exit path.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
};

use regex::Regex;
use tracing::info;

use crate::{
    domain::ChatId,
    messaging::port::MessagingPort,
    ports::{PageRasterizer, SlideConverter},
    tempfiles::{TempFile, WorkDir},
    transfer, Error, Result,
};

/// Caption attached to a delivered slide deck.
pub const SLIDES_CAPTION: &str = "Here is your converted PowerPoint file";
/// Caption attached to each delivered page image.
pub const PAGE_CAPTION: &str = "Here is your converted PDF page";

/// Needle matched (case-insensitively) in captions to activate passive
/// conversion. "convert to image" also matches the plural form.
const TRIGGER_SLIDES: &str = "convert to pptx";
const TRIGGER_IMAGES: &str = "convert to image";

/// Which converter an invocation targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversionMode {
    Slides,
    Images,
}

/// Everything a handler needs to run a pipeline, injected so tests can
/// substitute fakes for the external services.
pub struct PipelineDeps {
    pub messenger: Arc<dyn MessagingPort>,
    pub converter: Option<Arc<dyn SlideConverter>>,
    pub rasterizer: Arc<dyn PageRasterizer>,
    pub http: reqwest::Client,
    pub temp_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// Outcome of validating free-form command text against the URL rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UrlCheck {
    /// Empty or whitespace-only input: prompt the user, perform no I/O.
    Empty,
    /// No URL-shaped substring found.
    NoUrl,
    /// A URL was found but it does not end in `.pdf` (case-sensitive).
    NotPdf(String),
    /// A `.pdf`-suffixed URL, ready for the pipeline.
    Pdf(String),
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://\S+").expect("url regex"))
}

/// Apply the `/convertpdf` validation rules to raw command text.
pub fn check_pdf_url(text: &str) -> UrlCheck {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return UrlCheck::Empty;
    }

    let Some(m) = url_regex().find(trimmed) else {
        return UrlCheck::NoUrl;
    };

    let url = m.as_str().to_string();
    if url.ends_with(".pdf") {
        UrlCheck::Pdf(url)
    } else {
        UrlCheck::NotPdf(url)
    }
}

/// Conversion mode selected by the trigger phrase in a message caption, if
/// any.
pub fn trigger_mode(text: &str) -> Option<ConversionMode> {
    let lower = text.to_lowercase();
    if lower.contains(TRIGGER_SLIDES) {
        return Some(ConversionMode::Slides);
    }
    if lower.contains(TRIGGER_IMAGES) {
        return Some(ConversionMode::Images);
    }
    None
}

/// Mode word in `/convertpdf` arguments: `images` selects the image-sequence
/// pipeline, anything else defaults to slides.
pub fn command_mode(args: &str) -> ConversionMode {
    let wants_images = args
        .split_whitespace()
        .any(|w| w.eq_ignore_ascii_case("images") || w.eq_ignore_ascii_case("image"));
    if wants_images {
        ConversionMode::Images
    } else {
        ConversionMode::Slides
    }
}

/// Only `application/pdf` attachments are processed.
pub fn is_pdf_mime(mime: Option<&str>) -> bool {
    mime == Some("application/pdf")
}

/// Download a `.pdf` URL to a scoped temp file, then convert and deliver.
///
/// The temp input is removed when this returns, success or failure.
pub async fn run_url_pipeline(
    deps: &PipelineDeps,
    chat_id: ChatId,
    url: &str,
    mode: ConversionMode,
) -> Result<()> {
    let temp = TempFile::reserve(&deps.temp_dir, "temp", "pdf");
    info!("downloading {url} to {}", temp.path().display());
    transfer::download_to(&deps.http, url, None, temp.path()).await?;

    run_file_pipeline(deps, chat_id, temp.path(), mode).await
}

/// Convert an already-local PDF and deliver the result.
///
/// The caller owns the source file (and its cleanup); artifacts produced here
/// are removed after the delivery attempt, success or failure.
pub async fn run_file_pipeline(
    deps: &PipelineDeps,
    chat_id: ChatId,
    src: &Path,
    mode: ConversionMode,
) -> Result<()> {
    match mode {
        ConversionMode::Slides => {
            let Some(converter) = &deps.converter else {
                return Err(Error::Config(
                    "CONVERTAPI_SECRET is not set; slide conversion is unavailable".to_string(),
                ));
            };

            info!("converting {} to slides", src.display());
            let artifact = converter
                .convert_to_slides(src, &deps.output_dir)
                .await
                .map(TempFile::adopt)?;

            info!("delivering {}", artifact.path().display());
            deps.messenger
                .upload_document(chat_id, artifact.path(), Some(SLIDES_CAPTION))
                .await?;
        }
        ConversionMode::Images => {
            // Per-invocation directory: concurrent conversions never share
            // page files.
            let work = WorkDir::create(&deps.output_dir, "images")?;
            info!("rasterizing {} into {}", src.display(), work.path().display());
            let pages = deps.rasterizer.rasterize(src, work.path()).await?;

            info!("delivering {} pages", pages.len());
            for page in &pages {
                deps.messenger
                    .upload_document(chat_id, page, Some(PAGE_CAPTION))
                    .await?;
            }
        }
    }

    Ok(())
}
