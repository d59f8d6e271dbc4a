//! Size-targeted document generation.
//!
//! The pipeline has two stages run in strict sequence: a builder that
//! authors one page per requested index and finalizes the stream, and
//! a reconciler that measures the durable file and pads it with filler
//! bytes until it reaches an optional target size. Padding is strictly
//! additive and lands after `%%EOF`, so the document structure is
//! never touched after finalization.

use crate::document::Document;
use crate::error::{PdfError, Result};
use crate::font::Font;
use crate::page::Page;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Font size used for the page index on every page.
const PAGE_NUMBER_SIZE: f64 = 20.0;

/// Filler byte appended when padding to a target size.
const FILLER: u8 = b' ';

/// Chunk size for padding writes, bounding peak memory regardless of
/// how many bytes remain to append.
const PAD_CHUNK: usize = 1024;

/// Parameters of one generation call. Immutable once built.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    output_path: PathBuf,
    page_count: u32,
    target_size: Option<u64>,
}

impl GenerationRequest {
    /// Creates a request for `page_count` pages with no size target.
    pub fn new(output_path: impl Into<PathBuf>, page_count: u32) -> Result<Self> {
        if page_count == 0 {
            return Err(PdfError::InvalidPageCount(page_count));
        }
        Ok(Self {
            output_path: output_path.into(),
            page_count,
            target_size: None,
        })
    }

    /// Sets a minimum artifact size in bytes.
    pub fn with_target_size(mut self, bytes: u64) -> Self {
        self.target_size = Some(bytes);
        self
    }

    /// Sets a minimum artifact size from a fractional megabyte count.
    ///
    /// The value is rounded up to whole bytes; non-positive values
    /// saturate to a zero-byte target, which any non-empty artifact
    /// already exceeds.
    pub fn with_target_size_mb(self, mb: f64) -> Self {
        self.with_target_size(mb_to_bytes(mb))
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn target_size(&self) -> Option<u64> {
        self.target_size
    }
}

/// Converts a megabyte count to whole bytes, rounding up.
pub fn mb_to_bytes(mb: f64) -> u64 {
    let bytes = mb * 1024.0 * 1024.0;
    if bytes <= 0.0 {
        0
    } else {
        bytes.ceil() as u64
    }
}

/// What the reconciler decided to do, derived once from the measured
/// artifact size and the requested target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingDecision {
    /// No target was requested; the artifact is left as written.
    NoTarget,
    /// The artifact is short of the target by this many filler bytes.
    Pad(u64),
    /// The artifact already has exactly the target size.
    ExactMatch,
    /// The artifact exceeds the target; padding cannot shrink a file.
    AlreadyOverTarget,
}

impl PaddingDecision {
    pub fn decide(artifact_size: u64, target: Option<u64>) -> Self {
        match target {
            None => PaddingDecision::NoTarget,
            Some(t) if artifact_size < t => PaddingDecision::Pad(t - artifact_size),
            Some(t) if artifact_size == t => PaddingDecision::ExactMatch,
            Some(_) => PaddingDecision::AlreadyOverTarget,
        }
    }

    /// Bytes the reconciler will append for this decision.
    pub fn bytes_to_append(&self) -> u64 {
        match self {
            PaddingDecision::Pad(n) => *n,
            _ => 0,
        }
    }
}

/// Outcome of a successful generation.
#[derive(Debug, Clone, Copy)]
pub struct GenerationSummary {
    /// Pages written, always equal to the requested count.
    pub page_count: u32,
    /// Artifact size after any padding.
    pub final_size: u64,
    /// What the reconciler did.
    pub decision: PaddingDecision,
}

impl GenerationSummary {
    pub fn bytes_appended(&self) -> u64 {
        self.decision.bytes_to_append()
    }
}

/// The authoring capability the builder drives.
///
/// The engine starts with zero pages; `create_page` opens a fresh page
/// and `draw_centered_text` targets the page opened last. `finalize`
/// must not return until the written bytes are durable, because the
/// reconciler measures the file immediately afterwards.
pub trait DocumentAuthor {
    fn create_page(&mut self) -> Result<()>;
    fn draw_centered_text(&mut self, text: &str) -> Result<()>;
    fn finalize(&mut self) -> Result<()>;
}

/// Production [`DocumentAuthor`] backed by the PDF engine.
pub struct PdfAuthor {
    document: Document,
    current: Option<Page>,
    output_path: PathBuf,
}

impl PdfAuthor {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            document: Document::new(),
            current: None,
            output_path: output_path.into(),
        }
    }

    fn flush_current_page(&mut self) {
        if let Some(page) = self.current.take() {
            self.document.add_page(page);
        }
    }
}

impl DocumentAuthor for PdfAuthor {
    fn create_page(&mut self) -> Result<()> {
        self.flush_current_page();
        self.current = Some(Page::a4());
        Ok(())
    }

    fn draw_centered_text(&mut self, text: &str) -> Result<()> {
        let page = self
            .current
            .as_mut()
            .ok_or_else(|| PdfError::InvalidOperation("no page is open for drawing".to_string()))?;
        let y = page.height() / 2.0;
        page.centered_text(Font::Helvetica, PAGE_NUMBER_SIZE, y, text)
    }

    fn finalize(&mut self) -> Result<()> {
        self.flush_current_page();
        debug!(pages = self.document.page_count(), "finalizing document");
        self.document.save(&self.output_path)
    }
}

/// Authors exactly `page_count` pages, each showing its 1-based index,
/// then finalizes the stream.
pub fn author_pages<A: DocumentAuthor>(author: &mut A, page_count: u32) -> Result<()> {
    for i in 1..=page_count {
        author.create_page()?;
        author.draw_centered_text(&i.to_string())?;
    }
    author.finalize()
}

/// Generates the document and reconciles its size against the target.
///
/// Runs the builder, waits for the write-completion signal (the return
/// of [`DocumentAuthor::finalize`]), then measures the artifact and
/// applies the padding decision. On [`PdfError::PaddingIo`] the
/// unpadded document remains on disk.
pub fn generate(request: &GenerationRequest) -> Result<GenerationSummary> {
    let mut author = PdfAuthor::new(request.output_path());
    author_pages(&mut author, request.page_count())?;

    reconcile_size(request)
}

fn reconcile_size(request: &GenerationRequest) -> Result<GenerationSummary> {
    let path = request.output_path();
    let size = std::fs::metadata(path)
        .map_err(PdfError::PaddingIo)?
        .len();

    let decision = PaddingDecision::decide(size, request.target_size());
    match decision {
        PaddingDecision::NoTarget | PaddingDecision::ExactMatch => {}
        PaddingDecision::Pad(padding) => {
            append_filler(path, padding)?;
            info!(bytes = padding, "appended filler to reach target size");
        }
        PaddingDecision::AlreadyOverTarget => {
            warn!(
                size,
                target = request.target_size().unwrap_or(0),
                "generated document is larger than the target size"
            );
        }
    }

    Ok(GenerationSummary {
        page_count: request.page_count(),
        final_size: size + decision.bytes_to_append(),
        decision,
    })
}

/// Appends `padding` filler bytes in bounded chunks.
fn append_filler(path: &Path, padding: u64) -> Result<()> {
    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(PdfError::PaddingIo)?;

    let chunk = [FILLER; PAD_CHUNK];
    let mut remaining = padding;
    while remaining > 0 {
        let len = remaining.min(PAD_CHUNK as u64) as usize;
        file.write_all(&chunk[..len]).map_err(PdfError::PaddingIo)?;
        remaining -= len as u64;
    }

    file.sync_all().map_err(PdfError::PaddingIo)?;
    Ok(())
}
