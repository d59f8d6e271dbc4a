use crate::error::{PdfError, Result};
use crate::page::Page;
use crate::writer::PdfWriter;
use chrono::{DateTime, Utc};
use std::io::BufWriter;
use std::path::Path;

/// A PDF document that can contain multiple pages and metadata.
///
/// A new document has zero pages: nothing is added implicitly, so the
/// number of pages written is exactly the number of [`add_page`] calls.
///
/// # Example
///
/// ```rust,no_run
/// use pdfpad::{Document, Font, Page};
///
/// let mut doc = Document::new();
/// doc.set_title("Numbered pages");
///
/// let mut page = Page::a4();
/// page.centered_text(Font::Helvetica, 20.0, page.height() / 2.0, "1")?;
/// doc.add_page(page);
///
/// doc.save("output.pdf")?;
/// # Ok::<(), pdfpad::PdfError>(())
/// ```
///
/// [`add_page`]: Document::add_page
pub struct Document {
    pub(crate) pages: Vec<Page>,
    pub(crate) metadata: DocumentMetadata,
}

/// Metadata written to the document's Info dictionary.
#[derive(Debug, Clone)]
pub struct DocumentMetadata {
    /// Document title
    pub title: Option<String>,
    /// Document author
    pub author: Option<String>,
    /// Software that produced the PDF
    pub producer: Option<String>,
    /// Date and time the document was created
    pub creation_date: Option<DateTime<Utc>>,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            title: None,
            author: None,
            producer: Some(format!("pdfpad v{}", env!("CARGO_PKG_VERSION"))),
            creation_date: Some(Utc::now()),
        }
    }
}

impl Document {
    /// Creates a new empty PDF document.
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            metadata: DocumentMetadata::default(),
        }
    }

    /// Adds a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Sets the document title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.metadata.title = Some(title.into());
    }

    /// Sets the document author.
    pub fn set_author(&mut self, author: impl Into<String>) {
        self.metadata.author = Some(author.into());
    }

    /// Gets the number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Saves the document to a file and syncs it to disk.
    ///
    /// Returns [`PdfError::StreamOpen`] if the file cannot be created
    /// and [`PdfError::StreamWrite`] for any failure after that. On
    /// return the bytes are durable; the file size may be measured.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path).map_err(PdfError::StreamOpen)?;
        let mut writer = PdfWriter::new(BufWriter::new(file));
        writer.write_document(self)?;

        let buffered = writer.into_inner();
        let file = buffered
            .into_inner()
            .map_err(|e| PdfError::StreamWrite(e.into_error()))?;
        file.sync_all().map_err(PdfError::StreamWrite)?;
        Ok(())
    }

    /// Writes the document to a buffer.
    pub fn write(&self, buffer: &mut Vec<u8>) -> Result<()> {
        let mut writer = PdfWriter::new(buffer);
        writer.write_document(self)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
