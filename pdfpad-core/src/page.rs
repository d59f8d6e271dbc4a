use crate::error::{PdfError, Result};
use crate::font::{measure_text, Font};
use std::collections::HashSet;
use std::fmt::Write;

/// A single page in a PDF document.
///
/// Pages have a size in points (1/72 inch) and accumulate text drawing
/// operations that become the page's content stream.
///
/// # Example
///
/// ```rust
/// use pdfpad::{Font, Page};
///
/// let mut page = Page::a4();
/// page.centered_text(Font::Helvetica, 20.0, page.height() / 2.0, "1")?;
/// # Ok::<(), pdfpad::PdfError>(())
/// ```
#[derive(Clone)]
pub struct Page {
    width: f64,
    height: f64,
    operations: String,
    used_fonts: HashSet<Font>,
}

impl Page {
    /// Creates a new page with the specified width and height in points.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            operations: String::new(),
            used_fonts: HashSet::new(),
        }
    }

    /// Creates a new A4 page (595 x 842 points).
    pub fn a4() -> Self {
        Self::new(595.0, 842.0)
    }

    /// Creates a new US Letter page (612 x 792 points).
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Draws `text` with its baseline at `(x, y)`.
    pub fn text_at(&mut self, font: Font, size: f64, x: f64, y: f64, text: &str) -> Result<()> {
        self.used_fonts.insert(font);

        self.operations.push_str("BT\n");
        // Infallible writes to a String
        let _ = writeln!(self.operations, "/{} {} Tf", font.resource_name(), size);
        let _ = writeln!(self.operations, "{x:.2} {y:.2} Td");

        self.operations.push('(');
        for ch in text.chars() {
            match ch {
                '(' => self.operations.push_str("\\("),
                ')' => self.operations.push_str("\\)"),
                '\\' => self.operations.push_str("\\\\"),
                '\n' => self.operations.push_str("\\n"),
                '\r' => self.operations.push_str("\\r"),
                '\t' => self.operations.push_str("\\t"),
                ' '..='~' => self.operations.push(ch),
                c if (c as u32) <= 0xFF => {
                    let _ = write!(self.operations, "\\{:03o}", c as u32);
                }
                c => {
                    return Err(PdfError::EncodingError(format!(
                        "character '{c}' is not representable in a literal string"
                    )))
                }
            }
        }
        self.operations.push_str(") Tj\n");
        self.operations.push_str("ET\n");
        Ok(())
    }

    /// Draws `text` horizontally centered with its baseline at `y`.
    pub fn centered_text(&mut self, font: Font, size: f64, y: f64, text: &str) -> Result<()> {
        let x = (self.width - measure_text(text, font, size)) / 2.0;
        self.text_at(font, size, x, y, text)
    }

    pub(crate) fn used_fonts(&self) -> impl Iterator<Item = Font> + '_ {
        self.used_fonts.iter().copied()
    }

    pub(crate) fn content(&self) -> Vec<u8> {
        self.operations.as_bytes().to_vec()
    }
}
