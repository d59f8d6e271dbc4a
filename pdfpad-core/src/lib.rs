//! # pdfpad
//!
//! Generate a multi-page PDF where every page shows its 1-based index,
//! and optionally pad the resulting file to a minimum byte size.
//!
//! The library drives a small built-in PDF engine (standard fonts only,
//! uncompressed content streams) and then reconciles the finished file
//! against an optional size target: if the file is short, filler bytes
//! are appended after `%%EOF`; if it is already larger, a warning is
//! logged and the file is left untouched.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfpad::{generate, GenerationRequest, Result};
//!
//! # fn main() -> Result<()> {
//! // Three pages, padded to at least 1 MiB
//! let request = GenerationRequest::new("output.pdf", 3)?.with_target_size_mb(1.0);
//! let summary = generate(&request)?;
//!
//! println!(
//!     "{} pages, {} bytes ({} appended)",
//!     summary.page_count,
//!     summary.final_size,
//!     summary.bytes_appended()
//! );
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod error;
pub mod font;
pub mod generator;
pub mod objects;
pub mod page;
pub mod writer;

pub use document::{Document, DocumentMetadata};
pub use error::{PdfError, Result};
pub use font::{measure_text, Font};
pub use generator::{
    generate, mb_to_bytes, DocumentAuthor, GenerationRequest, GenerationSummary, PaddingDecision,
    PdfAuthor,
};
pub use page::Page;
pub use writer::PdfWriter;

/// Current version of pdfpad
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
