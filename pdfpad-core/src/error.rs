use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to open output stream: {0}")]
    StreamOpen(#[source] std::io::Error),

    #[error("Stream write error: {0}")]
    StreamWrite(#[source] std::io::Error),

    #[error("Padding I/O error: {0}")]
    PaddingIo(#[source] std::io::Error),

    #[error("Invalid page count: {0}")]
    InvalidPageCount(u32),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type Result<T> = std::result::Result<T, PdfError>;
