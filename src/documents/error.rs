use thiserror::Error;

pub type DocumentResult<T> = std::result::Result<T, DocumentError>;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("pdf error: {0}")]
    PdfError(#[from] lopdf::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}
