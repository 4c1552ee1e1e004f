//! Error types shared by the catalog loader, the quote compiler and the report renderer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    /// Request rejected before any plan lookup (e.g. empty age list)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A specific plan was requested but is not among the admitted results
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The PDF backend rejected the document (font or page errors)
    #[error("PDF error: {0}")]
    Pdf(#[from] printpdf::Error),

    /// Catalog content that cannot be turned into plan records
    #[error("Catalog data error: {0}")]
    Catalog(String),
}

impl QuoteError {
    /// HTTP status the transport layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            QuoteError::InvalidInput(_) => 400,
            QuoteError::NotFound(_) => 404,
            _ => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

pub type Result<T> = std::result::Result<T, QuoteError>;
