//! Error types for the annotation renderer
//!
//! Rendering routines themselves are infallible; errors arise at the
//! document assembly, attachment and IO seams.

use thiserror::Error;

/// Custom error type for renderer operations
#[derive(Error, Debug)]
pub enum RendererError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Page {0} does not exist")]
    MissingPage(u32),

    #[error("Annotation {0} is not registered")]
    AnnotationNotFound(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF generation error: {0}")]
    Pdf(String),
}

/// Result type alias for renderer operations
pub type RendererResult<T> = Result<T, RendererError>;
