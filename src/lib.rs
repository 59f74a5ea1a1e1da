//! Canvas-style pattern rendering and PDF annotation appearances
//!
//! Paints geometric patterns through a backend-agnostic drawing context,
//! converts the painted surface into a PDF appearance stream, and attaches
//! it as the custom visual appearance of a rectangle annotation on a host
//! document.

mod annotation;
mod appearance;
mod canvas;
mod document;
mod error;
mod patterns;
mod pdf_canvas;
mod raster_canvas;
mod rng;
mod types;
mod viewer;

pub use annotation::{AnnotationId, RectangleAnnotation};
pub use appearance::{convert, AppearanceStream};
pub use canvas::{Canvas, CanvasState, PathCommand};
pub use document::{AnnotationManager, Document};
pub use error::{RendererError, RendererResult};
pub use patterns::{
    CircularHatch, FilledRectangle, GradientCircleGrid, Pattern, TriangleTessellation,
};
pub use pdf_canvas::PdfCanvas;
pub use raster_canvas::RasterCanvas;
pub use rng::{RandomSource, SplitMix64};
pub use types::{Color, Rect, Size};
pub use viewer::Viewer;
