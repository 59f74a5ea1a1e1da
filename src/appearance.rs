//! Canvas-to-document conversion
//!
//! Renders a pattern into the PDF canvas backend and packages the finished
//! content stream for use as an annotation appearance or as a standalone
//! single-page document.

use pdf_writer::{Pdf, Rect as PdfRect, Ref};

use crate::patterns::Pattern;
use crate::pdf_canvas::PdfCanvas;
use crate::types::Size;

/// A rendered drawing surface: raw PDF content operators plus the nominal
/// surface dimensions.
#[derive(Debug, Clone)]
pub struct AppearanceStream {
    size: Size,
    content: Vec<u8>,
}

impl AppearanceStream {
    pub fn size(&self) -> Size {
        self.size
    }

    /// Raw content-stream bytes.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Assemble a complete single-page PDF document around the stream.
    pub fn to_pdf_bytes(&self) -> Vec<u8> {
        let mut pdf = Pdf::new();
        let catalog_id = Ref::new(1);
        let page_tree_id = Ref::new(2);
        let page_id = Ref::new(3);
        let content_id = Ref::new(4);

        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.pages(page_tree_id).kids([page_id]).count(1);
        {
            let mut page = pdf.page(page_id);
            page.parent(page_tree_id);
            page.media_box(PdfRect::new(
                0.0,
                0.0,
                self.size.width as f32,
                self.size.height as f32,
            ));
            page.contents(content_id);
        }
        pdf.stream(content_id, &self.content);
        pdf.finish()
    }
}

/// Paint `pattern` onto a fresh PDF drawing surface of the given dimensions.
pub fn convert(pattern: &dyn Pattern, size: Size) -> AppearanceStream {
    let mut canvas = PdfCanvas::new(size);
    pattern.render(&mut canvas);
    AppearanceStream {
        size,
        content: canvas.finish(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{FilledRectangle, TriangleTessellation};

    #[test]
    fn convert_produces_a_loadable_document() {
        let stream = convert(&FilledRectangle::default(), Size::new(600.0, 600.0));
        assert_eq!(stream.size(), Size::new(600.0, 600.0));
        assert!(!stream.content().is_empty());

        let bytes = stream.to_pdf_bytes();
        assert!(bytes.starts_with(b"%PDF"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/MediaBox"));
        assert!(text.contains("/Contents"));
    }

    #[test]
    fn conversion_is_deterministic_for_a_seeded_pattern() {
        let pattern = TriangleTessellation::new(1234);
        let a = convert(&pattern, Size::new(600.0, 600.0));
        let b = convert(&pattern, Size::new(600.0, 600.0));
        assert_eq!(a.content(), b.content());
        assert_eq!(a.to_pdf_bytes(), b.to_pdf_bytes());
    }
}
