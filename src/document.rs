//! Host document model and annotation registry
//!
//! A fixed-layout document of uniform pages onto which rectangle
//! annotations are registered, plus the writer that assembles the final PDF
//! with each drawn annotation's appearance embedded as a Form XObject.

use std::path::Path;

use pdf_writer::{Name, Pdf, Rect as PdfRect, Ref, TextStr};

use crate::annotation::{AnnotationId, RectangleAnnotation};
use crate::error::{RendererError, RendererResult};
use crate::types::Size;

/// Default author attribution for annotations registered without one.
const DEFAULT_USER: &str = "Guest";

pub(crate) struct RegisteredAnnotation {
    pub(crate) id: AnnotationId,
    pub(crate) annotation: RectangleAnnotation,
    pub(crate) drawn: bool,
}

/// Registry of annotations with author attribution and draw state.
///
/// Registration alone does not make an annotation visible; it must be
/// redrawn once so its appearance is compiled into the document output.
pub struct AnnotationManager {
    current_user: String,
    next_id: AnnotationId,
    entries: Vec<RegisteredAnnotation>,
}

impl AnnotationManager {
    pub fn new() -> Self {
        Self {
            current_user: DEFAULT_USER.to_string(),
            next_id: 1,
            entries: Vec::new(),
        }
    }

    pub fn current_user(&self) -> &str {
        &self.current_user
    }

    pub fn set_current_user(&mut self, user: impl Into<String>) {
        self.current_user = user.into();
    }

    /// Register an annotation. An empty author is filled in from the
    /// current user.
    pub fn add_annotation(&mut self, mut annotation: RectangleAnnotation) -> AnnotationId {
        if annotation.author.is_empty() {
            annotation.author = self.current_user.clone();
        }
        let id = self.next_id;
        self.next_id += 1;
        log::debug!(
            "registered annotation {} on page {}",
            id,
            annotation.page_number
        );
        self.entries.push(RegisteredAnnotation {
            id,
            annotation,
            drawn: false,
        });
        id
    }

    /// Mark a registered annotation as drawn so it shows up in the output.
    pub fn redraw_annotation(&mut self, id: AnnotationId) -> RendererResult<()> {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.drawn = true;
                Ok(())
            }
            None => Err(RendererError::AnnotationNotFound(id)),
        }
    }

    pub fn get(&self, id: AnnotationId) -> Option<&RectangleAnnotation> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| &entry.annotation)
    }

    pub fn is_drawn(&self, id: AnnotationId) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.id == id && entry.drawn)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AnnotationId, &RectangleAnnotation)> {
        self.entries
            .iter()
            .map(|entry| (entry.id, &entry.annotation))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries(&self) -> &[RegisteredAnnotation] {
        &self.entries
    }
}

impl Default for AnnotationManager {
    fn default() -> Self {
        Self::new()
    }
}

/// A document of `page_count` uniform pages.
pub struct Document {
    page_size: Size,
    page_count: u32,
}

impl Document {
    pub fn new(page_size: Size, page_count: u32) -> RendererResult<Self> {
        if page_size.is_degenerate() {
            return Err(RendererError::InvalidGeometry(format!(
                "page size {}x{}",
                page_size.width, page_size.height
            )));
        }
        if page_count == 0 {
            return Err(RendererError::InvalidGeometry(
                "document needs at least one page".to_string(),
            ));
        }
        Ok(Self {
            page_size,
            page_count,
        })
    }

    pub fn page_size(&self) -> Size {
        self.page_size
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn save(
        &self,
        annotations: &AnnotationManager,
        path: impl AsRef<Path>,
    ) -> RendererResult<()> {
        let bytes = self.to_bytes(annotations)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Assemble the document with every registered annotation. Drawn
    /// annotations with a custom appearance get a normal-appearance Form
    /// XObject; the rest are emitted as bare annotation dictionaries.
    pub fn to_bytes(&self, annotations: &AnnotationManager) -> RendererResult<Vec<u8>> {
        for entry in annotations.entries() {
            let page = entry.annotation.page_number;
            if page == 0 || page > self.page_count {
                return Err(RendererError::MissingPage(page));
            }
        }

        let mut pdf = Pdf::new();
        let catalog_id = Ref::new(1);
        let page_tree_id = Ref::new(2);
        let mut next_id = 3;
        let mut alloc = || {
            let id = Ref::new(next_id);
            next_id += 1;
            id
        };

        let page_refs: Vec<Ref> = (0..self.page_count).map(|_| alloc()).collect();
        let annot_refs: Vec<(&RegisteredAnnotation, Ref, Option<Ref>)> = annotations
            .entries()
            .iter()
            .map(|entry| {
                let annot_ref = alloc();
                let appearance_ref = (entry.drawn
                    && entry.annotation.custom_appearance().is_some())
                .then(|| alloc());
                (entry, annot_ref, appearance_ref)
            })
            .collect();

        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.pages(page_tree_id)
            .kids(page_refs.iter().copied())
            .count(self.page_count as i32);

        for (index, &page_ref) in page_refs.iter().enumerate() {
            let page_number = index as u32 + 1;
            let on_page: Vec<Ref> = annot_refs
                .iter()
                .filter(|(entry, _, _)| entry.annotation.page_number == page_number)
                .map(|(_, annot_ref, _)| *annot_ref)
                .collect();

            let mut page = pdf.page(page_ref);
            page.parent(page_tree_id);
            page.media_box(PdfRect::new(
                0.0,
                0.0,
                self.page_size.width as f32,
                self.page_size.height as f32,
            ));
            if !on_page.is_empty() {
                page.insert(Name(b"Annots")).array().items(on_page);
            }
        }

        for (entry, annot_ref, appearance_ref) in &annot_refs {
            let annotation = &entry.annotation;
            if !entry.drawn {
                log::warn!(
                    "annotation {} on page {} was never redrawn and will not display",
                    entry.id,
                    annotation.page_number
                );
            }

            // Page coordinates are top-left-origin; PDF rects are bottom-up.
            let top = self.page_size.height - annotation.rect.y;
            let mut dict = pdf.indirect(*annot_ref).dict();
            dict.pair(Name(b"Type"), Name(b"Annot"));
            dict.pair(Name(b"Subtype"), Name(b"Square"));
            dict.insert(Name(b"Rect")).array().items([
                annotation.rect.x as f32,
                (top - annotation.rect.height) as f32,
                (annotation.rect.x + annotation.rect.width) as f32,
                top as f32,
            ]);
            dict.pair(Name(b"F"), 4); // print
            if !annotation.author.is_empty() {
                dict.pair(Name(b"T"), TextStr(annotation.author.as_str()));
            }
            if let Some(appearance_ref) = appearance_ref {
                dict.insert(Name(b"AP"))
                    .dict()
                    .pair(Name(b"N"), *appearance_ref);
            }
        }

        for (entry, _, appearance_ref) in &annot_refs {
            if let (Some(appearance_ref), Some(appearance)) =
                (appearance_ref, entry.annotation.custom_appearance())
            {
                let size = appearance.size();
                pdf.form_xobject(*appearance_ref, appearance.content())
                    .bbox(PdfRect::new(
                        0.0,
                        0.0,
                        size.width as f32,
                        size.height as f32,
                    ));
            }
        }

        Ok(pdf.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appearance::convert;
    use crate::patterns::FilledRectangle;
    use crate::types::Rect;

    fn letter_page() -> Size {
        Size::new(612.0, 792.0)
    }

    fn rect_annotation() -> RectangleAnnotation {
        let mut annotation = RectangleAnnotation::new(1, Rect::new(0.0, 0.0, 600.0, 600.0));
        annotation.add_custom_appearance(convert(
            &FilledRectangle::default(),
            Size::new(600.0, 600.0),
        ));
        annotation
    }

    #[test]
    fn attach_convert_and_register_end_to_end() {
        let document = Document::new(letter_page(), 1).unwrap();
        let mut manager = AnnotationManager::new();

        let id = manager.add_annotation(rect_annotation());
        manager.redraw_annotation(id).unwrap();
        assert!(manager.is_drawn(id));

        let bytes = document.to_bytes(&manager).unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Square"));
        assert!(text.contains("/AP"));
        assert!(text.contains("/Annots"));
        // Annotation rect converted to bottom-up page coordinates.
        assert!(text.contains("192"));
        // The embedded appearance carries the red fill and black stroke.
        assert!(text.contains("rg"));
        assert!(text.contains("RG"));
        assert!(text.contains("re"));
    }

    #[test]
    fn unredrawn_annotation_gets_no_appearance() {
        let document = Document::new(letter_page(), 1).unwrap();
        let mut manager = AnnotationManager::new();
        manager.add_annotation(rect_annotation());

        let text_bytes = document.to_bytes(&manager).unwrap();
        let text = String::from_utf8_lossy(&text_bytes);
        assert!(text.contains("/Square"));
        assert!(!text.contains("/AP"));
    }

    #[test]
    fn annotation_on_a_missing_page_is_rejected() {
        let document = Document::new(letter_page(), 2).unwrap();
        let mut manager = AnnotationManager::new();
        manager.add_annotation(RectangleAnnotation::new(
            5,
            Rect::new(0.0, 0.0, 100.0, 100.0),
        ));

        assert!(matches!(
            document.to_bytes(&manager),
            Err(RendererError::MissingPage(5))
        ));
    }

    #[test]
    fn degenerate_documents_are_rejected() {
        assert!(Document::new(Size::new(0.0, 792.0), 1).is_err());
        assert!(Document::new(letter_page(), 0).is_err());
    }

    #[test]
    fn manager_fills_in_the_current_user() {
        let mut manager = AnnotationManager::new();
        manager.set_current_user("reviewer");

        let id = manager.add_annotation(RectangleAnnotation::new(
            1,
            Rect::new(0.0, 0.0, 10.0, 10.0),
        ));
        assert_eq!(manager.get(id).unwrap().author, "reviewer");

        let named = RectangleAnnotation::new(1, Rect::new(0.0, 0.0, 10.0, 10.0))
            .with_author("someone else");
        let other = manager.add_annotation(named);
        assert_eq!(manager.get(other).unwrap().author, "someone else");
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn redrawing_an_unknown_annotation_fails() {
        let mut manager = AnnotationManager::new();
        assert!(matches!(
            manager.redraw_annotation(99),
            Err(RendererError::AnnotationNotFound(99))
        ));
    }

    #[test]
    fn save_writes_the_document() {
        let document = Document::new(letter_page(), 1).unwrap();
        let mut manager = AnnotationManager::new();
        let id = manager.add_annotation(rect_annotation());
        manager.redraw_annotation(id).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotated.pdf");
        document.save(&manager, &path).unwrap();
        assert!(path.metadata().unwrap().len() > 0);
    }
}
