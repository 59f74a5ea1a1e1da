//! Viewer shell
//!
//! Minimal host around a document: listeners subscribe to the
//! document-loaded signal, and attachment work happens inside those
//! callbacks with the annotation manager in hand. Everything is
//! synchronous and single-threaded; loading simply sequences
//! load → notify listeners.

use std::path::Path;

use crate::document::{AnnotationManager, Document};
use crate::error::{RendererError, RendererResult};

type DocumentLoadedListener = Box<dyn FnMut(&Document, &mut AnnotationManager)>;

pub struct Viewer {
    document: Option<Document>,
    annotations: AnnotationManager,
    document_loaded: Vec<DocumentLoadedListener>,
}

impl Viewer {
    pub fn new() -> Self {
        Self {
            document: None,
            annotations: AnnotationManager::new(),
            document_loaded: Vec::new(),
        }
    }

    /// Subscribe to the document-loaded signal. Listeners run in
    /// subscription order, once per load.
    pub fn on_document_loaded(
        &mut self,
        listener: impl FnMut(&Document, &mut AnnotationManager) + 'static,
    ) {
        self.document_loaded.push(Box::new(listener));
    }

    pub fn load_document(&mut self, document: Document) {
        log::info!("document loaded: {} page(s)", document.page_count());
        self.document = Some(document);
        if let Some(document) = self.document.as_ref() {
            for listener in self.document_loaded.iter_mut() {
                listener(document, &mut self.annotations);
            }
        }
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn annotation_manager(&self) -> &AnnotationManager {
        &self.annotations
    }

    pub fn annotation_manager_mut(&mut self) -> &mut AnnotationManager {
        &mut self.annotations
    }

    /// Write the loaded document with its annotations.
    pub fn save(&self, path: impl AsRef<Path>) -> RendererResult<()> {
        match &self.document {
            Some(document) => document.save(&self.annotations, path),
            None => Err(RendererError::Pdf("no document loaded".to_string())),
        }
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::RectangleAnnotation;
    use crate::types::{Rect, Size};

    #[test]
    fn listeners_fire_once_per_load() {
        let mut viewer = Viewer::new();
        viewer.on_document_loaded(|document, manager| {
            assert_eq!(document.page_count(), 1);
            let id = manager.add_annotation(RectangleAnnotation::new(
                1,
                Rect::new(0.0, 0.0, 50.0, 50.0),
            ));
            manager.redraw_annotation(id).expect("just registered");
        });

        assert!(viewer.document().is_none());
        viewer.load_document(Document::new(Size::new(612.0, 792.0), 1).unwrap());
        assert_eq!(viewer.annotation_manager().len(), 1);
    }

    #[test]
    fn saving_without_a_document_fails() {
        let viewer = Viewer::new();
        assert!(viewer.save("nowhere.pdf").is_err());
    }
}
