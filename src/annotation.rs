//! Annotation model
//!
//! A rectangle annotation is positioned in page coordinates with the origin
//! at the top-left corner of the page, and optionally carries a converted
//! drawing surface as its custom visual appearance.

use serde::{Deserialize, Serialize};

use crate::appearance::AppearanceStream;
use crate::types::Rect;

/// Identifier assigned by the annotation manager at registration.
pub type AnnotationId = u64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RectangleAnnotation {
    /// 1-based page number the annotation sits on.
    pub page_number: u32,
    /// Position and extent in page coordinates, origin top-left.
    pub rect: Rect,
    /// Author attribution; filled from the manager's current user when
    /// registered empty.
    pub author: String,
    #[serde(skip)]
    appearance: Option<AppearanceStream>,
}

impl RectangleAnnotation {
    pub fn new(page_number: u32, rect: Rect) -> Self {
        Self {
            page_number,
            rect,
            author: String::new(),
            appearance: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Bind a converted drawing surface as this annotation's appearance,
    /// replacing any previous one.
    pub fn add_custom_appearance(&mut self, appearance: AppearanceStream) {
        self.appearance = Some(appearance);
    }

    pub fn custom_appearance(&self) -> Option<&AppearanceStream> {
        self.appearance.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appearance::convert;
    use crate::patterns::FilledRectangle;
    use crate::types::Size;

    #[test]
    fn appearance_binding_replaces() {
        let mut annot = RectangleAnnotation::new(1, Rect::new(0.0, 0.0, 600.0, 600.0));
        assert!(annot.custom_appearance().is_none());

        annot.add_custom_appearance(convert(
            &FilledRectangle::default(),
            Size::new(600.0, 600.0),
        ));
        assert!(annot.custom_appearance().is_some());

        let smaller = convert(&FilledRectangle::default(), Size::new(100.0, 100.0));
        annot.add_custom_appearance(smaller);
        assert_eq!(
            annot.custom_appearance().unwrap().size(),
            Size::new(100.0, 100.0)
        );
    }
}
