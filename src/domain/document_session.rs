use super::{Document, Generation, Zoom};

/// The active document and its view state. Replaced wholesale on every
/// successful load.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSession {
    pub document: Document,
    pub generation: Generation,
    pub page_count: u32,
    pub current_page: u32,
    pub zoom: Zoom,
}

impl DocumentSession {
    pub fn new(document: Document, generation: Generation, page_count: u32) -> Self {
        Self {
            document,
            generation,
            page_count,
            current_page: 1,
            zoom: Zoom::default(),
        }
    }

    /// Maps any requested page into `[1, page_count]`. A zero-page document
    /// still reports page 1.
    pub fn clamp_page(&self, requested: i64) -> u32 {
        let last = i64::from(self.page_count.max(1));
        requested.clamp(1, last) as u32
    }

    pub fn with_page(&self, requested: i64) -> Self {
        Self {
            current_page: self.clamp_page(requested),
            ..self.clone()
        }
    }

    pub fn with_zoom(&self, zoom: Zoom) -> Self {
        Self {
            zoom,
            ..self.clone()
        }
    }

    pub fn file_name(&self) -> &str {
        &self.document.filename
    }
}
