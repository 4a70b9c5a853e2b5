use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{RasterImage, Zoom};

/// Opaque handle to a parsed document. Cloning shares the underlying bytes.
#[derive(Debug, Clone)]
pub struct DocumentHandle {
    data: Arc<[u8]>,
    page_count: u32,
}

impl DocumentHandle {
    pub fn new(data: Arc<[u8]>, page_count: u32) -> Self {
        Self { data, page_count }
    }

    pub fn data(&self) -> &Arc<[u8]> {
        &self.data
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }
}

#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn load_document(&self, data: &[u8]) -> Result<DocumentHandle, DocumentLoadError>;

    async fn render_page(
        &self,
        handle: &DocumentHandle,
        page: u32,
        zoom: Zoom,
    ) -> Result<RasterImage, RenderError>;

    async fn page_text(&self, handle: &DocumentHandle, page: u32)
    -> Result<String, ExtractionError>;

    fn page_count(&self, handle: &DocumentHandle) -> u32 {
        handle.page_count()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentLoadError {
    #[error("renderer unavailable: {0}")]
    RendererUnavailable(String),
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[error("load task failed: {0}")]
    TaskFailed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("page {page} out of range")]
    PageOutOfRange { page: u32 },
    #[error("render failed on page {page}: {reason}")]
    RenderFailed { page: u32, reason: String },
    #[error("encoding failed on page {page}: {reason}")]
    EncodingFailed { page: u32, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("text unavailable on page {page}: {reason}")]
    PageText { page: u32, reason: String },
    #[error("superseded by a newer load (generation {generation})")]
    Superseded { generation: u64 },
}
