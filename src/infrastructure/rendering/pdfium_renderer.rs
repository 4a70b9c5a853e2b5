use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::ImageFormat;
use pdfium_render::prelude::*;

use crate::application::ports::{
    DocumentHandle, DocumentLoadError, DocumentRenderer, ExtractionError, RenderError,
};
use crate::domain::{RasterImage, Zoom};
use crate::infrastructure::text_processing::flatten_page_text;

const OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Renderer backed by pdfium. Pdfium bindings are not `Send`, so every
/// operation binds the library and reopens the document inside its own
/// blocking task.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRenderer {
    library_dir: Option<PathBuf>,
}

impl PdfiumRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_library_dir(library_dir: impl Into<PathBuf>) -> Self {
        Self {
            library_dir: Some(library_dir.into()),
        }
    }

    fn bind(library_dir: Option<&PathBuf>) -> Result<Pdfium, PdfiumError> {
        let bindings = match library_dir {
            Some(dir) => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))?
            }
            None => Pdfium::bind_to_system_library()?,
        };
        Ok(Pdfium::new(bindings))
    }

    fn count_pages(library_dir: Option<PathBuf>, data: &[u8]) -> Result<u32, DocumentLoadError> {
        let pdfium = Self::bind(library_dir.as_ref())
            .map_err(|e| DocumentLoadError::RendererUnavailable(e.to_string()))?;
        let doc = pdfium
            .load_pdf_from_byte_slice(data, None)
            .map_err(|e| DocumentLoadError::InvalidDocument(e.to_string()))?;
        Ok(u32::try_from(doc.pages().len()).unwrap_or(0))
    }

    fn rasterize(
        library_dir: Option<PathBuf>,
        data: &[u8],
        page: u32,
        zoom: Zoom,
    ) -> Result<RasterImage, RenderError> {
        let failed = |reason: String| RenderError::RenderFailed { page, reason };

        let pdfium = Self::bind(library_dir.as_ref()).map_err(|e| failed(e.to_string()))?;
        let doc = pdfium
            .load_pdf_from_byte_slice(data, None)
            .map_err(|e| failed(e.to_string()))?;
        let index = page_index(page, doc.pages().len()).ok_or(RenderError::PageOutOfRange { page })?;
        let pdf_page = doc
            .pages()
            .get(index.try_into().map_err(|_| RenderError::PageOutOfRange { page })?)
            .map_err(|e| failed(e.to_string()))?;

        let width = (pdf_page.width().value * zoom.value()).round().max(1.0) as i32;
        let height = (pdf_page.height().value * zoom.value()).round().max(1.0) as i32;

        let bitmap = pdf_page
            .render_with_config(
                &PdfRenderConfig::new()
                    .set_target_width(width)
                    .set_target_height(height),
            )
            .map_err(|e| failed(e.to_string()))?;

        let image = bitmap.as_image();
        let mut png: Vec<u8> = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| RenderError::EncodingFailed {
                page,
                reason: e.to_string(),
            })?;

        Ok(RasterImage {
            page,
            zoom,
            width: image.width(),
            height: image.height(),
            png,
        })
    }

    fn extract_text(
        library_dir: Option<PathBuf>,
        data: &[u8],
        page: u32,
    ) -> Result<String, ExtractionError> {
        let failed = |reason: String| ExtractionError::PageText { page, reason };

        let pdfium = Self::bind(library_dir.as_ref()).map_err(|e| failed(e.to_string()))?;
        let doc = pdfium
            .load_pdf_from_byte_slice(data, None)
            .map_err(|e| failed(e.to_string()))?;
        let index = page_index(page, doc.pages().len())
            .ok_or_else(|| failed("page out of range".to_string()))?;
        let pdf_page = doc
            .pages()
            .get(
                index
                    .try_into()
                    .map_err(|_| failed("page out of range".to_string()))?,
            )
            .map_err(|e| failed(e.to_string()))?;
        let text = pdf_page.text().map_err(|e| failed(e.to_string()))?;

        Ok(flatten_page_text(&text.all()))
    }
}

/// 1-based page number to pdfium's 0-based index.
fn page_index<L>(page: u32, len: L) -> Option<u32>
where
    u32: TryFrom<L>,
{
    let len = u32::try_from(len).ok()?;
    let index = page.checked_sub(1)?;
    (index < len).then_some(index)
}

async fn run_blocking<T, E, F>(operation: F, on_failure: impl Fn(String) -> E) -> Result<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
    F: FnOnce() -> Result<T, E> + Send + 'static,
{
    tokio::time::timeout(OPERATION_TIMEOUT, tokio::task::spawn_blocking(operation))
        .await
        .map_err(|_| on_failure("pdfium operation timed out".to_string()))?
        .map_err(|e| on_failure(format!("task join error: {e}")))?
}

#[async_trait]
impl DocumentRenderer for PdfiumRenderer {
    #[tracing::instrument(skip(self, data), fields(bytes = data.len()))]
    async fn load_document(&self, data: &[u8]) -> Result<DocumentHandle, DocumentLoadError> {
        let bytes: Arc<[u8]> = Arc::from(data);
        let library_dir = self.library_dir.clone();
        let shared = Arc::clone(&bytes);

        let page_count = run_blocking(
            move || Self::count_pages(library_dir, &shared),
            DocumentLoadError::TaskFailed,
        )
        .await?;

        tracing::info!(page_count, "PDF parsed");
        Ok(DocumentHandle::new(bytes, page_count))
    }

    #[tracing::instrument(skip(self, handle), fields(zoom = %zoom))]
    async fn render_page(
        &self,
        handle: &DocumentHandle,
        page: u32,
        zoom: Zoom,
    ) -> Result<RasterImage, RenderError> {
        let library_dir = self.library_dir.clone();
        let data = Arc::clone(handle.data());

        run_blocking(
            move || Self::rasterize(library_dir, &data, page, zoom),
            move |reason| RenderError::RenderFailed { page, reason },
        )
        .await
    }

    #[tracing::instrument(skip(self, handle))]
    async fn page_text(
        &self,
        handle: &DocumentHandle,
        page: u32,
    ) -> Result<String, ExtractionError> {
        let library_dir = self.library_dir.clone();
        let data = Arc::clone(handle.data());

        run_blocking(
            move || Self::extract_text(library_dir, &data, page),
            move |reason| ExtractionError::PageText { page, reason },
        )
        .await
    }
}
