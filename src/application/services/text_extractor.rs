use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::application::ports::{DocumentHandle, DocumentRenderer, ExtractionError};
use crate::domain::{Corpus, Generation, MAX_EXTRACTED_PAGES};

/// Lets a running extraction notice that a newer load has committed.
#[derive(Debug, Clone)]
pub struct ExtractionTicket {
    generation: Generation,
    active: Arc<AtomicU64>,
}

impl ExtractionTicket {
    pub fn new(generation: Generation, active: Arc<AtomicU64>) -> Self {
        Self { generation, active }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.active.load(Ordering::Acquire) == self.generation.as_u64()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("extraction stopped: {error}")]
pub struct ExtractionFailure {
    pub partial: Corpus,
    pub error: ExtractionError,
}

pub struct TextExtractor<R: ?Sized>
where
    R: DocumentRenderer,
{
    renderer: Arc<R>,
    max_pages: u32,
}

impl<R: ?Sized> TextExtractor<R>
where
    R: DocumentRenderer,
{
    pub fn new(renderer: Arc<R>) -> Self {
        Self::with_page_limit(renderer, MAX_EXTRACTED_PAGES)
    }

    /// The limit can be lowered but never raised past `MAX_EXTRACTED_PAGES`.
    pub fn with_page_limit(renderer: Arc<R>, max_pages: u32) -> Self {
        Self {
            renderer,
            max_pages: max_pages.clamp(1, MAX_EXTRACTED_PAGES),
        }
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Walks pages `1..=min(page_count, max_pages)` in order. The first page
    /// error stops the walk and hands back what was gathered so far.
    #[tracing::instrument(skip(self, handle, ticket), fields(generation = %ticket.generation()))]
    pub async fn extract(
        &self,
        handle: &DocumentHandle,
        page_count: u32,
        ticket: &ExtractionTicket,
    ) -> Result<Corpus, ExtractionFailure> {
        let last_page = page_count.min(self.max_pages);
        let mut corpus = Corpus::new(page_count);

        if page_count > self.max_pages {
            tracing::warn!(
                page_count,
                max_pages = self.max_pages,
                "Document exceeds extraction limit, corpus will be partial"
            );
        }

        for page in 1..=last_page {
            if !ticket.is_current() {
                return Err(ExtractionFailure {
                    partial: corpus,
                    error: ExtractionError::Superseded {
                        generation: ticket.generation().as_u64(),
                    },
                });
            }

            match self.renderer.page_text(handle, page).await {
                Ok(text) => {
                    tracing::trace!(page, chars = text.len(), "Page text extracted");
                    corpus.push_page(page, &text);
                }
                Err(error) => {
                    return Err(ExtractionFailure {
                        partial: corpus,
                        error,
                    });
                }
            }
        }

        tracing::debug!(
            pages_extracted = corpus.pages_extracted(),
            chars = corpus.text().len(),
            "Text extraction complete"
        );

        Ok(corpus)
    }
}
