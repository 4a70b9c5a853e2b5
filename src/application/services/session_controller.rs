use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::application::ports::{
    ChatClient, DocumentHandle, DocumentLoadError, DocumentRenderer,
};
use crate::domain::{
    Corpus, ContentType, Document, DocumentSession, ExtractionState, ExtractionStatus,
    Generation, RasterImage, Transcript, Zoom,
};

use super::chat_session::{ChatSession, SendRejected};
use super::text_extractor::{ExtractionTicket, TextExtractor};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("document load failed: {0}")]
    Load(#[from] DocumentLoadError),
    #[error("load superseded by a newer upload (generation {generation})")]
    Superseded { generation: Generation },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Applied,
    Superseded,
    Failed,
    NoDocument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendReport {
    Replied,
    Apologized,
    /// The transcript was reset while the request was outstanding.
    Discarded,
}

/// Background text extraction for one load. Dropping it detaches the task.
pub struct ExtractionTask(JoinHandle<()>);

impl ExtractionTask {
    pub async fn join(self) {
        if let Err(e) = self.0.await {
            tracing::error!(error = %e, "Extraction task panicked or was cancelled");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.0.is_finished()
    }
}

pub struct DocumentLoaded {
    pub session: DocumentSession,
    pub render: RenderOutcome,
    pub extraction: ExtractionTask,
}

#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub document: Option<DocumentSession>,
    pub extraction: ExtractionState,
    pub transcript: Transcript,
    pub chat_loading: bool,
    pub has_raster: bool,
}

struct ActiveDocument {
    session: DocumentSession,
    handle: DocumentHandle,
}

struct SessionState {
    requested: Generation,
    document: Option<ActiveDocument>,
    extraction: ExtractionState,
    chat: ChatSession,
    render_ticket: u64,
    raster: Option<RasterImage>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            requested: Generation::INITIAL,
            document: None,
            extraction: ExtractionState::idle(),
            chat: ChatSession::new(),
            render_ticket: 0,
            raster: None,
        }
    }

    fn is_active(&self, generation: Generation) -> bool {
        self.document
            .as_ref()
            .is_some_and(|d| d.session.generation == generation)
    }
}

/// Single authority over the active document, its view state, the
/// extracted corpus and the chat transcript. The lock is never held across
/// a renderer or chat-client call.
pub struct SessionController<R: ?Sized, C: ?Sized>
where
    R: DocumentRenderer,
    C: ChatClient,
{
    renderer: Arc<R>,
    chat_client: Arc<C>,
    extractor: Arc<TextExtractor<R>>,
    state: Arc<Mutex<SessionState>>,
    active_generation: Arc<AtomicU64>,
}

impl<R: ?Sized, C: ?Sized> Clone for SessionController<R, C>
where
    R: DocumentRenderer,
    C: ChatClient,
{
    fn clone(&self) -> Self {
        Self {
            renderer: Arc::clone(&self.renderer),
            chat_client: Arc::clone(&self.chat_client),
            extractor: Arc::clone(&self.extractor),
            state: Arc::clone(&self.state),
            active_generation: Arc::clone(&self.active_generation),
        }
    }
}

impl<R: ?Sized, C: ?Sized> SessionController<R, C>
where
    R: DocumentRenderer + 'static,
    C: ChatClient + 'static,
{
    pub fn new(renderer: Arc<R>, chat_client: Arc<C>, max_extracted_pages: u32) -> Self {
        let extractor = TextExtractor::with_page_limit(Arc::clone(&renderer), max_extracted_pages);
        Self {
            renderer,
            chat_client,
            extractor: Arc::new(extractor),
            state: Arc::new(Mutex::new(SessionState::new())),
            active_generation: Arc::new(AtomicU64::new(Generation::INITIAL.as_u64())),
        }
    }

    /// Parses `data` and, if no newer load has committed meanwhile, makes it
    /// the active document. Text extraction runs in the background.
    #[tracing::instrument(skip(self, data), fields(bytes = data.len()))]
    pub async fn load_document(
        &self,
        file_name: String,
        data: Vec<u8>,
    ) -> Result<DocumentLoaded, SessionError> {
        let generation = {
            let mut state = self.state.lock().await;
            state.requested = state.requested.next();
            state.requested
        };
        tracing::info!(%generation, "Loading document");

        let size_bytes = data.len() as u64;
        let handle = self.renderer.load_document(&data).await.map_err(|e| {
            tracing::warn!(%generation, error = %e, "Document load failed, keeping previous session");
            SessionError::Load(e)
        })?;
        let page_count = self.renderer.page_count(&handle);

        let session = {
            let mut state = self.state.lock().await;
            if let Some(active) = &state.document {
                if active.session.generation > generation {
                    tracing::debug!(
                        %generation,
                        active = %active.session.generation,
                        "Discarding load superseded by a newer upload"
                    );
                    return Err(SessionError::Superseded { generation });
                }
            }

            let document = Document::new(file_name.clone(), ContentType::Pdf, size_bytes);
            let session = DocumentSession::new(document, generation, page_count);
            state.document = Some(ActiveDocument {
                session: session.clone(),
                handle: handle.clone(),
            });
            state.extraction = ExtractionState::in_progress(page_count);
            state.chat.reset(Transcript::welcome());
            state.raster = None;
            state.render_ticket += 1;
            self.active_generation
                .store(generation.as_u64(), Ordering::Release);
            session
        };

        tracing::info!(
            %generation,
            document_id = %session.document.id.as_uuid(),
            page_count,
            "Document session started"
        );

        let ticket = ExtractionTicket::new(generation, Arc::clone(&self.active_generation));
        let extraction = ExtractionTask(tokio::spawn(Self::run_extraction(
            Arc::clone(&self.extractor),
            Arc::clone(&self.state),
            handle,
            page_count,
            ticket,
            file_name,
        )));

        let render = self.render_current_page().await;

        Ok(DocumentLoaded {
            session,
            render,
            extraction,
        })
    }

    async fn run_extraction(
        extractor: Arc<TextExtractor<R>>,
        state: Arc<Mutex<SessionState>>,
        handle: DocumentHandle,
        page_count: u32,
        ticket: ExtractionTicket,
        file_name: String,
    ) {
        let generation = ticket.generation();
        let result = extractor.extract(&handle, page_count, &ticket).await;

        let mut state = state.lock().await;
        if !state.is_active(generation) {
            tracing::debug!(%generation, "Discarding extraction result from a superseded load");
            return;
        }

        match result {
            Ok(corpus) => {
                tracing::info!(
                    %generation,
                    pages_extracted = corpus.pages_extracted(),
                    truncated = corpus.is_truncated(),
                    "Document text ready"
                );
                if !corpus.is_empty() {
                    state
                        .chat
                        .reset(Transcript::document_ready(&file_name, &corpus));
                }
                state.extraction = ExtractionState {
                    corpus,
                    status: ExtractionStatus::Completed,
                };
            }
            Err(failure) => {
                tracing::error!(
                    %generation,
                    error = %failure.error,
                    pages_extracted = failure.partial.pages_extracted(),
                    "Text extraction failed, chat falls back to partial context"
                );
                state.extraction = ExtractionState {
                    corpus: failure.partial,
                    status: ExtractionStatus::Failed {
                        reason: failure.error.to_string(),
                    },
                };
            }
        }
    }

    /// Renders the current page. Only the most recently requested render is
    /// applied; failures keep the previous raster.
    pub async fn render_current_page(&self) -> RenderOutcome {
        let (handle, page, zoom, generation, ticket) = {
            let mut state = self.state.lock().await;
            let Some(active) = &state.document else {
                return RenderOutcome::NoDocument;
            };
            let handle = active.handle.clone();
            let page = active.session.current_page;
            let zoom = active.session.zoom;
            let generation = active.session.generation;
            state.render_ticket += 1;
            (handle, page, zoom, generation, state.render_ticket)
        };

        let result = self.renderer.render_page(&handle, page, zoom).await;

        match result {
            Ok(raster) => {
                let mut state = self.state.lock().await;
                if state.render_ticket != ticket || !state.is_active(generation) {
                    tracing::debug!(page, %zoom, "Discarding superseded render");
                    return RenderOutcome::Superseded;
                }
                state.raster = Some(raster);
                RenderOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(page, %zoom, error = %e, "Render failed, keeping previous raster");
                RenderOutcome::Failed
            }
        }
    }

    async fn update_view<F>(&self, update: F) -> Option<DocumentSession>
    where
        F: FnOnce(&DocumentSession) -> DocumentSession,
    {
        let (session, changed) = {
            let mut state = self.state.lock().await;
            let shown = state.raster.as_ref().map(|r| (r.page, r.zoom));
            let active = state.document.as_mut()?;
            let updated = update(&active.session);
            // A failed render leaves an older raster on screen; retry it.
            let changed = updated != active.session
                || shown != Some((updated.current_page, updated.zoom));
            active.session = updated;
            (active.session.clone(), changed)
        };

        if changed {
            self.render_current_page().await;
        }
        Some(session)
    }

    pub async fn set_page(&self, page: i64) -> Option<DocumentSession> {
        self.update_view(|s| s.with_page(page)).await
    }

    pub async fn next_page(&self) -> Option<DocumentSession> {
        self.update_view(|s| s.with_page(i64::from(s.current_page) + 1))
            .await
    }

    pub async fn previous_page(&self) -> Option<DocumentSession> {
        self.update_view(|s| s.with_page(i64::from(s.current_page) - 1))
            .await
    }

    pub async fn set_zoom(&self, zoom: f32) -> Option<DocumentSession> {
        self.update_view(|s| s.with_zoom(Zoom::new(zoom))).await
    }

    pub async fn zoom_in(&self) -> Option<DocumentSession> {
        self.update_view(|s| s.with_zoom(s.zoom.zoom_in())).await
    }

    pub async fn zoom_out(&self) -> Option<DocumentSession> {
        self.update_view(|s| s.with_zoom(s.zoom.zoom_out())).await
    }

    /// Single-flight: a second call while one is outstanding is rejected.
    pub async fn send_message(&self, text: &str) -> Result<SendReport, SendRejected> {
        let pending = {
            let mut state = self.state.lock().await;
            let SessionState {
                chat, extraction, ..
            } = &mut *state;
            chat.begin_send(text, &extraction.corpus)?
        };

        tracing::debug!(
            prior_turns = pending.prior.len(),
            context_chars = pending.context.len(),
            "Sending chat message"
        );

        let reply = self
            .chat_client
            .converse(&pending.prior, &pending.message, &pending.context)
            .await;
        let failed = reply.is_err();

        let mut state = self.state.lock().await;
        if !state.chat.complete_send(&pending, reply) {
            tracing::debug!(epoch = pending.epoch(), "Discarding reply for a reset transcript");
            return Ok(SendReport::Discarded);
        }

        Ok(if failed {
            SendReport::Apologized
        } else {
            SendReport::Replied
        })
    }

    pub async fn clear_chat(&self) {
        self.state.lock().await.chat.clear();
    }

    pub async fn is_chat_loading(&self) -> bool {
        self.state.lock().await.chat.is_loading()
    }

    pub async fn current_raster(&self) -> Option<RasterImage> {
        self.state.lock().await.raster.clone()
    }

    pub async fn corpus(&self) -> Corpus {
        self.state.lock().await.extraction.corpus.clone()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        SessionSnapshot {
            document: state.document.as_ref().map(|d| d.session.clone()),
            extraction: state.extraction.clone(),
            transcript: state.chat.transcript().clone(),
            chat_loading: state.chat.is_loading(),
            has_raster: state.raster.is_some(),
        }
    }
}
