use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::services::{SendReport, SessionSnapshot};
use crate::domain::{DocumentSession, ExtractionState, ExtractionStatus, Message, Transcript};

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

#[derive(Serialize)]
pub struct DocumentResponse {
    pub document_id: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub generation: u64,
    pub page_count: u32,
    pub current_page: u32,
    pub zoom: f32,
    pub zoom_percent: u32,
}

impl From<&DocumentSession> for DocumentResponse {
    fn from(session: &DocumentSession) -> Self {
        Self {
            document_id: session.document.id.as_uuid().to_string(),
            file_name: session.file_name().to_string(),
            content_type: session.document.content_type.as_mime().to_string(),
            size_bytes: session.document.size_bytes,
            generation: session.generation.as_u64(),
            page_count: session.page_count,
            current_page: session.current_page,
            zoom: session.zoom.value(),
            zoom_percent: session.zoom.percent(),
        }
    }
}

#[derive(Serialize)]
pub struct ExtractionResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub pages_extracted: u32,
    pub page_count: u32,
    pub truncated: bool,
}

impl From<&ExtractionState> for ExtractionResponse {
    fn from(state: &ExtractionState) -> Self {
        Self {
            status: state.status.as_str().to_string(),
            reason: match &state.status {
                ExtractionStatus::Failed { reason } => Some(reason.clone()),
                _ => None,
            },
            pages_extracted: state.corpus.pages_extracted(),
            page_count: state.corpus.page_count(),
            truncated: state.is_truncated(),
        }
    }
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub document: Option<DocumentResponse>,
    pub extraction: ExtractionResponse,
    pub chat_loading: bool,
    pub message_count: usize,
    pub has_raster: bool,
}

impl From<&SessionSnapshot> for SessionResponse {
    fn from(snapshot: &SessionSnapshot) -> Self {
        Self {
            document: snapshot.document.as_ref().map(DocumentResponse::from),
            extraction: ExtractionResponse::from(&snapshot.extraction),
            chat_loading: snapshot.chat_loading,
            message_count: snapshot.transcript.len(),
            has_raster: snapshot.has_raster,
        }
    }
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub role: String,
    pub text: String,
    pub timestamp: String,
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.as_uuid().to_string(),
            role: message.role.as_str().to_string(),
            text: message.text.clone(),
            timestamp: message.timestamp.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct ChatResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<&'static str>,
    pub loading: bool,
    pub messages: Vec<MessageResponse>,
}

impl ChatResponse {
    pub fn new(transcript: &Transcript, loading: bool) -> Self {
        Self {
            outcome: None,
            loading,
            messages: transcript.messages().iter().map(MessageResponse::from).collect(),
        }
    }

    pub fn with_outcome(mut self, report: SendReport) -> Self {
        self.outcome = Some(match report {
            SendReport::Replied => "replied",
            SendReport::Apologized => "apologized",
            SendReport::Discarded => "discarded",
        });
        self
    }
}
