use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use super::responses::{ChatResponse, error_response};
use crate::application::ports::{ChatClient, DocumentRenderer};
use crate::application::services::SendRejected;
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

pub async fn get_chat_handler<R, C>(State(state): State<AppState<R, C>>) -> impl IntoResponse
where
    R: DocumentRenderer + ?Sized + 'static,
    C: ChatClient + ?Sized + 'static,
{
    let snapshot = state.session.snapshot().await;
    (
        StatusCode::OK,
        Json(ChatResponse::new(&snapshot.transcript, snapshot.chat_loading)),
    )
}

#[tracing::instrument(skip(state, request))]
pub async fn send_message_handler<R, C>(
    State(state): State<AppState<R, C>>,
    Json(request): Json<ChatRequest>,
) -> Response
where
    R: DocumentRenderer + ?Sized + 'static,
    C: ChatClient + ?Sized + 'static,
{
    tracing::info!(prompt = %sanitize_prompt(&request.message), "Chat message received");

    match state.session.send_message(&request.message).await {
        Ok(report) => {
            tracing::debug!(?report, "Chat exchange finished");
            let snapshot = state.session.snapshot().await;
            (
                StatusCode::OK,
                Json(
                    ChatResponse::new(&snapshot.transcript, snapshot.chat_loading)
                        .with_outcome(report),
                ),
            )
                .into_response()
        }
        Err(SendRejected::Empty) => {
            error_response(StatusCode::BAD_REQUEST, SendRejected::Empty.to_string())
        }
        Err(SendRejected::InFlight) => {
            tracing::debug!("Rejected chat message while a reply is pending");
            error_response(StatusCode::CONFLICT, SendRejected::InFlight.to_string())
        }
    }
}

pub async fn clear_chat_handler<R, C>(State(state): State<AppState<R, C>>) -> impl IntoResponse
where
    R: DocumentRenderer + ?Sized + 'static,
    C: ChatClient + ?Sized + 'static,
{
    state.session.clear_chat().await;
    tracing::info!("Chat cleared");
    let snapshot = state.session.snapshot().await;
    (
        StatusCode::OK,
        Json(ChatResponse::new(&snapshot.transcript, snapshot.chat_loading)),
    )
}
