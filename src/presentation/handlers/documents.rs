use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::responses::{SessionResponse, error_response};
use crate::application::ports::{ChatClient, DocumentRenderer};
use crate::application::services::SessionError;
use crate::domain::ContentType;
use crate::presentation::state::AppState;

/// Loads the first file field as the active document. Every upload is a
/// fresh load, including a repeat of the current file.
#[tracing::instrument(skip(state, multipart))]
pub async fn upload_document_handler<R, C>(
    State(state): State<AppState<R, C>>,
    mut multipart: Multipart,
) -> impl IntoResponse
where
    R: DocumentRenderer + ?Sized + 'static,
    C: ChatClient + ?Sized + 'static,
{
    let (filename, declared_type, data) = loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => {
                tracing::warn!("Upload request with no file");
                return error_response(StatusCode::BAD_REQUEST, "No file uploaded");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read multipart");
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read multipart: {e}"),
                );
            }
        };

        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let declared_type = field.content_type().map(str::to_string);

        match field.bytes().await {
            Ok(d) => break (filename, declared_type, d),
            Err(e) => {
                tracing::error!(error = %e, "Failed to read file bytes");
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read file: {e}"),
                );
            }
        }
    };

    tracing::debug!(
        filename = %filename,
        content_type = ?declared_type,
        bytes = data.len(),
        "File data received"
    );

    if ContentType::detect(declared_type.as_deref(), &filename, &data).is_none() {
        tracing::warn!(content_type = ?declared_type, "Rejected non-PDF upload");
        return error_response(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Please upload a valid PDF file.",
        );
    }

    match state.session.load_document(filename, data.to_vec()).await {
        Ok(loaded) => {
            tracing::info!(
                document_id = %loaded.session.document.id.as_uuid(),
                generation = %loaded.session.generation,
                render = ?loaded.render,
                "Document uploaded"
            );
            // Extraction keeps running in the background.
            drop(loaded.extraction);
            let snapshot = state.session.snapshot().await;
            (StatusCode::CREATED, Json(SessionResponse::from(&snapshot))).into_response()
        }
        Err(SessionError::Load(e)) => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Could not open the PDF: {e}"),
        ),
        Err(e @ SessionError::Superseded { .. }) => {
            error_response(StatusCode::CONFLICT, e.to_string())
        }
    }
}
