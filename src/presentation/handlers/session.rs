use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use super::responses::{SessionResponse, error_response};
use crate::application::ports::{ChatClient, DocumentRenderer};
use crate::domain::DocumentSession;
use crate::presentation::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageRequest {
    /// Any JSON number; out-of-range values saturate and are then clamped
    /// to the document.
    pub page: f64,
}

impl PageRequest {
    pub fn requested_page(&self) -> i64 {
        // Float to int casts saturate; NaN becomes 0 and clamps to page 1.
        self.page.trunc() as i64
    }
}

#[derive(Debug, Deserialize)]
pub struct ZoomRequest {
    pub zoom: f32,
}

pub async fn get_session_handler<R, C>(State(state): State<AppState<R, C>>) -> impl IntoResponse
where
    R: DocumentRenderer + ?Sized + 'static,
    C: ChatClient + ?Sized + 'static,
{
    let snapshot = state.session.snapshot().await;
    (StatusCode::OK, Json(SessionResponse::from(&snapshot)))
}

async fn view_response<R, C>(state: &AppState<R, C>, updated: Option<DocumentSession>) -> Response
where
    R: DocumentRenderer + ?Sized + 'static,
    C: ChatClient + ?Sized + 'static,
{
    match updated {
        Some(session) => {
            tracing::debug!(
                page = session.current_page,
                zoom = %session.zoom,
                "View updated"
            );
            let snapshot = state.session.snapshot().await;
            (StatusCode::OK, Json(SessionResponse::from(&snapshot))).into_response()
        }
        None => error_response(StatusCode::NOT_FOUND, "No document loaded"),
    }
}

#[tracing::instrument(skip(state))]
pub async fn set_page_handler<R, C>(
    State(state): State<AppState<R, C>>,
    Json(request): Json<PageRequest>,
) -> Response
where
    R: DocumentRenderer + ?Sized + 'static,
    C: ChatClient + ?Sized + 'static,
{
    let updated = state.session.set_page(request.requested_page()).await;
    view_response(&state, updated).await
}

pub async fn next_page_handler<R, C>(State(state): State<AppState<R, C>>) -> Response
where
    R: DocumentRenderer + ?Sized + 'static,
    C: ChatClient + ?Sized + 'static,
{
    let updated = state.session.next_page().await;
    view_response(&state, updated).await
}

pub async fn previous_page_handler<R, C>(State(state): State<AppState<R, C>>) -> Response
where
    R: DocumentRenderer + ?Sized + 'static,
    C: ChatClient + ?Sized + 'static,
{
    let updated = state.session.previous_page().await;
    view_response(&state, updated).await
}

#[tracing::instrument(skip(state))]
pub async fn set_zoom_handler<R, C>(
    State(state): State<AppState<R, C>>,
    Json(request): Json<ZoomRequest>,
) -> Response
where
    R: DocumentRenderer + ?Sized + 'static,
    C: ChatClient + ?Sized + 'static,
{
    let updated = state.session.set_zoom(request.zoom).await;
    view_response(&state, updated).await
}

pub async fn zoom_in_handler<R, C>(State(state): State<AppState<R, C>>) -> Response
where
    R: DocumentRenderer + ?Sized + 'static,
    C: ChatClient + ?Sized + 'static,
{
    let updated = state.session.zoom_in().await;
    view_response(&state, updated).await
}

pub async fn zoom_out_handler<R, C>(State(state): State<AppState<R, C>>) -> Response
where
    R: DocumentRenderer + ?Sized + 'static,
    C: ChatClient + ?Sized + 'static,
{
    let updated = state.session.zoom_out().await;
    view_response(&state, updated).await
}

pub async fn raster_handler<R, C>(State(state): State<AppState<R, C>>) -> Response
where
    R: DocumentRenderer + ?Sized + 'static,
    C: ChatClient + ?Sized + 'static,
{
    match state.session.current_raster().await {
        Some(raster) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "image/png".to_string()),
                (header::CACHE_CONTROL, "no-store".to_string()),
                (
                    header::HeaderName::from_static("x-page"),
                    raster.page.to_string(),
                ),
                (
                    header::HeaderName::from_static("x-zoom-percent"),
                    raster.zoom.percent().to_string(),
                ),
            ],
            raster.png,
        )
            .into_response(),
        None => error_response(StatusCode::NOT_FOUND, "No page has been rendered"),
    }
}
