use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::{ChatClient, DocumentRenderer};
use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    clear_chat_handler, get_chat_handler, get_session_handler, health_handler, next_page_handler,
    previous_page_handler, raster_handler, send_message_handler, set_page_handler,
    set_zoom_handler, upload_document_handler, zoom_in_handler, zoom_out_handler,
};
use crate::presentation::state::AppState;

pub fn create_router<R, C>(state: AppState<R, C>) -> Router
where
    R: DocumentRenderer + ?Sized + 'static,
    C: ChatClient + ?Sized + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let upload_limit = DefaultBodyLimit::max(state.viewer.max_upload_bytes());

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/v1/documents",
            post(upload_document_handler::<R, C>).layer(upload_limit),
        )
        .route("/api/v1/session", get(get_session_handler::<R, C>))
        .route("/api/v1/session/page", put(set_page_handler::<R, C>))
        .route("/api/v1/session/page/next", post(next_page_handler::<R, C>))
        .route(
            "/api/v1/session/page/previous",
            post(previous_page_handler::<R, C>),
        )
        .route("/api/v1/session/zoom", put(set_zoom_handler::<R, C>))
        .route("/api/v1/session/zoom/in", post(zoom_in_handler::<R, C>))
        .route("/api/v1/session/zoom/out", post(zoom_out_handler::<R, C>))
        .route("/api/v1/session/raster", get(raster_handler::<R, C>))
        .route(
            "/api/v1/chat",
            get(get_chat_handler::<R, C>)
                .post(send_message_handler::<R, C>)
                .delete(clear_chat_handler::<R, C>),
        )
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
