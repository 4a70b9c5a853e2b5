mod chat;
mod documents;
mod health;
pub mod responses;
mod session;

pub use chat::{ChatRequest, clear_chat_handler, get_chat_handler, send_message_handler};
pub use documents::upload_document_handler;
pub use health::health_handler;
pub use session::{
    PageRequest, ZoomRequest, get_session_handler, next_page_handler, previous_page_handler,
    raster_handler, set_page_handler, set_zoom_handler, zoom_in_handler, zoom_out_handler,
};
