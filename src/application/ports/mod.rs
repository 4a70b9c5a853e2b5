mod chat_client;
mod document_renderer;

pub use chat_client::{ChatClient, ChatClientError};
pub use document_renderer::{
    DocumentHandle, DocumentLoadError, DocumentRenderer, ExtractionError, RenderError,
};
