mod chat_session;
mod session_controller;
mod text_extractor;

pub use chat_session::{
    APOLOGY_MESSAGE, ChatSession, EMPTY_REPLY_MESSAGE, NO_DOCUMENT_CONTEXT, PendingSend,
    SendRejected,
};
pub use session_controller::{
    DocumentLoaded, ExtractionTask, RenderOutcome, SendReport, SessionController, SessionError,
    SessionSnapshot,
};
pub use text_extractor::{ExtractionFailure, ExtractionTicket, TextExtractor};
