mod corpus;
mod document;
mod document_session;
mod generation;
mod message;
mod message_id;
mod message_role;
mod raster;
mod transcript;
mod zoom;

pub use corpus::{Corpus, ExtractionState, ExtractionStatus, MAX_EXTRACTED_PAGES};
pub use document::{ContentType, Document, DocumentId};
pub use document_session::DocumentSession;
pub use generation::Generation;
pub use message::Message;
pub use message_id::MessageId;
pub use message_role::MessageRole;
pub use raster::RasterImage;
pub use transcript::{CLEARED_MESSAGE, ChatTurn, Transcript, WELCOME_MESSAGE};
pub use zoom::{DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP, Zoom};
