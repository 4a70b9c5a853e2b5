use super::{Corpus, Message, MessageRole};

pub const WELCOME_MESSAGE: &str = "Hello! I am your AI document assistant. Upload a PDF and I can summarize it or answer any questions about its content.";
pub const CLEARED_MESSAGE: &str = "Chat cleared. How can I help you with the document?";

/// A role/text pair as handed to the chat client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: MessageRole,
    pub text: String,
}

/// Ordered chat history. Append-only; resets replace the whole value.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn welcome() -> Self {
        Self::starting_with(WELCOME_MESSAGE)
    }

    pub fn cleared() -> Self {
        Self::starting_with(CLEARED_MESSAGE)
    }

    pub fn document_ready(file_name: &str, corpus: &Corpus) -> Self {
        let mut greeting = format!("I've analyzed \"{file_name}\". What would you like to know?");
        if corpus.is_truncated() {
            greeting.push_str(&format!(
                " Note: only the first {} of {} pages were analyzed.",
                corpus.pages_extracted(),
                corpus.page_count()
            ));
        }
        Self::starting_with(greeting)
    }

    fn starting_with(text: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::model(text)],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn turns(&self) -> Vec<ChatTurn> {
        self.messages
            .iter()
            .map(|m| ChatTurn {
                role: m.role,
                text: m.text.clone(),
            })
            .collect()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::welcome()
    }
}
