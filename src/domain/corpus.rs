/// Pages beyond this bound are not extracted; the corpus reports itself as
/// truncated instead.
pub const MAX_EXTRACTED_PAGES: u32 = 50;

/// Concatenated page text used as chat grounding context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    text: String,
    pages_extracted: u32,
    page_count: u32,
}

impl Corpus {
    pub fn new(page_count: u32) -> Self {
        Self {
            text: String::new(),
            pages_extracted: 0,
            page_count,
        }
    }

    pub fn page_marker(page: u32) -> String {
        format!("--- Page {page} ---")
    }

    pub fn push_page(&mut self, page: u32, page_text: &str) {
        self.text.push_str(&Self::page_marker(page));
        self.text.push('\n');
        self.text.push_str(page_text);
        self.text.push_str("\n\n");
        self.pages_extracted += 1;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn pages_extracted(&self) -> u32 {
        self.pages_extracted
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn is_truncated(&self) -> bool {
        self.page_count > self.pages_extracted
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionStatus {
    Idle,
    InProgress,
    Completed,
    Failed { reason: String },
}

impl ExtractionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStatus::Idle => "IDLE",
            ExtractionStatus::InProgress => "IN_PROGRESS",
            ExtractionStatus::Completed => "COMPLETED",
            ExtractionStatus::Failed { .. } => "FAILED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionState {
    pub corpus: Corpus,
    pub status: ExtractionStatus,
}

impl ExtractionState {
    pub fn idle() -> Self {
        Self {
            corpus: Corpus::default(),
            status: ExtractionStatus::Idle,
        }
    }

    pub fn in_progress(page_count: u32) -> Self {
        Self {
            corpus: Corpus::new(page_count),
            status: ExtractionStatus::InProgress,
        }
    }

    /// Truncation only means something once extraction has finished.
    pub fn is_truncated(&self) -> bool {
        self.status == ExtractionStatus::Completed && self.corpus.is_truncated()
    }
}

impl Default for ExtractionState {
    fn default() -> Self {
        Self::idle()
    }
}
