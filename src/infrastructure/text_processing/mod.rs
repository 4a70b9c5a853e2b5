mod text_sanitizer;

pub use text_sanitizer::flatten_page_text;
