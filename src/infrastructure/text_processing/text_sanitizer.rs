use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static HYPHEN_NEWLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<prefix>\w)-[ \t]*\r?\n[ \t]*(?P<suffix>\w)").expect("static regex is valid")
});

/// Turns a page's raw text runs into one space-separated line: NFKC
/// normalised, words split across a line break rejoined, whitespace
/// collapsed.
pub fn flatten_page_text(raw: &str) -> String {
    let normalized: String = raw.nfkc().collect();
    let de_hyphenated = HYPHEN_NEWLINE.replace_all(&normalized, "$prefix$suffix");

    let mut result = String::with_capacity(de_hyphenated.len());
    let mut prev_was_space = true;

    for ch in de_hyphenated.chars() {
        if ch.is_whitespace() {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else if !ch.is_control() {
            result.push(ch);
            prev_was_space = false;
        }
    }

    if result.ends_with(' ') {
        result.pop();
    }
    result
}
