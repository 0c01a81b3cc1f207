/*!
 * Markup handling: content classification, tokenization and reconstruction.
 */

pub mod reconstruct;
pub mod token;
pub mod tokenizer;

pub use reconstruct::reconstruct;
pub use token::{Attribute, Token, TokenKind};
pub use tokenizer::{MarkupTokenizer, TokenizedMarkup, TokenizerOptions};

/// How an input should be processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// HTML fragment or document
    Markup,
    /// Plain text
    Plain,
}

/// Opening-tag substrings that mark an input as HTML
const MARKUP_SIGNATURES: [&str; 23] = [
    "<html", "<body", "<p", "<div", "<span", "<br", "<ul", "<ol", "<li", "<table", "<h1", "<h2",
    "<h3", "<h4", "<h5", "<h6", "<a ", "<strong", "<em>", "<b>", "<i>", "<section", "<article",
];

/// Decide whether text is markup or plain text.
///
/// A cheap substring heuristic: a miss falls back to plain-text segmentation,
/// which still translates the text.
pub fn classify(text: &str) -> ContentKind {
    let lowered = text.to_ascii_lowercase();
    if MARKUP_SIGNATURES.iter().any(|signature| lowered.contains(signature)) {
        ContentKind::Markup
    } else {
        ContentKind::Plain
    }
}

/// Decode bytes as UTF-8, dropping every invalid sequence
pub fn sanitize_utf8(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}
