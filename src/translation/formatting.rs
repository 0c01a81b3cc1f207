/*!
 * Output formatting.
 *
 * Joins translated sentences back into the shape of the input, and tidies
 * raw LLM answers so they look like a bare translation.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::markup::{self, Token};

/// Leading labels some models put before the answer ("Translation:", "French:")
static LABEL_PREFIX_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(translation|translated text|[a-z]+ translation)\s*:\s*").unwrap()
});

/// Pairs of quotes a model may wrap its answer in
const QUOTE_PAIRS: [(char, char); 4] = [('"', '"'), ('“', '”'), ('«', '»'), ('\'', '\'')];

/// Join plain-text sentences with single spaces
pub fn join_plain(sentences: &[String]) -> String {
    let mut joined = String::new();
    for sentence in sentences {
        joined.push_str(sentence);
        joined.push(' ');
    }
    joined.trim().to_string()
}

/// Translated sentences waiting to be put back together
#[derive(Debug, Clone, Copy)]
pub enum Reassembly<'a> {
    /// Plain text: sentences are joined with spaces
    Plain,
    /// Markup: sentences replace the text nodes of the token stream
    Markup {
        tokens: &'a [Token],
        node_sentence_counts: &'a [usize],
    },
}

/// Rebuild the translated output for either content kind
pub fn reassemble(layout: Reassembly<'_>, translated: &[String]) -> String {
    match layout {
        Reassembly::Plain => join_plain(translated),
        Reassembly::Markup {
            tokens,
            node_sentence_counts,
        } => markup::reconstruct(tokens, translated, node_sentence_counts),
    }
}

/// Cleanup of free-form model output
pub struct FormatPreserver;

impl FormatPreserver {
    /// Strip chatter a model adds around a one-sentence translation.
    ///
    /// Removes a leading "Translation:" style label, and surrounding quotes
    /// unless the original sentence was quoted too.
    pub fn clean_model_output(original: &str, translated: &str) -> String {
        let mut result = translated.trim();

        if let Some(found) = LABEL_PREFIX_REGEX.find(result) {
            if !LABEL_PREFIX_REGEX.is_match(original) {
                result = result[found.end()..].trim();
            }
        }

        let original = original.trim();
        for (open, close) in QUOTE_PAIRS {
            let wrapped = |text: &str| {
                text.chars().count() >= 2 && text.starts_with(open) && text.ends_with(close)
            };
            if wrapped(result) && !wrapped(original) {
                result = result[open.len_utf8()..result.len() - close.len_utf8()].trim();
                break;
            }
        }

        result.to_string()
    }
}
