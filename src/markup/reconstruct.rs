/*!
 * Markup reconstruction.
 *
 * Rebuilds a document from its token stream, putting translated sentences in
 * place of each translatable text node. Non-text tokens are written back in
 * their string form.
 */

use super::token::{Token, escape_text};

/// Split a text payload into (leading whitespace, trailing whitespace)
fn surrounding_whitespace(text: &str) -> (&str, &str) {
    let trimmed_start = text.trim_start();
    let leading = &text[..text.len() - trimmed_start.len()];
    let trailing = &trimmed_start[trimmed_start.trim_end().len()..];
    (leading, trailing)
}

/// Rebuild markup, substituting translated sentences into text nodes.
///
/// Each translatable text node takes the next entry of `node_sentence_counts`
/// and that many consecutive sentences from `translated`, concatenated with
/// no separator and wrapped in the node's original surrounding whitespace.
/// When `translated` runs short the node gets what is left; surplus sentences
/// are ignored. A text node with no count entry left keeps its original text.
pub fn reconstruct(tokens: &[Token], translated: &[String], node_sentence_counts: &[usize]) -> String {
    let mut out = String::new();
    let mut counts = node_sentence_counts.iter();
    let mut cursor: usize = 0;

    for token in tokens {
        let text = match token {
            Token::Text { text, .. } if token.is_translatable() => text,
            _ => {
                token.write_markup(&mut out);
                continue;
            }
        };

        let Some(&count) = counts.next() else {
            token.write_markup(&mut out);
            continue;
        };

        let end = cursor.saturating_add(count).min(translated.len());
        let (leading, trailing) = surrounding_whitespace(text);

        out.push_str(&escape_text(leading));
        for sentence in &translated[cursor..end] {
            out.push_str(&escape_text(sentence));
        }
        out.push_str(&escape_text(trailing));

        cursor = end;
    }

    out
}
