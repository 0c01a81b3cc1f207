/*!
 * Tests for markup classification, tokenization and reconstruction
 */

use segtrans::markup::{self, ContentKind, MarkupTokenizer, Token, TokenKind, reconstruct};

use crate::common::strings;

#[test]
fn test_classify_withTags_shouldDetectMarkup() {
    assert_eq!(markup::classify("<p>Hello</p>"), ContentKind::Markup);
    assert_eq!(markup::classify("Some <STRONG>bold</STRONG> text"), ContentKind::Markup);
    assert_eq!(markup::classify("Hello world."), ContentKind::Plain);
    assert_eq!(markup::classify("1 < 2 and 3 > 2"), ContentKind::Plain);
}

#[test]
fn test_tokenize_withNestedInline_shouldSplitTextNodes() {
    let tokenized = MarkupTokenizer::for_language("en")
        .tokenize("<p>Hello, <strong>world</strong>!</p>")
        .unwrap();

    assert_eq!(tokenized.sentences, strings(&["Hello,", "world", "!"]));
    assert_eq!(tokenized.node_sentence_counts, vec![1, 1, 1]);
    assert_eq!(tokenized.text_node_count(), 3);
}

#[test]
fn test_tokenize_withComment_shouldNotTranslateIt() {
    let tokenized = MarkupTokenizer::for_language("en")
        .tokenize("<!-- Note. --><p>Text.</p>")
        .unwrap();

    assert_eq!(tokenized.sentences, strings(&["Text."]));
    assert_eq!(tokenized.tokens[0].kind(), TokenKind::Comment);
}

#[test]
fn test_reconstruct_withIdentityTranslation_shouldReproduceSerializedTokens() {
    let input = "<div class=\"a\"><p>One. Two.</p><br/><p>Three.</p></div>";
    let tokenized = MarkupTokenizer::for_language("en").tokenize(input).unwrap();

    let output = reconstruct(
        &tokenized.tokens,
        &tokenized.sentences,
        &tokenized.node_sentence_counts,
    );

    // Sentences of one node are joined without a separator
    assert_eq!(output, "<div class=\"a\"><p>One.Two.</p><br/><p>Three.</p></div>");
}

#[test]
fn test_reconstruct_withShortfall_shouldTruncate() {
    let tokens = vec![
        Token::start("p"),
        Token::text("A. B."),
        Token::end("p"),
        Token::start("p"),
        Token::text("C."),
        Token::end("p"),
    ];

    assert_eq!(reconstruct(&tokens, &strings(&["X."]), &[2, 1]), "<p>X.</p><p></p>");
}

#[test]
fn test_sanitizeUtf8_shouldDropInvalidSequences() {
    assert_eq!(markup::sanitize_utf8(b"ok\xff\xfe!"), "ok!");
    assert_eq!(markup::sanitize_utf8("déjà".as_bytes()), "déjà");
}
