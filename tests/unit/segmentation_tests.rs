/*!
 * Tests for sentence segmentation
 */

use segtrans::segmentation::{SentenceSegmenter, split_sentences};

#[test]
fn test_splitSentences_withPlainParagraph_shouldSplitOnTerminals() {
    assert_eq!(
        split_sentences("Hello world. How are you? I am fine!", "en"),
        vec!["Hello world.", "How are you?", "I am fine!"]
    );
}

#[test]
fn test_splitSentences_withEmptyOrBlankText_shouldReturnNothing() {
    assert!(split_sentences("", "en").is_empty());
    assert!(split_sentences(" \n ", "en").is_empty());
}

#[test]
fn test_segment_withTitleAbbreviation_shouldKeepSentenceWhole() {
    let segmenter = SentenceSegmenter::for_language("en");
    assert_eq!(
        segmenter.segment("Mr. Smith met Dr. Jones. They talked."),
        vec!["Mr. Smith met Dr. Jones.", "They talked."]
    );
}

#[test]
fn test_segment_withRegionTag_shouldUseBaseLocale() {
    let segmenter = SentenceSegmenter::for_language("es-MX");
    assert_eq!(segmenter.locale(), "es");
    assert_eq!(
        segmenter.segment("La Sra. García llegó. ¿Cómo estás?"),
        vec!["La Sra. García llegó.", "¿Cómo estás?"]
    );
}

#[test]
fn test_segment_withCjkPunctuation_shouldSplitWithoutSpaces() {
    assert_eq!(split_sentences("你好。你好吗？", "zh"), vec!["你好。", "你好吗？"]);
}

#[test]
fn test_segment_shouldNotLoseNonWhitespaceText() {
    let text = "First one. Second one! Third one? Fourth";
    let sentences = split_sentences(text, "en");

    let original: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let rebuilt: String = sentences
        .concat()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    assert_eq!(rebuilt, original);
    assert_eq!(sentences.len(), 4);
}
