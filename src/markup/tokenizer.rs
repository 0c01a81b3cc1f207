/*!
 * Markup tokenizer.
 *
 * Runs the html5ever streaming tokenizer over a document and flattens its
 * output into [`Token`]s, then segments every translatable text node into
 * sentences. The result carries three parallel views of the document:
 *
 * - the full token stream in document order
 * - the flat list of sentences taken from translatable text nodes
 * - how many sentences each translatable text node contributed
 *
 * No tree is built. Unclosed or stray tags are passed through as-is.
 */

use std::cell::{Cell, RefCell};

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    self as html, BufferQueue, TagKind, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use log::{debug, warn};

use super::token::{Attribute, Token};
use crate::errors::TokenizeError;
use crate::segmentation::SentenceSegmenter;

/// Elements whose contents are raw text: never segmented, never escaped
const RAW_TEXT_ELEMENTS: [&str; 6] = ["style", "xmp", "iframe", "noembed", "noframes", "script"];

/// Elements whose contents are escapable raw text (entities decoded, tags ignored)
const RCDATA_ELEMENTS: [&str; 2] = ["textarea", "title"];

/// Options controlling tokenization
#[derive(Debug, Clone, Default)]
pub struct TokenizerOptions {
    /// Fail on the first parse error instead of recording it as a token
    pub strict: bool,
    /// Reject inputs larger than this many bytes
    pub max_input_bytes: Option<usize>,
}

/// Output of tokenizing one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenizedMarkup {
    /// Every token in document order
    pub tokens: Vec<Token>,
    /// Sentences from all translatable text nodes, in document order
    pub sentences: Vec<String>,
    /// Sentence count per translatable text node
    pub node_sentence_counts: Vec<usize>,
}

impl TokenizedMarkup {
    /// Number of text nodes that contributed sentences
    pub fn text_node_count(&self) -> usize {
        self.node_sentence_counts.len()
    }
}

/// Tokenizes markup and segments its text nodes
#[derive(Debug, Clone)]
pub struct MarkupTokenizer {
    segmenter: SentenceSegmenter,
    options: TokenizerOptions,
}

impl MarkupTokenizer {
    pub fn new(segmenter: SentenceSegmenter, options: TokenizerOptions) -> Self {
        Self { segmenter, options }
    }

    /// Tokenizer for a source language with default options
    pub fn for_language(source_language: &str) -> Self {
        Self::new(
            SentenceSegmenter::for_language(source_language),
            TokenizerOptions::default(),
        )
    }

    /// Tokenize a document and segment its translatable text nodes
    pub fn tokenize(&self, markup: &str) -> Result<TokenizedMarkup, TokenizeError> {
        self.check_size(markup.len())?;

        let tokens = lex(markup, self.options.strict)?;
        let mut sentences = Vec::new();
        let mut node_sentence_counts = Vec::new();

        for token in tokens.iter().filter(|token| token.is_translatable()) {
            if let Some(text) = token.text_content() {
                let node_sentences = self.segmenter.segment(text.trim());
                node_sentence_counts.push(node_sentences.len());
                sentences.extend(node_sentences);
            }
        }

        debug!(
            "Tokenized markup into {} tokens, {} text nodes, {} sentences",
            tokens.len(),
            node_sentence_counts.len(),
            sentences.len()
        );

        Ok(TokenizedMarkup {
            tokens,
            sentences,
            node_sentence_counts,
        })
    }

    fn check_size(&self, size: usize) -> Result<(), TokenizeError> {
        match self.options.max_input_bytes {
            Some(limit) if size > limit => Err(TokenizeError::InputTooLarge { size, limit }),
            _ => Ok(()),
        }
    }
}

/// Run the streaming tokenizer and collect the flat token stream
pub fn lex(markup: &str, strict: bool) -> Result<Vec<Token>, TokenizeError> {
    let sink = CollectingSink::new(strict);
    let tokenizer = Tokenizer::new(sink, TokenizerOpts::default());

    let input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(markup));
    let _ = tokenizer.feed(&input);
    tokenizer.end();

    tokenizer.sink.finish()
}

/// Token sink that coalesces character runs and converts tokens
struct CollectingSink {
    strict: bool,
    tokens: RefCell<Vec<Token>>,
    pending_text: RefCell<String>,
    pending_errors: RefCell<Vec<String>>,
    verbatim: Cell<bool>,
    first_error: RefCell<Option<TokenizeError>>,
}

impl CollectingSink {
    fn new(strict: bool) -> Self {
        Self {
            strict,
            tokens: RefCell::new(Vec::new()),
            pending_text: RefCell::new(String::new()),
            pending_errors: RefCell::new(Vec::new()),
            verbatim: Cell::new(false),
            first_error: RefCell::new(None),
        }
    }

    /// Emit the buffered text run, then any errors raised inside it
    fn flush(&self) {
        let text = std::mem::take(&mut *self.pending_text.borrow_mut());
        let errors = std::mem::take(&mut *self.pending_errors.borrow_mut());
        let mut tokens = self.tokens.borrow_mut();

        if !text.is_empty() {
            tokens.push(Token::Text {
                text,
                verbatim: self.verbatim.get(),
            });
        }
        tokens.extend(errors.into_iter().map(Token::Error));
    }

    fn push(&self, token: Token) {
        self.flush();
        self.tokens.borrow_mut().push(token);
    }

    fn record_error(&self, message: String, line: u64) {
        if self.strict {
            let mut first = self.first_error.borrow_mut();
            if first.is_none() {
                *first = Some(TokenizeError::Malformed {
                    line,
                    message: message.clone(),
                });
            }
        } else {
            warn!("Markup parse error at line {}: {}", line, message);
        }
        self.pending_errors.borrow_mut().push(message);
    }

    fn process_tag(&self, tag: html::Tag) -> TokenSinkResult<()> {
        let name = tag.name.to_string();
        let attributes = tag
            .attrs
            .iter()
            .map(|attr| Attribute::new(attr.name.local.to_string(), attr.value.to_string()))
            .collect();

        match tag.kind {
            TagKind::StartTag => {
                let token = if tag.self_closing {
                    Token::SelfClosingTag { name, attributes }
                } else {
                    Token::StartTag { name, attributes }
                };
                self.push(token);

                let raw_kind = match &*tag.name {
                    "script" => Some(RawKind::ScriptData),
                    element if RAW_TEXT_ELEMENTS.contains(&element) => Some(RawKind::Rawtext),
                    element if RCDATA_ELEMENTS.contains(&element) => Some(RawKind::Rcdata),
                    _ => None,
                };
                match raw_kind {
                    Some(kind) => {
                        self.verbatim.set(!matches!(kind, RawKind::Rcdata));
                        TokenSinkResult::RawData(kind)
                    }
                    None => TokenSinkResult::Continue,
                }
            }
            TagKind::EndTag => {
                self.push(Token::EndTag { name });
                self.verbatim.set(false);
                TokenSinkResult::Continue
            }
        }
    }

    fn finish(&self) -> Result<Vec<Token>, TokenizeError> {
        self.flush();
        if let Some(error) = self.first_error.take() {
            return Err(error);
        }
        Ok(self.tokens.take())
    }
}

impl TokenSink for CollectingSink {
    type Handle = ();

    fn process_token(&self, token: html::Token, line_number: u64) -> TokenSinkResult<()> {
        match token {
            html::Token::CharacterTokens(text) => {
                self.pending_text.borrow_mut().push_str(&text);
            }
            html::Token::NullCharacterToken => {}
            html::Token::TagToken(tag) => return self.process_tag(tag),
            html::Token::CommentToken(body) => self.push(Token::Comment(body.to_string())),
            html::Token::DoctypeToken(doctype) => self.push(Token::Doctype {
                name: doctype.name.map(|name| name.to_string()),
                public_id: doctype.public_id.map(|id| id.to_string()),
                system_id: doctype.system_id.map(|id| id.to_string()),
            }),
            html::Token::ParseError(message) => self.record_error(message.into_owned(), line_number),
            html::Token::EOFToken => self.flush(),
        }
        TokenSinkResult::Continue
    }
}
