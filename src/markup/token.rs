/*!
 * Markup tokens and their string form.
 *
 * A token is one unit of the flat stream produced by the tokenizer. Writing
 * every token's string form back to back rebuilds the document, modulo the
 * normalization that parsing implies (entity decoding, attribute quoting,
 * lowercase tag names).
 */

use std::fmt;

/// A tag attribute with its decoded value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name as written (lowercased by the parser)
    pub name: String,
    /// Decoded attribute value
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Kind of a markup token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    StartTag,
    EndTag,
    SelfClosingTag,
    Text,
    Comment,
    Doctype,
    Error,
}

impl TokenKind {
    /// Every token kind, in declaration order
    pub const ALL: [TokenKind; 7] = [
        TokenKind::StartTag,
        TokenKind::EndTag,
        TokenKind::SelfClosingTag,
        TokenKind::Text,
        TokenKind::Comment,
        TokenKind::Doctype,
        TokenKind::Error,
    ];
}

/// One token of a parsed markup stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Opening tag such as `<p class="x">`
    StartTag {
        name: String,
        attributes: Vec<Attribute>,
    },
    /// Closing tag such as `</p>`
    EndTag { name: String },
    /// Tag written with a trailing slash such as `<br/>`
    SelfClosingTag {
        name: String,
        attributes: Vec<Attribute>,
    },
    /// Decoded character data.
    ///
    /// `verbatim` text comes from raw-text elements (`script`, `style`, ...)
    /// and is neither translated nor escaped.
    Text { text: String, verbatim: bool },
    /// Comment body without the `<!--` `-->` delimiters
    Comment(String),
    /// Document type declaration
    Doctype {
        name: Option<String>,
        public_id: Option<String>,
        system_id: Option<String>,
    },
    /// Parse error reported by the tokenizer; has an empty string form
    Error(String),
}

impl Token {
    /// Plain text token
    pub fn text(text: impl Into<String>) -> Self {
        Token::Text {
            text: text.into(),
            verbatim: false,
        }
    }

    /// Start tag without attributes
    pub fn start(name: impl Into<String>) -> Self {
        Token::StartTag {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// End tag
    pub fn end(name: impl Into<String>) -> Self {
        Token::EndTag { name: name.into() }
    }

    pub fn kind(&self) -> TokenKind {
        match self {
            Token::StartTag { .. } => TokenKind::StartTag,
            Token::EndTag { .. } => TokenKind::EndTag,
            Token::SelfClosingTag { .. } => TokenKind::SelfClosingTag,
            Token::Text { .. } => TokenKind::Text,
            Token::Comment(_) => TokenKind::Comment,
            Token::Doctype { .. } => TokenKind::Doctype,
            Token::Error(_) => TokenKind::Error,
        }
    }

    /// Text payload for text tokens
    pub fn text_content(&self) -> Option<&str> {
        match self {
            Token::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Whether the token carries text that should be segmented and translated.
    ///
    /// The tokenizer and the reconstructor both walk text nodes through this
    /// predicate so their sentence-count cursors stay aligned.
    pub fn is_translatable(&self) -> bool {
        matches!(self, Token::Text { text, verbatim: false } if !text.trim().is_empty())
    }

    /// String form of the token
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    /// Append the string form of the token to `out`
    pub fn write_markup(&self, out: &mut String) {
        match self {
            Token::StartTag { name, attributes } => write_tag(out, name, attributes, false),
            Token::SelfClosingTag { name, attributes } => write_tag(out, name, attributes, true),
            Token::EndTag { name } => {
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            Token::Text { text, verbatim: true } => out.push_str(text),
            Token::Text { text, verbatim: false } => out.push_str(&escape_text(text)),
            Token::Comment(body) => {
                out.push_str("<!--");
                out.push_str(body);
                out.push_str("-->");
            }
            Token::Doctype {
                name,
                public_id,
                system_id,
            } => write_doctype(out, name.as_deref(), public_id.as_deref(), system_id.as_deref()),
            Token::Error(_) => {}
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markup())
    }
}

fn write_tag(out: &mut String, name: &str, attributes: &[Attribute], self_closing: bool) {
    out.push('<');
    out.push_str(name);
    for attribute in attributes {
        out.push(' ');
        out.push_str(&attribute.name);
        out.push_str("=\"");
        out.push_str(&escape_attribute(&attribute.value));
        out.push('"');
    }
    if self_closing {
        out.push('/');
    }
    out.push('>');
}

fn write_doctype(out: &mut String, name: Option<&str>, public_id: Option<&str>, system_id: Option<&str>) {
    out.push_str("<!DOCTYPE");
    if let Some(name) = name {
        out.push(' ');
        out.push_str(name);
    }
    match (public_id, system_id) {
        (Some(public), system) => {
            out.push_str(" PUBLIC \"");
            out.push_str(public);
            out.push('"');
            if let Some(system) = system {
                out.push_str(" \"");
                out.push_str(system);
                out.push('"');
            }
        }
        (None, Some(system)) => {
            out.push_str(" SYSTEM \"");
            out.push_str(system);
            out.push('"');
        }
        (None, None) => {}
    }
    out.push('>');
}

/// Escape character data for use between tags
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escape a double-quoted attribute value
pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
