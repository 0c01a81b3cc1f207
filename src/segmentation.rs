/*!
 * Sentence segmentation.
 *
 * Splits plain text into sentences so each one can be cached and translated
 * on its own. The rules are punctuation driven with per-locale abbreviation
 * lists:
 *
 * - a sentence ends after a run of terminal punctuation (`.`, `!`, `?`, `…`),
 *   including any closing quotes or brackets that follow it, when the next
 *   non-space character is not lowercase
 * - CJK full stops end a sentence even without a following space
 * - a blank line always ends a sentence, a single line break is plain spacing
 * - a period after a known abbreviation or a single capital initial does not
 *   end a sentence
 */

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

use crate::language_utils::segmentation_locale;

/// Abbreviations (lowercase, without the final period) per locale
static ABBREVIATIONS: Lazy<HashMap<&'static str, HashSet<&'static str>>> = Lazy::new(|| {
    let table: [(&str, &[&str]); 6] = [
        ("en", &[
            "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "inc", "ltd",
            "co", "corp", "mt", "jan", "feb", "apr", "jun", "jul", "aug", "sep", "sept",
            "oct", "nov", "dec", "fig", "e.g", "i.e", "u.s", "approx", "dept", "gov",
            "sgt", "capt", "lt", "col", "rev", "hon",
        ]),
        ("es", &[
            "sr", "sra", "srta", "dr", "dra", "ud", "uds", "lic", "ing", "etc", "pág",
            "núm", "p.ej", "av", "avda", "dto", "prof",
        ]),
        ("fr", &["m", "mm", "mme", "mlle", "dr", "pr", "etc", "cf", "p.ex", "av", "bd", "prof"]),
        ("de", &["hr", "fr", "dr", "prof", "bzw", "usw", "z.b", "d.h", "ca", "nr", "str", "vgl"]),
        ("it", &["sig", "sigg", "dott", "prof", "ecc", "avv", "ing"]),
        ("pt", &["sr", "sra", "dr", "dra", "prof", "etc", "av", "p.ex", "exmo"]),
    ];

    table
        .into_iter()
        .map(|(locale, words)| (locale, words.iter().copied().collect()))
        .collect()
});

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '…' | '‼' | '⁇' | '⁈' | '⁉') || is_cjk_terminal(c)
}

fn is_cjk_terminal(c: char) -> bool {
    matches!(c, '。' | '！' | '？' | '｡')
}

fn is_closing(c: char) -> bool {
    matches!(c, '"' | '\'' | '”' | '’' | '»' | ')' | ']' | '}' | '」' | '』')
}

fn is_opening(c: char) -> bool {
    matches!(c, '"' | '\'' | '“' | '‘' | '«' | '(' | '[' | '{' | '¿' | '¡')
}

/// Byte offset of the char at `index`, or the end of the text
fn byte_at(chars: &[(usize, char)], index: usize, text_len: usize) -> usize {
    chars.get(index).map(|(offset, _)| *offset).unwrap_or(text_len)
}

fn push_trimmed(sentences: &mut Vec<String>, piece: &str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

/// Sentence splitter bound to one locale
#[derive(Debug, Clone)]
pub struct SentenceSegmenter {
    locale: String,
    abbreviations: Option<&'static HashSet<&'static str>>,
}

impl SentenceSegmenter {
    /// Create a segmenter for a locale key such as `"en"`
    pub fn new(locale: &str) -> Self {
        let locale = locale.trim().to_lowercase();
        let abbreviations = ABBREVIATIONS.get(locale.as_str());
        Self { locale, abbreviations }
    }

    /// Create a segmenter for a request language code (`en`, `pt-BR`, `ger`, ...)
    pub fn for_language(code: &str) -> Self {
        Self::new(&segmentation_locale(code))
    }

    /// Locale key the segmenter was built for
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Split text into trimmed, non-empty sentences in document order
    pub fn segment(&self, text: &str) -> Vec<String> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut sentences = Vec::new();
        let mut start = 0;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i].1;

            if c == '\n' && Self::starts_blank_line(&chars, i) {
                let mut resume = i + 1;
                while resume < chars.len() && chars[resume].1.is_whitespace() {
                    resume += 1;
                }
                push_trimmed(&mut sentences, &text[start..chars[i].0]);
                start = byte_at(&chars, resume, text.len());
                i = resume;
                continue;
            }

            if is_terminal(c) {
                let mut end = i + 1;
                while end < chars.len() && (is_terminal(chars[end].1) || is_closing(chars[end].1)) {
                    end += 1;
                }
                if self.is_boundary(&chars, i, end) {
                    let cut = byte_at(&chars, end, text.len());
                    push_trimmed(&mut sentences, &text[start..cut]);
                    start = cut;
                }
                i = end;
                continue;
            }

            i += 1;
        }
        push_trimmed(&mut sentences, &text[start..]);

        // Rules never leave real text unassigned; keep the whole input if they ever do.
        if sentences.is_empty() && !text.trim().is_empty() {
            sentences.push(text.trim().to_string());
        }

        sentences
    }

    /// A newline followed (after optional spaces) by another newline
    fn starts_blank_line(chars: &[(usize, char)], newline: usize) -> bool {
        chars[newline + 1..]
            .iter()
            .map(|(_, c)| *c)
            .find(|c| !c.is_whitespace() || *c == '\n')
            == Some('\n')
    }

    /// Decide whether the punctuation run `chars[run_start..run_end]` closes a sentence
    fn is_boundary(&self, chars: &[(usize, char)], run_start: usize, run_end: usize) -> bool {
        let cjk = chars[run_start..run_end].iter().any(|(_, c)| is_cjk_terminal(*c));

        let Some((_, next)) = chars.get(run_end) else {
            return true;
        };
        if !next.is_whitespace() {
            return cjk;
        }

        let following = chars[run_end..].iter().map(|(_, c)| *c).find(|c| !c.is_whitespace());
        let Some(following) = following else {
            return true;
        };
        if cjk {
            return true;
        }
        if following.is_lowercase() {
            return false;
        }

        // A lone period may belong to an abbreviation or an initial
        if run_end - run_start == 1 && chars[run_start].1 == '.' {
            let word = Self::word_before(chars, run_start);
            if self.is_abbreviation(&word) {
                return false;
            }
        }

        true
    }

    /// The word ending right before `index`, leading punctuation removed
    fn word_before(chars: &[(usize, char)], index: usize) -> String {
        let mut begin = index;
        while begin > 0 && !chars[begin - 1].1.is_whitespace() {
            begin -= 1;
        }
        chars[begin..index]
            .iter()
            .map(|(_, c)| *c)
            .skip_while(|c| is_opening(*c))
            .collect()
    }

    fn is_abbreviation(&self, word: &str) -> bool {
        let mut letters = word.chars();
        if let (Some(first), None) = (letters.next(), letters.next()) {
            if first.is_uppercase() {
                return true;
            }
        }

        self.abbreviations
            .is_some_and(|known| known.contains(word.to_lowercase().as_str()))
    }
}

/// Split text into sentences using the rules for a request language code
pub fn split_sentences(text: &str, language: &str) -> Vec<String> {
    SentenceSegmenter::for_language(language).segment(text)
}
