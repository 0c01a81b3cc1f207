//! Language utilities for ISO language code handling
//!
//! Translation APIs exchange codes such as `en`, `pt-BR` or `zh-Hant`. Only
//! the primary subtag is checked against ISO 639; region and script subtags
//! are carried through untouched.

use anyhow::{Result, anyhow};
use isolang::Language;

/// Language code type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

/// Map an ISO 639-2/B code to its ISO 639-2/T form when the two differ
fn bibliographic_to_terminology(code: &str) -> Option<&'static str> {
    let mapped = match code {
        "fre" => "fra",
        "ger" => "deu",
        "dut" => "nld",
        "gre" => "ell",
        "chi" => "zho",
        "cze" => "ces",
        "ice" => "isl",
        "alb" => "sqi",
        "arm" => "hye",
        "baq" => "eus",
        "bur" => "mya",
        "per" => "fas",
        "geo" => "kat",
        "may" => "msa",
        "mac" => "mkd",
        "rum" => "ron",
        "slo" => "slk",
        "wel" => "cym",
        _ => return None,
    };
    Some(mapped)
}

/// Lowercased primary subtag of a language tag (`pt-BR` -> `pt`)
pub fn primary_subtag(code: &str) -> String {
    code.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let primary = primary_subtag(code);

    match primary.len() {
        2 if Language::from_639_1(&primary).is_some() => return Ok(LanguageCodeType::Part1),
        3 if Language::from_639_3(&primary).is_some() => return Ok(LanguageCodeType::Part2T),
        3 if bibliographic_to_terminology(&primary).is_some() => {
            return Ok(LanguageCodeType::Part2B);
        }
        _ => {}
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let primary = primary_subtag(code);

    if primary.len() == 2 {
        if let Some(lang) = Language::from_639_1(&primary) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if primary.len() == 3 {
        if Language::from_639_3(&primary).is_some() {
            return Ok(primary);
        }
        if let Some(terminology) = bibliographic_to_terminology(&primary) {
            return Ok(terminology.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-1 (2-letter) format if possible
/// Falls back to ISO 639-2/T if no ISO 639-1 code exists
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let part2t = normalize_to_part2t(code)?;

    match Language::from_639_3(&part2t).and_then(|lang| lang.to_639_1()) {
        Some(part1) => Ok(part1.to_string()),
        None => Ok(part2t),
    }
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Locale key used to pick sentence segmentation rules for a language code.
///
/// Unknown codes map to `"und"`, which selects the language-neutral rules.
pub fn segmentation_locale(code: &str) -> String {
    normalize_to_part1_or_part2t(code).unwrap_or_else(|_| "und".to_string())
}
