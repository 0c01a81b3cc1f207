/*!
 * Tests for language utility functions
 */

use segtrans::language_utils::{
    LanguageCodeType, get_language_name, normalize_to_part1_or_part2t,
    normalize_to_part2t, segmentation_locale, validate_language_code,
};

#[test]
fn test_validateLanguageCode_withValidCodes_shouldReturnCorrectType() {
    assert!(matches!(validate_language_code("en").unwrap(), LanguageCodeType::Part1));
    assert!(matches!(validate_language_code("fra").unwrap(), LanguageCodeType::Part2T));
    assert!(matches!(validate_language_code("ger").unwrap(), LanguageCodeType::Part2B));
    assert!(matches!(validate_language_code(" EN ").unwrap(), LanguageCodeType::Part1));
}

#[test]
fn test_validateLanguageCode_withInvalidCodes_shouldFail() {
    assert!(validate_language_code("").is_err());
    assert!(validate_language_code("xx").is_err());
    assert!(validate_language_code("english").is_err());
}

#[test]
fn test_normalizeToPart2t_shouldMapAllForms() {
    assert_eq!(normalize_to_part2t("en").unwrap(), "eng");
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("deu").unwrap(), "deu");
    assert_eq!(normalize_to_part1_or_part2t("spa").unwrap(), "es");
}

#[test]
fn test_getLanguageName_shouldReturnEnglishName() {
    assert_eq!(get_language_name("es").unwrap(), "Spanish");
    assert!(get_language_name("xx").is_err());
}

#[test]
fn test_segmentationLocale_shouldFollowPrimarySubtag() {
    assert_eq!(segmentation_locale("pt-BR"), "pt");
    assert_eq!(segmentation_locale("ger"), "de");
    assert_eq!(segmentation_locale("??"), "und");
}
