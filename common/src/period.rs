//! 期間（日付表記）の抽出
//!
//! 受け付けるのは `<1〜2桁> de <単語> de 2024` という表記のみ。
//! それ以外の日付表記は「日付なし」として扱う。

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PERIOD_PATTERN: Regex = Regex::new(r"\d{1,2} de \w+ de 2024").unwrap();
}

/// 最後に一致した日付表記を返す
///
/// # Examples
/// ```
/// use evidence_ai_common::period::extract_period;
///
/// let found = extract_period("Firmado el 14 de febrero de 2024 y revisado");
/// assert_eq!(found.as_deref(), Some("14 de febrero de 2024"));
/// assert_eq!(extract_period("sin fecha"), None);
/// ```
pub fn extract_period(text: &str) -> Option<String> {
    PERIOD_PATTERN
        .find_iter(text)
        .last()
        .map(|m| m.as_str().to_string())
}
