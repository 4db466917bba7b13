//! 名前比較用の正規化

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// アクセント除去・小文字化・前後空白除去
///
/// `María López` と `MARIA LOPEZ` は同じ値になる。
pub fn normalize_name(name: &str) -> String {
    name.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

/// 正規化後に完全一致するか（あいまい一致はしない）
pub fn names_match(expected: &str, found: &str) -> bool {
    normalize_name(expected) == normalize_name(found)
}
