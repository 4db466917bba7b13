//! 元データの識別子解析
//!
//! - `[123] Ana Pérez` 形式の社員列
//! - `[SP-01] App Móvil` 形式のサブプロジェクト列
//! - `1.- Plataforma` 形式のプロジェクト列
//! - グループ先頭行にしか値がない列の前方補完

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMPLOYEE_ID: Regex = Regex::new(r"\[(\d+)\]").unwrap();
    static ref BRACKET_ID: Regex = Regex::new(r"\[([^\]]+)\]").unwrap();
    static ref AFTER_BRACKET: Regex = Regex::new(r"\]\s*(.+)").unwrap();
    static ref PROJECT_ID: Regex = Regex::new(r"^(\d+)\.-").unwrap();
    static ref PROJECT_NAME: Regex = Regex::new(r"^\d+\.-\s*(.+)").unwrap();
}

fn capture(re: &Regex, text: &str) -> String {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// `[id] 名前` → (id, 名前)。id は数字のみ
///
/// 解析できない部分は空文字になる。
pub fn split_employee(cell: &str) -> (String, String) {
    (capture(&EMPLOYEE_ID, cell), capture(&AFTER_BRACKET, cell))
}

/// `[id] 名前` → (id, 名前)。id は `]` 以外の任意文字
pub fn split_subproject(cell: &str) -> (String, String) {
    (capture(&BRACKET_ID, cell), capture(&AFTER_BRACKET, cell))
}

/// `N.- 名前` → (N, 名前)
pub fn split_project(cell: &str) -> (String, String) {
    let cell = cell.trim();
    (capture(&PROJECT_ID, cell), capture(&PROJECT_NAME, cell))
}

/// 空白セルを直前の値で埋める
///
/// 元の行順に「最後に見た値」を持ち回す。先頭の空白セルは埋まらない。
pub fn forward_fill<I, S>(cells: I) -> Vec<Option<String>>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let mut last_seen: Option<String> = None;
    let mut filled = Vec::new();

    for cell in cells {
        match cell.as_ref().map(|c| c.as_ref().trim()).filter(|c| !c.is_empty()) {
            Some(value) => {
                last_seen = Some(value.to_string());
                filled.push(last_seen.clone());
            }
            None => filled.push(last_seen.clone()),
        }
    }

    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_employee() {
        let (id, name) = split_employee("[123] Ana Pérez");
        assert_eq!(id, "123");
        assert_eq!(name, "Ana Pérez");
    }

    #[test]
    fn test_split_employee_malformed() {
        assert_eq!(split_employee("Ana Pérez"), (String::new(), String::new()));
        assert_eq!(split_employee(""), (String::new(), String::new()));
    }

    #[test]
    fn test_split_employee_non_numeric_id() {
        let (id, name) = split_employee("[A1] Luis");
        assert_eq!(id, "");
        assert_eq!(name, "Luis");
    }

    #[test]
    fn test_split_subproject() {
        let (id, name) = split_subproject("[SP-01]  App Móvil ");
        assert_eq!(id, "SP-01");
        assert_eq!(name, "App Móvil");
    }

    #[test]
    fn test_split_project() {
        let (id, name) = split_project("1.- Plataforma de datos");
        assert_eq!(id, "1");
        assert_eq!(name, "Plataforma de datos");
        assert_eq!(split_project("Plataforma"), (String::new(), String::new()));
    }

    #[test]
    fn test_forward_fill() {
        let cells = vec![
            None,
            Some("[1] Ana"),
            None,
            Some("  "),
            Some("[2] Luis"),
            None,
        ];
        let filled = forward_fill(cells);
        assert_eq!(
            filled,
            vec![
                None,
                Some("[1] Ana".to_string()),
                Some("[1] Ana".to_string()),
                Some("[1] Ana".to_string()),
                Some("[2] Luis".to_string()),
                Some("[2] Luis".to_string()),
            ]
        );
    }

    #[test]
    fn test_forward_fill_empty() {
        let cells: Vec<Option<String>> = vec![];
        assert!(forward_fill(cells).is_empty());
    }
}
