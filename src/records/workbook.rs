//! 元データのワークブック読み込み（calamine）

use crate::error::{EvidenceAiError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

pub const EMPLOYEE_COLUMN: &str = "Empleado";
pub const SUBPROJECT_COLUMN: &str = "Subproyecto";
pub const PROJECT_COLUMN: &str = "Proyecto";

/// シートの1行（識別子列のみ、未加工）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRow {
    pub employee: Option<String>,
    pub subproject: Option<String>,
    pub project: Option<String>,
}

/// シート全体
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub rows: Vec<SourceRow>,
    /// プロジェクト列があるか
    pub has_project: bool,
}

fn cell_to_string(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty => return None,
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        // 整数値のセルは "1.0" ではなく "1"
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string(),
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn find_column(header: &[Data], name: &str) -> Option<usize> {
    header
        .iter()
        .position(|cell| cell_to_string(cell).map(|s| s.trim() == name).unwrap_or(false))
}

/// ワークブックの指定シートを読み込む
///
/// 1行目をヘッダーとして `Empleado` と `Subproyecto` 列を必須とする。
pub fn read_workbook(path: &Path, sheet_name: &str) -> Result<SourceTable> {
    if !path.exists() {
        return Err(EvidenceAiError::FileNotFound(path.display().to_string()));
    }

    let mut workbook = open_workbook_auto(path)
        .map_err(|e| EvidenceAiError::Workbook(format!("{}: {}", path.display(), e)))?;

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| EvidenceAiError::Workbook(format!("シート '{}': {}", sheet_name, e)))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| EvidenceAiError::Workbook(format!("シート '{}' が空です", sheet_name)))?;

    let employee_col = find_column(header, EMPLOYEE_COLUMN)
        .ok_or_else(|| EvidenceAiError::MissingColumn(EMPLOYEE_COLUMN.into()))?;
    let subproject_col = find_column(header, SUBPROJECT_COLUMN)
        .ok_or_else(|| EvidenceAiError::MissingColumn(SUBPROJECT_COLUMN.into()))?;
    let project_col = find_column(header, PROJECT_COLUMN);

    let cell = |row: &[Data], col: usize| row.get(col).and_then(cell_to_string);

    let rows = rows
        .map(|row| SourceRow {
            employee: cell(row, employee_col),
            subproject: cell(row, subproject_col),
            project: project_col.and_then(|col| cell(row, col)),
        })
        .collect();

    Ok(SourceTable {
        rows,
        has_project: project_col.is_some(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Empty), None);
        assert_eq!(cell_to_string(&Data::String("  ".into())), None);
        assert_eq!(cell_to_string(&Data::String("[1] Ana".into())).as_deref(), Some("[1] Ana"));
        assert_eq!(cell_to_string(&Data::Float(3.0)).as_deref(), Some("3"));
        assert_eq!(cell_to_string(&Data::Int(7)).as_deref(), Some("7"));
    }

    #[test]
    fn test_find_column() {
        let header = vec![
            Data::String("Proyecto".into()),
            Data::String(" Empleado ".into()),
            Data::String("Subproyecto".into()),
        ];
        assert_eq!(find_column(&header, EMPLOYEE_COLUMN), Some(1));
        assert_eq!(find_column(&header, SUBPROJECT_COLUMN), Some(2));
        assert_eq!(find_column(&header, "Horas"), None);
    }

    #[test]
    fn test_missing_workbook() {
        let result = read_workbook(Path::new("/nonexistent/control.xlsx"), "Hoja1");
        assert!(matches!(result, Err(EvidenceAiError::FileNotFound(_))));
    }
}
