//! 結果テーブルのExcel出力
//!
//! CSVと同じ列・同じ順序。フラグは数値の 1/0。

use super::RESULT_COLUMNS;
use crate::error::{EvidenceAiError, Result};
use evidence_ai_common::ValidationResult;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};
use std::path::Path;

const SHEET_NAME: &str = "Resultados";

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// 結果テーブルを xlsx に書き出す
pub fn write_results_xlsx(path: &Path, results: &[ValidationResult]) -> Result<()> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border(FormatBorder::Thin);
    let failed_format = Format::new().set_font_color(Color::RGB(0xC00000));

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(SHEET_NAME)
        .map_err(|e| EvidenceAiError::ExcelGeneration(format!("シート名設定エラー: {}", e)))?;

    for (col, header) in RESULT_COLUMNS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(|e| EvidenceAiError::ExcelGeneration(format!("ヘッダー書き込みエラー: {}", e)))?;
    }

    for (i, r) in results.iter().enumerate() {
        let row = i as u32 + 1;
        let texts: [(u16, &str); 8] = [
            (0, r.expected_name.as_str()),
            (1, r.found_name.as_str()),
            (3, r.expected_period.as_str()),
            (4, r.found_date.as_str()),
            (6, r.expected_task.as_str()),
            (7, r.found_tasks.as_str()),
            (9, r.justification.as_str()),
            (10, r.evidence_link.as_str()),
        ];
        for (col, value) in texts {
            let written = if col == 9 && r.is_failure() {
                worksheet.write_string_with_format(row, col, value, &failed_format)
            } else {
                worksheet.write_string(row, col, value)
            };
            written.map_err(|e| EvidenceAiError::ExcelGeneration(format!("値書き込みエラー: {}", e)))?;
        }

        for (col, value) in [(2u16, r.name_ok), (5, r.period_ok), (8, r.task_ok)] {
            worksheet
                .write_number(row, col, flag(value))
                .map_err(|e| EvidenceAiError::ExcelGeneration(format!("値書き込みエラー: {}", e)))?;
        }
    }

    worksheet.autofit();

    workbook
        .save(path)
        .map_err(|e| EvidenceAiError::ExcelGeneration(format!("Excel保存エラー: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xlsx_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resultados.xlsx");
        let results = vec![ValidationResult {
            expected_name: "Ana".into(),
            name_ok: true,
            ..Default::default()
        }];

        write_results_xlsx(&path, &results).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        // xlsx は zip
        assert_eq!(&bytes[..2], b"PK");
    }
}
