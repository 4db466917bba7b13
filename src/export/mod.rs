//! 結果テーブルの入出力
//!
//! レビュー用フロントエンドが読むCSV。実行のたびに全体を置き換える。

pub mod excel;

pub use excel::write_results_xlsx;

use crate::error::{EvidenceAiError, Result};
use chrono::NaiveDateTime;
use evidence_ai_common::ValidationResult;
use std::path::{Path, PathBuf};

/// 結果テーブルの列（この順で出力する）
pub const RESULT_COLUMNS: [&str; 11] = [
    "Nombre_a_validar",
    "Nombre_encontrado",
    "Nombre_ok",
    "Periodo_a_validar",
    "Fecha_encontrada",
    "Periodo_ok",
    "Tarea_a_validar",
    "Tareas_encontradas",
    "Tarea_ok",
    "Justificacion",
    "Link_imagen",
];

fn to_csv_bytes(results: &[ValidationResult]) -> Result<Vec<u8>> {
    // 0件でもヘッダー行は出す
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(RESULT_COLUMNS)?;
    for result in results {
        writer.serialize(result)?;
    }
    writer
        .into_inner()
        .map_err(|e| EvidenceAiError::Io(e.into_error()))
}

/// 結果テーブルを書き出す
///
/// 一時ファイルに書いてから置き換えるので、途中で失敗しても旧テーブルは壊れない。
pub fn write_results(path: &Path, results: &[ValidationResult]) -> Result<()> {
    let bytes = to_csv_bytes(results)?;
    replace_file(path, &bytes)
}

fn replace_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    std::fs::write(&tmp_path, bytes)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// 結果テーブルを読み込む
pub fn read_results(path: &Path) -> Result<Vec<ValidationResult>> {
    if !path.exists() {
        return Err(EvidenceAiError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    read_results_from_str(&content)
}

/// CSVテキストを結果テーブルとして解釈する
///
/// 全列が揃っていない場合はエラー。フラグは `1/0/true/false/1.0` を受け付ける。
pub fn read_results_from_str(content: &str) -> Result<Vec<ValidationResult>> {
    let mut reader = csv::Reader::from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    for column in RESULT_COLUMNS {
        if !headers.iter().any(|h| h.trim() == column) {
            return Err(EvidenceAiError::MissingColumn(column.to_string()));
        }
    }

    let results = reader
        .deserialize()
        .collect::<std::result::Result<Vec<ValidationResult>, csv::Error>>()?;
    Ok(results)
}

/// 既存の結果テーブルを退避する
///
/// `<stem>_<YYYYmmdd_HHMMSS>.csv` として `archive_dir` にコピーする。
/// テーブルがまだ無い場合は何もしない。
///
/// # Returns
/// 退避先のパス（退避しなかった場合は None）
pub fn archive_results(path: &Path, archive_dir: &Path, now: NaiveDateTime) -> Result<Option<PathBuf>> {
    if !path.is_file() {
        return Ok(None);
    }

    std::fs::create_dir_all(archive_dir)?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("resultados_validacion");
    let archived = archive_dir.join(format!("{}_{}.csv", stem, now.format("%Y%m%d_%H%M%S")));

    std::fs::copy(path, &archived)?;
    Ok(Some(archived))
}
