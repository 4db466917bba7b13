//! 元データ → レコード → 中間テーブル
//!
//! 1. ワークブックの識別子列を読み込む
//! 2. 社員列（とプロジェクト列）を前方補完する
//! 3. `[id] 名前` を分解して EmployeeRecord にする
//! 4. 照合結果を中間テーブル（CSV）に書き出す

pub mod workbook;

pub use workbook::{read_workbook, SourceRow, SourceTable};

use crate::error::Result;
use crate::matcher::MatchResult;
use evidence_ai_common::{forward_fill, split_employee, split_project, split_subproject, EmployeeRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// シート行からレコードを組み立てる（元の行順）
pub fn build_records(table: &SourceTable) -> Vec<EmployeeRecord> {
    let employees = forward_fill(table.rows.iter().map(|r| r.employee.as_deref()));
    let projects = if table.has_project {
        forward_fill(table.rows.iter().map(|r| r.project.as_deref()))
    } else {
        vec![None; table.rows.len()]
    };

    table
        .rows
        .iter()
        .zip(employees)
        .zip(projects)
        .map(|((row, employee), project)| {
            let (employee_id, employee_name) = split_employee(employee.as_deref().unwrap_or(""));
            let (subproject_id, subproject_name) =
                split_subproject(row.subproject.as_deref().unwrap_or(""));
            let (project_id, project_name) = if table.has_project {
                let (id, name) = split_project(project.as_deref().unwrap_or(""));
                (Some(id), Some(name))
            } else {
                (None, None)
            };

            EmployeeRecord {
                employee_id,
                employee_name,
                subproject_id,
                subproject_name,
                project_id,
                project_name,
            }
        })
        .collect()
}

/// 中間テーブルの1行
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRow {
    #[serde(rename = "ID_Empleado")]
    pub employee_id: String,
    #[serde(rename = "Nombre_Empleado")]
    pub employee_name: String,
    #[serde(rename = "ID_Subproyecto")]
    pub subproject_id: String,
    #[serde(rename = "Nombre_Subproyecto")]
    pub subproject_name: String,
    #[serde(rename = "ID_Proyecto", default)]
    pub project_id: Option<String>,
    #[serde(rename = "Nombre_Proyecto", default)]
    pub project_name: Option<String>,
    #[serde(rename = "Evidencia")]
    pub evidence: String,
    #[serde(rename = "Ruta_Evidencia")]
    pub evidence_path: String,
}

impl EvidenceRow {
    /// 照合結果から作成。証憑なしならパスも空
    pub fn from_match(outcome: &MatchResult, evidence_dir: &Path) -> Self {
        let evidence_path = if outcome.is_matched() {
            evidence_dir.join(&outcome.evidence).display().to_string()
        } else {
            String::new()
        };
        let record = &outcome.record;

        Self {
            employee_id: record.employee_id.clone(),
            employee_name: record.employee_name.clone(),
            subproject_id: record.subproject_id.clone(),
            subproject_name: record.subproject_name.clone(),
            project_id: record.project_id.clone(),
            project_name: record.project_name.clone(),
            evidence: outcome.evidence.clone(),
            evidence_path,
        }
    }
}

/// 中間テーブルを書き出す（既存ファイルは置き換え）
pub fn write_records(path: &Path, rows: &[EvidenceRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// 中間テーブルを読み込む
pub fn read_records(path: &Path) -> Result<Vec<EvidenceRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<EvidenceRow>, csv::Error>>()?;
    Ok(rows)
}
