//! 抽出結果の判定
//!
//! - 名前: 正規化後の完全一致
//! - 期間: 固定年の日付表記が見つかるか
//! - タスク: 何らかのタスクが抽出されたか（内容は比較しない）

use crate::normalize::names_match;
use crate::period::extract_period;
use crate::types::{ExpectedValues, ExtractionReply, ValidationResult, PERIOD_YEAR};

/// 抽出結果を期待値と照合して検証結果を作る
///
/// 期待値と抽出値を並べて残し、レビュー担当者が自動判定を確認できるようにする。
pub fn evaluate(
    reply: &ExtractionReply,
    expected: &ExpectedValues,
    evidence_link: &str,
) -> ValidationResult {
    let found_name = reply.nombre_encontrado.trim().to_string();
    let name_ok = names_match(&expected.employee_name, &found_name);

    let found_date = extract_period(&reply.fecha_encontrada).unwrap_or_default();
    let period_ok = !found_date.is_empty();

    let task_ok = reply.tareas_identificadas.is_present();

    ValidationResult {
        expected_name: expected.employee_name.clone(),
        found_name,
        name_ok,
        expected_period: PERIOD_YEAR.to_string(),
        found_date,
        period_ok,
        expected_task: expected.subproject_name.clone(),
        found_tasks: reply.tareas_identificadas.display(),
        task_ok,
        justification: reply.justificacion.clone(),
        evidence_link: evidence_link.to_string(),
    }
}
