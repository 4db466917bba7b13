//! 検証パイプラインの型定義
//!
//! CLIとHTTPサーバで共有される型:
//! - EmployeeRecord: 元データ1行（社員 × サブプロジェクト）
//! - ExtractionReply: 外部AIサービスの抽出結果
//! - ValidationResult: 最終出力（結果テーブルの1行）

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// 照合対象の年（期間チェックは固定年の日付表記のみ受け付ける）
pub const PERIOD_YEAR: &str = "2024";

/// 処理失敗時に justificacion の先頭に付く文言
pub const ERROR_PREFIX: &str = "Error al procesar";

/// 元データ1行
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub employee_id: String,
    pub employee_name: String,
    pub subproject_id: String,
    pub subproject_name: String,
    /// プロジェクト列がある場合のみ
    pub project_id: Option<String>,
    pub project_name: Option<String>,
}

/// 検証時の期待値
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedValues {
    pub employee_name: String,
    pub subproject_name: String,
}

impl ExpectedValues {
    pub fn new(employee_name: impl Into<String>, subproject_name: impl Into<String>) -> Self {
        Self {
            employee_name: employee_name.into(),
            subproject_name: subproject_name.into(),
        }
    }
}

/// tareas_identificadas（リストまたは文字列で返ってくる）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TaskList {
    List(Vec<String>),
    Text(String),
}

impl Default for TaskList {
    fn default() -> Self {
        TaskList::Text(String::new())
    }
}

impl TaskList {
    /// 1件以上のリスト、または空白でない文字列
    pub fn is_present(&self) -> bool {
        match self {
            TaskList::List(items) => !items.is_empty(),
            TaskList::Text(text) => !text.trim().is_empty(),
        }
    }

    /// 結果テーブル用の表示文字列
    pub fn display(&self) -> String {
        match self {
            TaskList::List(items) => items.join(", "),
            TaskList::Text(text) => text.clone(),
        }
    }
}

impl<'de> Deserialize<'de> for TaskList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::Array(items) => {
                TaskList::List(items.into_iter().map(value_to_text).collect())
            }
            other => TaskList::Text(value_to_text(other)),
        })
    }
}

/// 外部サービスの抽出結果
///
/// モデルの出力は型が揺れるため、各フィールドは文字列へ寛容に変換する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExtractionReply {
    #[serde(deserialize_with = "lenient_string")]
    pub nombre_encontrado: String,
    #[serde(deserialize_with = "lenient_string")]
    pub fecha_encontrada: String,
    #[serde(deserialize_with = "lenient_string")]
    pub contenido_relevante: String,
    pub tareas_identificadas: TaskList,
    #[serde(deserialize_with = "lenient_string")]
    pub justificacion: String,
}

/// 検証結果（結果テーブルの1行）
///
/// 列名はレビュー用フロントエンドが読むCSVヘッダーに合わせる。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationResult {
    #[serde(rename = "Nombre_a_validar")]
    pub expected_name: String,
    #[serde(rename = "Nombre_encontrado")]
    pub found_name: String,
    #[serde(rename = "Nombre_ok", with = "flag")]
    pub name_ok: bool,
    #[serde(rename = "Periodo_a_validar")]
    pub expected_period: String,
    #[serde(rename = "Fecha_encontrada")]
    pub found_date: String,
    #[serde(rename = "Periodo_ok", with = "flag")]
    pub period_ok: bool,
    #[serde(rename = "Tarea_a_validar")]
    pub expected_task: String,
    #[serde(rename = "Tareas_encontradas")]
    pub found_tasks: String,
    #[serde(rename = "Tarea_ok", with = "flag")]
    pub task_ok: bool,
    #[serde(rename = "Justificacion")]
    pub justification: String,
    #[serde(rename = "Link_imagen")]
    pub evidence_link: String,
}

impl ValidationResult {
    /// 処理失敗時の結果（全フラグfalse、justificacionに診断メッセージ）
    pub fn failed(expected: &ExpectedValues, evidence_link: &str, message: &str) -> Self {
        Self {
            expected_name: expected.employee_name.clone(),
            expected_period: PERIOD_YEAR.to_string(),
            expected_task: expected.subproject_name.clone(),
            justification: format!("{}: {}", ERROR_PREFIX, message),
            evidence_link: evidence_link.to_string(),
            ..Default::default()
        }
    }

    /// 処理失敗として生成された結果か
    pub fn is_failure(&self) -> bool {
        !self.name_ok
            && !self.period_ok
            && !self.task_ok
            && self.justification.starts_with(ERROR_PREFIX)
    }
}

fn value_to_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(value_to_text)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value_to_text(value))
}

/// 0/1 フラグのシリアライズ
///
/// 書き込みは常に `1` / `0`。読み込みはフロントエンドが書き戻す
/// 表記揺れ（`true`, `1.0` など）も受け付ける。
mod flag {
    use super::*;

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        deserializer.deserialize_any(FlagVisitor)
    }

    struct FlagVisitor;

    impl<'de> Visitor<'de> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a 0/1 flag")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<bool, E> {
            Ok(v != 0.0)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            match v.trim().to_lowercase().as_str() {
                "" | "0" | "0.0" | "false" => Ok(false),
                "1" | "1.0" | "true" => Ok(true),
                other => Err(E::custom(format!("invalid flag value: {}", other))),
            }
        }

        fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }

        fn visit_none<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_list_from_array() {
        let reply: ExtractionReply =
            serde_json::from_str(r#"{"tareas_identificadas": ["revisión", "pruebas"]}"#).unwrap();
        assert_eq!(
            reply.tareas_identificadas,
            TaskList::List(vec!["revisión".into(), "pruebas".into()])
        );
        assert_eq!(reply.tareas_identificadas.display(), "revisión, pruebas");
    }

    #[test]
    fn test_task_list_presence() {
        assert!(!TaskList::List(vec![]).is_present());
        assert!(!TaskList::Text(String::new()).is_present());
        assert!(TaskList::List(vec![String::new()]).is_present());
        assert!(TaskList::Text("diseño".into()).is_present());
    }

    #[test]
    fn test_reply_lenient_fields() {
        let reply: ExtractionReply = serde_json::from_str(
            r#"{"nombre_encontrado": null, "fecha_encontrada": 2024, "tareas_identificadas": null}"#,
        )
        .unwrap();
        assert_eq!(reply.nombre_encontrado, "");
        assert_eq!(reply.fecha_encontrada, "2024");
        assert!(!reply.tareas_identificadas.is_present());
        assert_eq!(reply.justificacion, "");
    }

    #[test]
    fn test_failed_result() {
        let expected = ExpectedValues::new("Ana Pérez", "App Móvil");
        let result = ValidationResult::failed(&expected, "data/x.jpg", "timeout");
        assert!(!result.name_ok && !result.period_ok && !result.task_ok);
        assert_eq!(result.justification, "Error al procesar: timeout");
        assert_eq!(result.expected_period, "2024");
        assert!(result.is_failure());
    }

    #[test]
    fn test_flag_serializes_as_digit() {
        let result = ValidationResult {
            name_ok: true,
            ..Default::default()
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["Nombre_ok"], 1);
        assert_eq!(json["Periodo_ok"], 0);
    }

    #[test]
    fn test_flag_accepts_variants() {
        let json = r#"{"Nombre_ok": "1", "Periodo_ok": true, "Tarea_ok": 0}"#;
        let result: ValidationResult = serde_json::from_str(json).unwrap();
        assert!(result.name_ok);
        assert!(result.period_ok);
        assert!(!result.task_ok);
    }
}
