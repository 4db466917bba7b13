//! プロンプト生成モジュール
//!
//! 外部AIサービスへの抽出依頼文を組み立てる。
//! 証憑はスペイン語の書類なので依頼文もスペイン語。

use crate::types::ExpectedValues;

/// 名前が見つからない場合にモデルへ返させる文字列
pub const NAME_NOT_FOUND: &str = "no encontrado";

/// 抽出結果として要求するJSONのキー
pub const REPLY_FIELDS: &[&str] = &[
    "nombre_encontrado",
    "fecha_encontrada",
    "contenido_relevante",
    "tareas_identificadas",
    "justificacion",
];

/// 抽出プロンプト生成
///
/// # Arguments
/// * `expected` - 照合する社員名とサブプロジェクト名
///
/// # Returns
/// 画像と一緒に送る依頼文
pub fn build_extraction_prompt(expected: &ExpectedValues) -> String {
    let employee = expected.employee_name.trim();
    let subproject = expected.subproject_name.trim();

    format!(
        r#"Analiza esta evidencia y responde con un único objeto JSON con los siguientes campos:

1. nombre_encontrado: el nombre de la persona que aparece en la evidencia. Comprueba si aparece "{employee}". Si no aparece ningún nombre, responde "{not_found}".
2. fecha_encontrada: copia literalmente cualquier fecha visible en la evidencia (por ejemplo "14 de febrero de 2024"). Si no hay ninguna, responde "".
3. contenido_relevante: describe el contenido de la evidencia y su relación con el subproyecto "{subproject}".
4. tareas_identificadas: lista de las tareas o actividades que se pueden identificar en la evidencia.
5. justificacion: explica cómo el contenido justifica la participación en el subproyecto "{subproject}".

Formato exacto:
{{
  "nombre_encontrado": "",
  "fecha_encontrada": "",
  "contenido_relevante": "",
  "tareas_identificadas": [],
  "justificacion": ""
}}

Responde SOLO con el JSON, sin texto adicional."#,
        not_found = NAME_NOT_FOUND,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_expected_values() {
        let prompt = build_extraction_prompt(&ExpectedValues::new(" Ana Pérez ", "App Móvil"));
        assert!(prompt.contains("\"Ana Pérez\""));
        assert!(prompt.contains("\"App Móvil\""));
        assert!(prompt.contains(NAME_NOT_FOUND));
    }

    #[test]
    fn test_prompt_lists_all_fields() {
        let prompt = build_extraction_prompt(&ExpectedValues::default());
        for field in REPLY_FIELDS {
            assert!(prompt.contains(field), "missing field {}", field);
        }
        assert!(prompt.contains("SOLO con el JSON"));
    }
}
