//! APIレスポンスパーサー
//!
//! モデルの返答からコードフェンスを外し、抽出結果JSONをパースする。
//! 返答形式の揺れはこのモジュールだけで吸収する。

use crate::error::{Error, Result};
use crate::types::ExtractionReply;

/// Markdownコードフェンスを除去
///
/// 先頭の ```` ```json ```` （または ```` ``` ````）と末尾の ```` ``` ```` を外す。
/// フェンスがなければ前後の空白を除いた文字列をそのまま返す。
///
/// # Examples
/// ```
/// use evidence_ai_common::strip_code_fence;
///
/// assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
/// assert_eq!(strip_code_fence("  {\"a\": 1} "), "{\"a\": 1}");
/// ```
pub fn strip_code_fence(response: &str) -> &str {
    let mut text = response.trim();

    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```JSON") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }

    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

/// 抽出結果をパース
///
/// # Arguments
/// * `response` - サービスの生テキスト
///
/// # Returns
/// * `Ok(ExtractionReply)` - パース成功
/// * `Err` - 空の返答、またはJSONとして不正
pub fn parse_extraction_response(response: &str) -> Result<ExtractionReply> {
    let json_str = strip_code_fence(response);
    if json_str.is_empty() {
        return Err(Error::Parse("respuesta vacía".into()));
    }

    let reply: ExtractionReply = serde_json::from_str(json_str)
        .map_err(|e| Error::Parse(format!("JSON inválido: {}", e)))?;
    Ok(reply)
}
