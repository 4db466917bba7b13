//! 証憑内容の検証
//!
//! 中間テーブルの1行ごとに:
//! 1. 証憑を読み込む
//! 2. 抽出プロンプトを作って外部サービスに送る（キャッシュがあれば省略）
//! 3. 応答をパースして期待値と照合する
//!
//! どの段で失敗してもその行だけが失敗結果になり、バッチは止まらない。

pub mod cache;
pub mod evidence;
pub mod gemini;

pub use cache::{compute_cache_key, CacheFile};
pub use evidence::{load_evidence, EvidencePayload};
pub use gemini::{ContentExtractor, ExtractionRequest, GeminiClient};

use crate::error::{EvidenceAiError, Result};
use crate::records::EvidenceRow;
use crate::report::Reporter;
use evidence_ai_common::{
    build_extraction_prompt, evaluate, parse_extraction_response, ExpectedValues, ValidationResult,
};
use std::path::Path;

/// 検証処理の設定
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// この長辺を超える画像は縮小して送る
    pub max_image_size: u32,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self { max_image_size: 2048 }
    }
}

/// バッチ全体の集計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub name_ok: usize,
    pub period_ok: usize,
    pub task_ok: usize,
    /// 処理自体が失敗した件数
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[ValidationResult]) -> Self {
        Self {
            total: results.len(),
            name_ok: results.iter().filter(|r| r.name_ok).count(),
            period_ok: results.iter().filter(|r| r.period_ok).count(),
            task_ok: results.iter().filter(|r| r.task_ok).count(),
            failed: results.iter().filter(|r| r.is_failure()).count(),
        }
    }

    /// 件数 → 割合（%）。0件なら0
    pub fn percent(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.total as f64
        }
    }

    /// 表示用の集計行
    pub fn lines(&self) -> Vec<String> {
        let line = |label: &str, count: usize| {
            format!("{}: {}/{} ({:.1}%)", label, count, self.total, self.percent(count))
        };
        vec![
            line("Nombre correcto", self.name_ok),
            line("Periodo correcto", self.period_ok),
            line("Tarea identificada", self.task_ok),
            line("Errores de procesamiento", self.failed),
        ]
    }
}

/// 1行を検証する
///
/// エラーは返さない。失敗は `ValidationResult::failed` になる。
///
/// # Arguments
/// * `row` - 中間テーブルの行（期待値と証憑パス）
/// * `extractor` - 外部サービス
/// * `cache` - 応答キャッシュ（None で無効）
pub async fn validate_record<E: ContentExtractor>(
    row: &EvidenceRow,
    extractor: &E,
    options: &ValidationOptions,
    cache: Option<&mut CacheFile>,
    reporter: &dyn Reporter,
) -> ValidationResult {
    let expected = ExpectedValues::new(row.employee_name.as_str(), row.subproject_name.as_str());
    let link = row.evidence_path.as_str();

    match run_validation(row, &expected, extractor, options, cache, reporter).await {
        Ok(result) => {
            reporter.validation_finished(&result);
            result
        }
        Err(e) => {
            let reason = match e {
                EvidenceAiError::NoEvidence => "sin evidencia asignada".to_string(),
                other => other.to_string(),
            };
            reporter.validation_failed(&row.employee_name, &reason);
            let result = ValidationResult::failed(&expected, link, &reason);
            reporter.validation_finished(&result);
            result
        }
    }
}

async fn run_validation<E: ContentExtractor>(
    row: &EvidenceRow,
    expected: &ExpectedValues,
    extractor: &E,
    options: &ValidationOptions,
    cache: Option<&mut CacheFile>,
    reporter: &dyn Reporter,
) -> Result<ValidationResult> {
    if row.evidence_path.trim().is_empty() {
        return Err(EvidenceAiError::NoEvidence);
    }

    let evidence = load_evidence(Path::new(&row.evidence_path), options.max_image_size)?;
    let prompt = build_extraction_prompt(expected);
    let key = compute_cache_key(extractor.model_name(), &prompt, &evidence.data);

    let cached = cache.as_ref().and_then(|c| c.get(&key)).map(str::to_string);
    let (response, from_cache) = match cached {
        Some(text) => {
            reporter.debug(&format!("キャッシュ使用: {}", row.evidence));
            (text, true)
        }
        None => {
            let request = ExtractionRequest { prompt, evidence };
            (extractor.extract(&request).await?, false)
        }
    };
    reporter.debug(&format!("レスポンス長: {} chars", response.len()));

    let reply = parse_extraction_response(&response)?;

    // パースできた応答だけを保存する
    if !from_cache {
        if let Some(cache) = cache {
            cache.insert(key, row.evidence.clone(), response);
        }
    }

    Ok(evaluate(&reply, expected, &row.evidence_path))
}

/// 全行を順番に検証する
///
/// # Arguments
/// * `rows` - 中間テーブル
/// * `limit` - 先頭N件だけ処理（None で全件）
///
/// # Returns
/// 処理した行ごとの結果と集計
pub async fn validate_all<E: ContentExtractor>(
    rows: &[EvidenceRow],
    limit: Option<usize>,
    extractor: &E,
    options: &ValidationOptions,
    mut cache: Option<&mut CacheFile>,
    reporter: &dyn Reporter,
) -> (Vec<ValidationResult>, BatchSummary) {
    let count = limit.map_or(rows.len(), |n| n.min(rows.len()));
    let mut results = Vec::with_capacity(count);

    for (index, row) in rows.iter().take(count).enumerate() {
        reporter.validation_started(index, count, &row.employee_name, &row.subproject_name);
        let result =
            validate_record(row, extractor, options, cache.as_deref_mut(), reporter).await;
        results.push(result);
    }

    let summary = BatchSummary::from_results(&results);
    reporter.batch_finished(&summary);
    (results, summary)
}
