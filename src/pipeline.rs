//! コマンド単位の処理
//!
//! - prepare: ワークブック → 証憑割り当て → 中間テーブル
//! - validate: 中間テーブル → 内容検証 → 結果テーブル
//!
//! 入力テーブルを開けない場合と結果テーブルを書けない場合だけが全体のエラーになる。

use crate::analyzer::{validate_all, BatchSummary, CacheFile, ContentExtractor, ValidationOptions};
use crate::config::Config;
use crate::error::Result;
use crate::export::{archive_results, write_results, write_results_xlsx};
use crate::matcher::match_records;
use crate::records::{build_records, read_records, read_workbook, write_records, EvidenceRow};
use crate::report::Reporter;
use crate::scanner::build_catalog;
use std::path::PathBuf;

/// prepare の集計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrepareSummary {
    pub records: usize,
    pub matched: usize,
    pub catalog_files: usize,
}

/// ワークブックから中間テーブルを作る
pub fn prepare(config: &Config, reporter: &dyn Reporter) -> Result<PrepareSummary> {
    let table = read_workbook(&config.workbook_path, &config.sheet_name)?;
    let records = build_records(&table);

    let catalog = build_catalog(&config.evidence_dir, reporter);
    let outcomes = match_records(&records, &catalog, reporter);

    let rows: Vec<EvidenceRow> = outcomes
        .iter()
        .map(|o| EvidenceRow::from_match(o, &config.evidence_dir))
        .collect();
    write_records(&config.records_path, &rows)?;

    Ok(PrepareSummary {
        records: rows.len(),
        matched: outcomes.iter().filter(|o| o.is_matched()).count(),
        catalog_files: catalog.len(),
    })
}

/// validate の実行条件
#[derive(Debug, Clone, Default)]
pub struct ValidateSettings {
    pub limit: Option<usize>,
    pub use_cache: bool,
    pub xlsx: Option<PathBuf>,
}

/// validate の結果
#[derive(Debug, Clone)]
pub struct ValidateOutcome {
    pub summary: BatchSummary,
    /// 上書き前の結果テーブルの退避先
    pub archived: Option<PathBuf>,
}

/// 中間テーブルの証憑を検証して結果テーブルを置き換える
pub async fn validate<E: ContentExtractor>(
    config: &Config,
    extractor: &E,
    settings: &ValidateSettings,
    reporter: &dyn Reporter,
) -> Result<ValidateOutcome> {
    let rows = read_records(&config.records_path)?;

    let cache_path = CacheFile::cache_path(&config.results_path);
    let mut cache = settings.use_cache.then(|| CacheFile::load(&cache_path, reporter));

    let options = ValidationOptions {
        max_image_size: config.max_image_size,
    };
    let (results, summary) =
        validate_all(&rows, settings.limit, extractor, &options, cache.as_mut(), reporter).await;

    // 退避・キャッシュ保存・xlsx の失敗は警告に留め、結果テーブルは必ず書く
    let archived = match &config.archive_dir {
        Some(dir) => match archive_results(&config.results_path, dir, chrono::Local::now().naive_local()) {
            Ok(archived) => archived,
            Err(e) => {
                reporter.warning(&format!("結果テーブルの退避に失敗: {}", e));
                None
            }
        },
        None => None,
    };
    write_results(&config.results_path, &results)?;

    if let Some(cache) = &cache {
        if let Err(e) = cache.save(&cache_path) {
            reporter.warning(&format!("キャッシュ保存に失敗: {}", e));
        }
    }
    if let Some(xlsx) = &settings.xlsx {
        if let Err(e) = write_results_xlsx(xlsx, &results) {
            reporter.warning(&format!("xlsx出力に失敗: {}", e));
        }
    }

    Ok(ValidateOutcome { summary, archived })
}
