//! 進捗・結果の報告
//!
//! パイプラインの各段はグローバルなロガーを直接呼ばず、
//! 引数で受け取った `Reporter` に出来事を通知する。

use crate::analyzer::BatchSummary;
use crate::matcher::MatchResult;
use evidence_ai_common::ValidationResult;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// パイプラインの出来事の通知先
///
/// 既定実装は何もしない。必要なものだけ上書きする。
pub trait Reporter {
    fn catalog_built(&self, _dir: &Path, _files: usize) {}

    fn catalog_missing(&self, _dir: &Path) {}

    fn record_matched(&self, _outcome: &MatchResult) {}

    fn validation_started(&self, _index: usize, _total: usize, _employee: &str, _subproject: &str) {}

    fn validation_finished(&self, _result: &ValidationResult) {}

    fn validation_failed(&self, _employee: &str, _reason: &str) {}

    fn debug(&self, _message: &str) {}

    /// 処理は続けるが利用者に知らせたい問題
    fn warning(&self, _message: &str) {}

    fn batch_finished(&self, _summary: &BatchSummary) {}
}

/// 何も出力しない
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {}

/// tracing へ出力し、任意でプログレスバーを進める
#[derive(Default)]
pub struct ConsoleReporter {
    progress: Option<ProgressBar>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self { progress: None }
    }

    /// 件数が分かっているバッチ用
    pub fn with_progress(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}") {
            bar.set_style(style);
        }
        Self { progress: Some(bar) }
    }

    fn suspend<F: FnOnce()>(&self, f: F) {
        match &self.progress {
            Some(bar) => bar.suspend(f),
            None => f(),
        }
    }
}

impl Reporter for ConsoleReporter {
    fn catalog_built(&self, dir: &Path, files: usize) {
        tracing::info!(dir = %dir.display(), files, "証憑カタログ作成");
    }

    fn catalog_missing(&self, dir: &Path) {
        tracing::warn!(dir = %dir.display(), "証憑フォルダが存在しません（一致なしとして続行）");
    }

    fn record_matched(&self, outcome: &MatchResult) {
        if outcome.is_matched() {
            tracing::debug!(
                employee = %outcome.record.employee_name,
                subproject = %outcome.record.subproject_name,
                evidence = %outcome.evidence,
                score = outcome.score,
                "証憑を割り当て"
            );
        } else {
            tracing::debug!(
                employee = %outcome.record.employee_name,
                subproject = %outcome.record.subproject_name,
                "該当する証憑なし"
            );
        }
    }

    fn validation_started(&self, index: usize, total: usize, employee: &str, subproject: &str) {
        self.suspend(|| {
            tracing::info!("証憑 {}/{} を処理中: {} - {}", index + 1, total, employee, subproject);
        });
        if let Some(bar) = &self.progress {
            bar.set_message(employee.to_string());
        }
    }

    fn validation_finished(&self, result: &ValidationResult) {
        self.suspend(|| {
            tracing::info!(
                nombre = result.name_ok,
                periodo = result.period_ok,
                tarea = result.task_ok,
                "検証結果"
            );
        });
        if let Some(bar) = &self.progress {
            bar.inc(1);
        }
    }

    fn validation_failed(&self, employee: &str, reason: &str) {
        self.suspend(|| {
            tracing::error!(employee, reason, "証憑の検証に失敗");
        });
    }

    fn debug(&self, message: &str) {
        self.suspend(|| tracing::debug!("{}", message));
    }

    fn warning(&self, message: &str) {
        self.suspend(|| tracing::warn!("{}", message));
    }

    fn batch_finished(&self, summary: &BatchSummary) {
        if let Some(bar) = &self.progress {
            bar.finish_and_clear();
        }
        tracing::info!(
            total = summary.total,
            nombre_ok = summary.name_ok,
            periodo_ok = summary.period_ok,
            tarea_ok = summary.task_ok,
            fallidos = summary.failed,
            "検証サマリ"
        );
        for line in summary.lines() {
            tracing::info!("{}", line);
        }
    }
}
