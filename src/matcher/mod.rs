//! レコード ↔ 証憑ファイルの照合
//!
//! ファイル名を最初の `_` で「社員名」と「残り（サブプロジェクト）」に分け、
//! それぞれの類似度の重み付き合計で最良の1件を選ぶ。

mod types;

pub use types::{
    CandidateScore, MatchResult, EMPLOYEE_WEIGHT, MIN_EMPLOYEE_SIMILARITY, MIN_SCORE,
    SUBPROJECT_WEIGHT,
};

use crate::report::Reporter;
use crate::scanner::EvidenceCatalog;
use evidence_ai_common::similarity::ratio;
use evidence_ai_common::EmployeeRecord;

/// 1ファイルのスコア。`_` を含まないファイル名は対象外
pub fn score_candidate(employee: &str, subproject: &str, file_name: &str) -> Option<CandidateScore> {
    let (employee_part, rest) = file_name.split_once('_')?;

    let employee_sim = ratio(employee.trim(), employee_part.trim());
    let subproject_sim = ratio(subproject.trim(), rest);

    Some(CandidateScore {
        employee: employee_sim,
        subproject: subproject_sim,
        total: employee_sim * EMPLOYEE_WEIGHT + subproject_sim * SUBPROJECT_WEIGHT,
    })
}

/// 最良の証憑ファイルを探す
///
/// 社員名類似度が閾値を超えた候補のうちスコア最大のもの。同点ならカタログ順で先のもの。
/// 最大スコアが `MIN_SCORE` 以下なら `None`。
pub fn find_best_evidence<'a, I>(employee: &str, subproject: &str, candidates: I) -> Option<(String, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<&str> = None;
    let mut best_score = 0.0;

    for file_name in candidates {
        let Some(score) = score_candidate(employee, subproject, file_name) else {
            continue;
        };
        if score.total > best_score && score.employee > MIN_EMPLOYEE_SIMILARITY {
            best_score = score.total;
            best = Some(file_name);
        }
    }

    match best {
        Some(file_name) if best_score > MIN_SCORE => Some((file_name.to_string(), best_score)),
        _ => None,
    }
}

/// 1レコードを照合
pub fn match_record(record: &EmployeeRecord, catalog: &EvidenceCatalog) -> MatchResult {
    match find_best_evidence(&record.employee_name, &record.subproject_name, catalog.iter()) {
        Some((evidence, score)) => MatchResult {
            record: record.clone(),
            evidence,
            score,
        },
        None => MatchResult {
            record: record.clone(),
            ..Default::default()
        },
    }
}

/// 全レコードを照合（元の行順を保つ）
pub fn match_records(
    records: &[EmployeeRecord],
    catalog: &EvidenceCatalog,
    reporter: &dyn Reporter,
) -> Vec<MatchResult> {
    records
        .iter()
        .map(|record| {
            let outcome = match_record(record, catalog);
            reporter.record_matched(&outcome);
            outcome
        })
        .collect()
}
