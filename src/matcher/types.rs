use evidence_ai_common::EmployeeRecord;

/// 採用する最低スコア（重み付き合計）
pub const MIN_SCORE: f64 = 0.5;
/// 候補にする最低の社員名類似度
pub const MIN_EMPLOYEE_SIMILARITY: f64 = 0.7;
/// 社員名の重み（取り違えの方が影響が大きい）
pub const EMPLOYEE_WEIGHT: f64 = 0.6;
/// サブプロジェクト名の重み
pub const SUBPROJECT_WEIGHT: f64 = 0.4;

/// ファイル名1件のスコア内訳
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateScore {
    pub employee: f64,
    pub subproject: f64,
    pub total: f64,
}

/// 照合結果（証憑なしは空文字）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchResult {
    pub record: EmployeeRecord,
    pub evidence: String,
    pub score: f64,
}

impl MatchResult {
    pub fn is_matched(&self) -> bool {
        !self.evidence.is_empty()
    }
}
