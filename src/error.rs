use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvidenceAiError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`evidence-ai config --set-api-key YOUR_KEY` か環境変数 GOOGLE_API_KEY で設定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("証憑が割り当てられていません")]
    NoEvidence,

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("API呼び出しがタイムアウトしました: {0}")]
    ApiTimeout(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("ワークブック読み込みエラー: {0}")]
    Workbook(String),

    #[error("必須列がありません: {0}")]
    MissingColumn(String),

    #[error("CSVエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error(transparent)]
    Common(#[from] evidence_ai_common::Error),
}

pub type Result<T> = std::result::Result<T, EvidenceAiError>;
