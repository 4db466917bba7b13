use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// HTTPハンドラのエラー（ステータスコードへ変換される）
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("内部エラー: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<crate::error::EvidenceAiError> for ServerError {
    fn from(e: crate::error::EvidenceAiError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<std::io::Error> for ServerError {
    fn from(e: std::io::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            Self::NotFound(message) | Self::BadRequest(message) => message,
            Self::Internal(message) => {
                // 詳細はログにだけ残す
                tracing::error!(error = %message, "リクエスト処理エラー");
                "Error interno del servidor".to_string()
            }
        };

        (status, body).into_response()
    }
}
