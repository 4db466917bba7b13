//! レビュー用HTTPサーバー
//!
//! - GET  /resultados_validacion.csv  結果テーブル
//! - GET  /evidencias/*filename        証憑ファイル
//! - POST /save-results                結果テーブルの置き換え
//! - GET  /healthz

mod cors;
mod error;
pub mod handlers;

pub use error::ServerError;

use crate::config::Config;
use crate::error::{EvidenceAiError, Result};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;

/// ハンドラ間で共有する設定
#[derive(Debug, Clone)]
pub struct AppState {
    pub results_path: PathBuf,
    pub evidence_dir: PathBuf,
    pub archive_dir: Option<PathBuf>,
    pub allowed_origins: Arc<Vec<String>>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            results_path: config.results_path.clone(),
            evidence_dir: config.evidence_dir.clone(),
            archive_dir: config.archive_dir.clone(),
            allowed_origins: Arc::new(config.server.allowed_origins.clone()),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz_handler))
        .route("/resultados_validacion.csv", get(handlers::results_handler))
        .route("/evidencias/*filename", get(handlers::evidence_handler))
        .route("/save-results", post(handlers::save_results_handler))
        .layer(from_fn_with_state(state.clone(), cors::cors_middleware))
        .with_state(state)
}

/// サーバーを起動（終了するまで戻らない）
pub async fn serve(config: &Config) -> Result<()> {
    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| EvidenceAiError::Config(format!("{} にバインドできません: {}", address, e)))?;

    tracing::info!(
        address = %address,
        results = %config.results_path.display(),
        evidence_dir = %config.evidence_dir.display(),
        "サーバー起動"
    );

    axum::serve(listener, build_router(AppState::from_config(config))).await?;
    Ok(())
}
