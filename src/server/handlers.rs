use super::{AppState, ServerError};
use crate::export::{archive_results, read_results_from_str, write_results};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path as UrlPath, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

const NOT_FOUND_MESSAGE: &str = "Archivo no encontrado";

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    #[serde(rename = "csvData")]
    pub csv_data: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveResponse {
    pub saved: bool,
    pub rows: usize,
    pub archived: Option<String>,
}

pub(crate) async fn healthz_handler() -> &'static str {
    "ok"
}

pub(crate) async fn results_handler(State(state): State<AppState>) -> Result<Response, ServerError> {
    match tokio::fs::read(&state.results_path).await {
        Ok(bytes) => Ok(([(CONTENT_TYPE, "text/csv; charset=utf-8")], bytes).into_response()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ServerError::NotFound(NOT_FOUND_MESSAGE.into()))
        }
        Err(e) => Err(e.into()),
    }
}

/// 拡張子 → Content-Type
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// URL上のファイル名を証憑フォルダ内の相対パスに変換する
///
/// `..` や絶対パスなどフォルダの外を指すものは None。
pub fn safe_relative_path(requested: &str) -> Option<PathBuf> {
    let requested = requested.trim_start_matches('/');
    if requested.is_empty() {
        return None;
    }

    let mut relative = PathBuf::new();
    for component in Path::new(requested).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    (!relative.as_os_str().is_empty()).then_some(relative)
}

pub(crate) async fn evidence_handler(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> Result<Response, ServerError> {
    let relative = safe_relative_path(&filename)
        .ok_or_else(|| ServerError::BadRequest("Ruta no permitida".into()))?;
    let path = state.evidence_dir.join(relative);

    // シンボリックリンクでフォルダ外に出ていないか
    let (Ok(root), Ok(resolved)) = (
        tokio::fs::canonicalize(&state.evidence_dir).await,
        tokio::fs::canonicalize(&path).await,
    ) else {
        return Err(ServerError::NotFound(NOT_FOUND_MESSAGE.into()));
    };
    if !resolved.starts_with(&root) {
        return Err(ServerError::BadRequest("Ruta no permitida".into()));
    }
    if !resolved.is_file() {
        return Err(ServerError::NotFound(NOT_FOUND_MESSAGE.into()));
    }

    let bytes = tokio::fs::read(&resolved).await?;
    Ok(([(CONTENT_TYPE, content_type_for(&resolved))], bytes).into_response())
}

pub(crate) async fn save_results_handler(
    State(state): State<AppState>,
    payload: Result<Json<SaveRequest>, JsonRejection>,
) -> Result<Json<SaveResponse>, ServerError> {
    let Json(request) = payload.map_err(|e| ServerError::BadRequest(e.body_text()))?;

    let results = read_results_from_str(&request.csv_data)
        .map_err(|e| ServerError::BadRequest(format!("CSV inválido: {}", e)))?;

    let archived = match &state.archive_dir {
        Some(dir) => archive_results(&state.results_path, dir, chrono::Local::now().naive_local())?,
        None => None,
    };

    write_results(&state.results_path, &results)?;

    tracing::info!(
        rows = results.len(),
        archived = archived.as_ref().map(|p| p.display().to_string()).unwrap_or_default(),
        "結果テーブルを保存"
    );

    Ok(Json(SaveResponse {
        saved: true,
        rows: results.len(),
        archived: archived.map(|p| p.display().to_string()),
    }))
}
