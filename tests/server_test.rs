//! HTTPサーバーの統合テスト
//!
//! エフェメラルポートで実際に起動し、reqwest で叩く。

use evidence_ai_common::ValidationResult;
use evidence_ai_rust::config::Config;
use evidence_ai_rust::export::{read_results, write_results, RESULT_COLUMNS};
use evidence_ai_rust::server::{build_router, handlers::SaveResponse, AppState};
use reqwest::StatusCode;
use serde_json::json;
use std::path::Path;
use tempfile::{tempdir, TempDir};

struct TestServer {
    base: String,
    dir: TempDir,
}

impl TestServer {
    fn results_path(&self) -> std::path::PathBuf {
        self.dir.path().join("resultados_validacion.csv")
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

async fn start(archive: bool) -> TestServer {
    let dir = tempdir().expect("Failed to create temp dir");
    let evidence_dir = dir.path().join("Evidencias 2024");
    std::fs::create_dir_all(&evidence_dir).unwrap();
    std::fs::write(evidence_dir.join("Ana Perez_App.pdf"), b"%PDF-1.4 ana").unwrap();
    std::fs::write(dir.path().join("secreto.txt"), "no").unwrap();

    let config = Config {
        evidence_dir,
        results_path: dir.path().join("resultados_validacion.csv"),
        archive_dir: archive.then(|| dir.path().join("archivo")),
        ..Config::default()
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let router = build_router(AppState::from_config(&config));
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestServer {
        base: format!("http://{}", address),
        dir,
    }
}

fn sample_result(name: &str) -> ValidationResult {
    ValidationResult {
        expected_name: name.into(),
        found_name: name.into(),
        name_ok: true,
        expected_period: "2024".into(),
        found_date: "10 de marzo de 2024".into(),
        period_ok: true,
        expected_task: "App Móvil".into(),
        found_tasks: "revisión, pruebas".into(),
        task_ok: true,
        justification: "ok".into(),
        evidence_link: "data/Evidencias 2024/Ana Perez_App.pdf".into(),
    }
}

fn write_sample(path: &Path) {
    write_results(path, &[sample_result("Ana Pérez")]).unwrap();
}

#[tokio::test]
async fn test_healthz() {
    let server = start(false).await;
    let response = reqwest::get(server.url("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_results_missing_is_404() {
    let server = start(false).await;
    let response = reqwest::get(server.url("/resultados_validacion.csv")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.text().await.unwrap(), "Archivo no encontrado");
}

#[tokio::test]
async fn test_results_served_as_csv() {
    let server = start(false).await;
    write_sample(&server.results_path());

    let response = reqwest::get(server.url("/resultados_validacion.csv")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/csv; charset=utf-8"
    );
    let body = response.text().await.unwrap();
    assert!(body.starts_with(&RESULT_COLUMNS.join(",")));
    assert!(body.contains("Ana Pérez"));
}

#[tokio::test]
async fn test_evidence_served_with_content_type() {
    let server = start(false).await;
    let response = reqwest::get(server.url("/evidencias/Ana%20Perez_App.pdf")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"].to_str().unwrap(), "application/pdf");
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"%PDF-1.4 ana");
}

#[tokio::test]
async fn test_evidence_missing_and_traversal() {
    let server = start(false).await;

    let missing = reqwest::get(server.url("/evidencias/no_existe.jpg")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    // エンコードされた ".." はクライアント側で正規化されない
    let traversal = reqwest::get(server.url("/evidencias/%2E%2E%2Fsecreto.txt")).await.unwrap();
    assert_eq!(traversal.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_save_results_replaces_table() {
    let server = start(true).await;
    write_sample(&server.results_path());

    let csv = format!(
        "{}\nLuis Gómez,Luis Gomez,1,2024,,0,Backend,,0,revisado a mano,data/x.jpg\nAna,,0,2024,,0,App,,0,,\n",
        RESULT_COLUMNS.join(",")
    );
    let response = reqwest::Client::new()
        .post(server.url("/save-results"))
        .json(&json!({ "csvData": csv }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let reply: SaveResponse = response.json().await.unwrap();
    assert!(reply.saved);
    assert_eq!(reply.rows, 2);
    let archived = reply.archived.expect("旧テーブルが退避されていない");
    assert_eq!(read_results(Path::new(&archived)).unwrap()[0].expected_name, "Ana Pérez");

    let saved = read_results(&server.results_path()).unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].expected_name, "Luis Gómez");
    assert!(saved[0].name_ok);
    assert_eq!(saved[0].justification, "revisado a mano");
}

#[tokio::test]
async fn test_save_results_rejects_invalid_csv() {
    let server = start(false).await;
    write_sample(&server.results_path());

    let client = reqwest::Client::new();
    let bad_csv = client
        .post(server.url("/save-results"))
        .json(&json!({ "csvData": "a,b\n1,2\n" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_csv.status(), StatusCode::BAD_REQUEST);

    let bad_body = client
        .post(server.url("/save-results"))
        .header("content-type", "application/json")
        .body("{\"otro\": 1}")
        .send()
        .await
        .unwrap();
    assert_eq!(bad_body.status(), StatusCode::BAD_REQUEST);

    // 旧テーブルはそのまま
    assert_eq!(read_results(&server.results_path()).unwrap().len(), 1);
}

#[tokio::test]
async fn test_cors_preflight_and_headers() {
    let server = start(false).await;
    let client = reqwest::Client::new();

    let preflight = client
        .request(reqwest::Method::OPTIONS, server.url("/save-results"))
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();
    assert_eq!(preflight.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        preflight.headers()["access-control-allow-origin"].to_str().unwrap(),
        "http://localhost:5173"
    );
    assert_eq!(
        preflight.headers()["access-control-allow-methods"].to_str().unwrap(),
        "GET, POST, OPTIONS"
    );

    let allowed = client
        .get(server.url("/healthz"))
        .header("Origin", "http://127.0.0.1:5173")
        .send()
        .await
        .unwrap();
    assert_eq!(
        allowed.headers()["access-control-allow-origin"].to_str().unwrap(),
        "http://127.0.0.1:5173"
    );
    assert!(allowed.headers().contains_key("access-control-expose-headers"));

    let other = client
        .get(server.url("/healthz"))
        .header("Origin", "http://evil.example")
        .send()
        .await
        .unwrap();
    assert!(!other.headers().contains_key("access-control-allow-origin"));
}
