//! Gemini API連携
//!
//! プロンプトと証憑1件を送り、モデルの生テキストを返す。
//! JSONの解釈は呼び出し側（evidence_ai_common::parse_extraction_response）で行う。

use super::evidence::EvidencePayload;
use crate::config::Config;
use crate::error::{EvidenceAiError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// 抽出リクエスト（プロンプト + 証憑）
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub prompt: String,
    pub evidence: EvidencePayload,
}

/// 証憑から内容を読み取るサービス
///
/// テストでは固定の応答を返すスタブに差し替える。
pub trait ContentExtractor {
    /// キャッシュキーに使うモデル名
    fn model_name(&self) -> &str;

    /// 生テキストを返す
    fn extract(&self, request: &ExtractionRequest) -> impl Future<Output = Result<String>> + Send;
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// Gemini generateContent クライアント
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiClient {
    /// 設定からクライアントを作成
    ///
    /// # Arguments
    /// * `api_key` - Gemini APIキー
    /// * `config` - モデル名・温度・タイムアウト
    pub fn new(api_key: String, config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| EvidenceAiError::ApiCall(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            base_url: GEMINI_API_BASE.to_string(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// 接続先を差し替える（ローカルのモックサーバー用）
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }

    fn build_request(&self, request: &ExtractionRequest) -> GeminiRequest {
        let data = base64::engine::general_purpose::STANDARD.encode(&request.evidence.data);

        GeminiRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: request.prompt.clone(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: request.evidence.mime_type.clone(),
                            data,
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
                response_mime_type: "application/json".to_string(),
            },
        }
    }

    async fn send_once(&self, body: &GeminiRequest) -> Result<String> {
        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(EvidenceAiError::ApiCall(format!("HTTP {}: {}", status, text)));
        }

        let payload: GeminiResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                EvidenceAiError::ApiTimeout(e.to_string())
            } else {
                EvidenceAiError::ApiParse(e.to_string())
            }
        })?;

        first_text(payload).ok_or_else(|| EvidenceAiError::ApiParse("レスポンスにテキストがありません".into()))
    }
}

fn map_send_error(e: reqwest::Error) -> EvidenceAiError {
    if e.is_timeout() {
        EvidenceAiError::ApiTimeout(e.to_string())
    } else {
        EvidenceAiError::ApiCall(e.to_string())
    }
}

fn first_text(payload: GeminiResponse) -> Option<String> {
    payload
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().map(|p| p.text).collect::<String>())
}

impl ContentExtractor for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn extract(&self, request: &ExtractionRequest) -> Result<String> {
        let body = self.build_request(request);

        // タイムアウト時のみ1回だけ再試行
        match self.send_once(&body).await {
            Err(EvidenceAiError::ApiTimeout(_)) => self.send_once(&body).await,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn client() -> GeminiClient {
        GeminiClient::new("key".into(), &Config::default()).unwrap()
    }

    fn short_timeout_client(addr: std::net::SocketAddr) -> GeminiClient {
        let config = Config {
            timeout_seconds: 1,
            ..Config::default()
        };
        GeminiClient::new("key".into(), &config)
            .unwrap()
            .with_base_url(format!("http://{}/v1beta/models", addr))
    }

    fn pdf_request() -> ExtractionRequest {
        ExtractionRequest {
            prompt: "hola".into(),
            evidence: EvidencePayload {
                mime_type: "application/pdf".into(),
                data: b"%PDF".to_vec(),
            },
        }
    }

    /// ヘッダーと Content-Length 分の本文を読み切る
    async fn read_request(stream: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    return;
                }
            }
        }
    }

    #[tokio::test]
    async fn test_timeout_retried_once() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connections = Arc::new(AtomicUsize::new(0));

        let counter = connections.clone();
        let server = tokio::spawn(async move {
            // 受け付けるだけで応答しない
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                held.push(stream);
            }
        });

        let result = short_timeout_client(addr).extract(&pdf_request()).await;
        server.abort();

        assert!(matches!(result, Err(EvidenceAiError::ApiTimeout(_))), "{:?}", result);
        assert_eq!(connections.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_server_error_not_retried() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connections = Arc::new(AtomicUsize::new(0));

        let counter = connections.clone();
        let server = tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                read_request(&mut stream).await;
                let body = "fallo interno";
                let response = format!(
                    "HTTP/1.1 500 Internal Server Error\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        let result = short_timeout_client(addr).extract(&pdf_request()).await;
        server.abort();

        match result {
            Err(EvidenceAiError::ApiCall(message)) => {
                assert!(message.contains("500"), "{}", message);
                assert!(message.contains("fallo interno"), "{}", message);
            }
            other => panic!("ApiCall を期待: {:?}", other),
        }
        assert_eq!(connections.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_endpoint_uses_model() {
        let c = client().with_base_url("http://127.0.0.1:9/v1/");
        assert_eq!(c.endpoint(), "http://127.0.0.1:9/v1/gemini-2.0-flash:generateContent");
    }

    #[test]
    fn test_request_body_shape() {
        let request = ExtractionRequest {
            prompt: "hola".into(),
            evidence: EvidencePayload {
                mime_type: "application/pdf".into(),
                data: b"%PDF".to_vec(),
            },
        };
        let body = serde_json::to_value(client().build_request(&request)).unwrap();

        assert_eq!(body["contents"][0]["parts"][0]["text"], "hola");
        assert_eq!(body["contents"][0]["parts"][1]["inline_data"]["mime_type"], "application/pdf");
        assert_eq!(body["contents"][0]["parts"][1]["inline_data"]["data"], "JVBERg==");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn test_first_text_joins_parts() {
        let payload: GeminiResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(first_text(payload).as_deref(), Some("{\"a\":1}"));

        let empty: GeminiResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(first_text(empty).is_none());
    }
}
