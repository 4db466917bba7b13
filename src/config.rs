use crate::error::{EvidenceAiError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 環境変数（設定ファイルより優先）
const API_KEY_ENV_VARS: &[&str] = &["GOOGLE_API_KEY", "GEMINI_API_KEY"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    /// 生成温度（低いほど再実行時のぶれが小さい）
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// この長辺を超える画像は縮小して送る
    pub max_image_size: u32,
    pub timeout_seconds: u64,

    /// 元データのワークブックとシート名
    pub workbook_path: PathBuf,
    pub sheet_name: String,
    /// 証憑フォルダ
    pub evidence_dir: PathBuf,
    /// 中間テーブル（レコード × 証憑）
    pub records_path: PathBuf,
    /// 結果テーブル
    pub results_path: PathBuf,
    /// 保存時の旧結果テーブル退避先（None で退避しない）
    pub archive_dir: Option<PathBuf>,

    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.0-flash".into(),
            temperature: 0.1,
            max_output_tokens: 1024,
            max_image_size: 2048,
            timeout_seconds: 120,
            workbook_path: PathBuf::from("data/Control de evidencias 2024.xlsx"),
            sheet_name: "Proyectossubproyectos evidencia".into(),
            evidence_dir: PathBuf::from("data/Evidencias 2024"),
            records_path: PathBuf::from("evidencias_2024.csv"),
            results_path: PathBuf::from("resultados_validacion.csv"),
            archive_dir: Some(PathBuf::from("archivo_resultados")),
            server: ServerConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5001,
            allowed_origins: vec![
                "http://localhost:5173".into(),
                "http://127.0.0.1:5173".into(),
            ],
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| EvidenceAiError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("evidence-ai").join("config.json"))
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        for var in API_KEY_ENV_VARS {
            if let Ok(key) = std::env::var(var) {
                if !key.trim().is_empty() {
                    return Ok(key);
                }
            }
        }

        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(EvidenceAiError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = Config::default();
        assert_eq!(config.results_path, PathBuf::from("resultados_validacion.csv"));
        assert_eq!(config.evidence_dir, PathBuf::from("data/Evidencias 2024"));
        assert_eq!(config.server.port, 5001);
        assert!(config.temperature < 0.5);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"model": "gemini-1.5-pro", "server": {"port": 8080}}"#).unwrap();
        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.allowed_origins.len(), 2);
        assert_eq!(config.max_output_tokens, 1024);
    }
}
