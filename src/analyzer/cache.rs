//! 抽出レスポンスのキャッシュ
//!
//! モデル名・プロンプト・証憑バイト列のSHA-256をキーにして
//! 外部サービスの生テキストを保存し、再実行時の呼び出しを省く。

use crate::error::Result;
use crate::report::Reporter;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

const CACHE_FILE_NAME: &str = ".validation-cache.json";

/// キャッシュファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheFile {
    /// バージョン（互換性チェック用）
    version: u32,
    /// キー → エントリ
    entries: HashMap<String, CacheEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// 証憑ファイル名（確認用）
    pub evidence: String,
    /// 外部サービスの生テキスト
    pub response: String,
}

impl CacheFile {
    const CURRENT_VERSION: u32 = 1;

    /// 結果テーブルと同じフォルダに置くキャッシュファイルのパス
    pub fn cache_path(results_path: &Path) -> PathBuf {
        results_path
            .parent()
            .map(|p| p.join(CACHE_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(CACHE_FILE_NAME))
    }

    /// キャッシュファイルを読み込み
    ///
    /// 存在しない・壊れている・バージョン不一致の場合は空のキャッシュ。
    pub fn load(path: &Path, reporter: &dyn Reporter) -> Self {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(_) => return Self::default(),
        };

        match serde_json::from_reader::<_, CacheFile>(BufReader::new(file)) {
            Ok(cache) if cache.version == Self::CURRENT_VERSION => cache,
            Ok(_) => {
                reporter.warning(&format!("キャッシュバージョン不一致、再生成します: {}", path.display()));
                Self::default()
            }
            Err(_) => Self::default(),
        }
    }

    /// キャッシュファイルを保存
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.response.as_str())
    }

    pub fn insert(&mut self, key: String, evidence: String, response: String) {
        self.entries.insert(key, CacheEntry { evidence, response });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// キャッシュファイルを削除
    ///
    /// # Returns
    /// 削除した場合は true、元々存在しなかった場合は false
    pub fn remove(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(path)?;
        Ok(true)
    }
}

impl Default for CacheFile {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: HashMap::new(),
        }
    }
}

/// キャッシュキーを計算（SHA-256の16進表記）
pub fn compute_cache_key(model: &str, prompt: &str, evidence: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model.as_bytes());
    hasher.update([0u8]);
    hasher.update(prompt.as_bytes());
    hasher.update([0u8]);
    hasher.update(evidence);
    hex::encode(hasher.finalize())
}
