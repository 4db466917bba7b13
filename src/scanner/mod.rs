//! 証憑カタログ
//!
//! 証憑フォルダ直下のファイル名を列挙する。

use crate::report::Reporter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const EVIDENCE_EXTENSIONS: &[&str] = &["png", "pdf", "jpg", "jpeg"];

/// 証憑フォルダのファイル名一覧（ファイル名順）
#[derive(Debug, Clone, Default)]
pub struct EvidenceCatalog {
    pub dir: PathBuf,
    pub files: Vec<String>,
}

impl EvidenceCatalog {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }

    /// ファイル名 → フォルダを含むパス
    pub fn path_of(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

/// 対象拡張子か（大文字小文字を区別しない）
pub fn is_evidence_file(file_name: &str) -> bool {
    if file_name.starts_with('.') {
        return false;
    }
    Path::new(file_name)
        .extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            EVIDENCE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// 証憑カタログを作成
///
/// フォルダが存在しない場合は空のカタログを返す（後段は一致なしになるだけ）。
pub fn build_catalog(dir: &Path, reporter: &dyn Reporter) -> EvidenceCatalog {
    if !dir.is_dir() {
        reporter.catalog_missing(dir);
        return EvidenceCatalog {
            dir: dir.to_path_buf(),
            files: Vec::new(),
        };
    }

    let mut files: Vec<String> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1) // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| is_evidence_file(name))
        .collect();

    // ファイル名でソート
    files.sort();

    reporter.catalog_built(dir, files.len());

    EvidenceCatalog {
        dir: dir.to_path_buf(),
        files,
    }
}
