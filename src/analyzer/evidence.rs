//! 証憑ファイルの読み込み
//!
//! - PDF: そのまま送る
//! - 画像: デコードできることを確認し、大きすぎる場合は縮小してJPEGで送る

use crate::error::{EvidenceAiError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;

/// 外部サービスへ送る証憑データ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidencePayload {
    pub mime_type: String,
    pub data: Vec<u8>,
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// 証憑を読み込む
///
/// # Arguments
/// * `path` - 証憑ファイルのパス
/// * `max_image_size` - 画像の長辺の上限（px）
pub fn load_evidence(path: &Path, max_image_size: u32) -> Result<EvidencePayload> {
    if !path.is_file() {
        return Err(EvidenceAiError::FileNotFound(path.display().to_string()));
    }

    if is_pdf(path) {
        return Ok(EvidencePayload {
            mime_type: "application/pdf".into(),
            data: std::fs::read(path)?,
        });
    }

    let reader = ImageReader::open(path)?
        .with_guessed_format()
        .map_err(|e| EvidenceAiError::ImageLoad(format!("{}: {}", path.display(), e)))?;
    let format = reader.format();
    let image = reader
        .decode()
        .map_err(|e| EvidenceAiError::ImageLoad(format!("{}: {}", path.display(), e)))?;

    if image.width() > max_image_size || image.height() > max_image_size {
        return encode_jpeg(&image.resize(max_image_size, max_image_size, FilterType::Triangle));
    }

    match format {
        Some(format @ (ImageFormat::Jpeg | ImageFormat::Png)) => Ok(EvidencePayload {
            mime_type: format.to_mime_type().into(),
            data: std::fs::read(path)?,
        }),
        // それ以外の形式はJPEGに変換して送る
        _ => encode_jpeg(&image),
    }
}

fn encode_jpeg(image: &DynamicImage) -> Result<EvidencePayload> {
    // JPEGはアルファチャンネル非対応
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let mut data = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut data), ImageFormat::Jpeg)
        .map_err(|e| EvidenceAiError::ImageLoad(format!("JPEG変換エラー: {}", e)))?;

    Ok(EvidencePayload {
        mime_type: "image/jpeg".into(),
        data,
    })
}
