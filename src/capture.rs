//! 撮影画像の読み込み
//!
//! ファイルを読み込み、マジックバイトで形式を判定し、同一性判定用の
//! SHA-256ダイジェストを付けた ImageRef を作る。

use crate::error::{Result, ScoutError};
use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use kirana_scout_common::ImageRef;
use sha2::{Digest, Sha256};
use std::path::Path;

/// 読み込んだ画像（状態用の参照 + 送信用のバイト列）
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub reference: ImageRef,
    pub bytes: Vec<u8>,
}

impl CapturedImage {
    /// inline_data 用のBase64
    pub fn base64_data(&self) -> String {
        general_purpose::STANDARD.encode(&self.bytes)
    }

    pub fn mime_type(&self) -> &str {
        &self.reference.mime_type
    }
}

/// 対応形式のMIMEタイプ
fn mime_type_of(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Png => Some("image/png"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

pub fn digest_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// 画像ファイルを読み込む
pub fn load_image(path: &Path, max_bytes: u64) -> Result<CapturedImage> {
    if !path.is_file() {
        return Err(ScoutError::FileNotFound(path.display().to_string()));
    }

    let size = std::fs::metadata(path)?.len();
    if size > max_bytes {
        return Err(ScoutError::ImageLoad(format!(
            "{} は大きすぎます（{} bytes > {} bytes）",
            path.display(),
            size,
            max_bytes
        )));
    }

    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    from_bytes(file_name, bytes, max_bytes)
}

/// バイト列から画像を作る
pub fn from_bytes(file_name: String, bytes: Vec<u8>, max_bytes: u64) -> Result<CapturedImage> {
    if bytes.is_empty() {
        return Err(ScoutError::ImageLoad(format!("{} は空のファイルです", file_name)));
    }
    if bytes.len() as u64 > max_bytes {
        return Err(ScoutError::ImageLoad(format!(
            "{} は大きすぎます（{} bytes > {} bytes）",
            file_name,
            bytes.len(),
            max_bytes
        )));
    }

    let mime_type = image::guess_format(&bytes)
        .ok()
        .and_then(mime_type_of)
        .ok_or_else(|| {
            ScoutError::ImageLoad(format!("{} は対応していない形式です（JPEG/PNG/WebPのみ）", file_name))
        })?;

    let reference = ImageRef {
        file_name,
        mime_type: mime_type.to_string(),
        size_bytes: bytes.len() as u64,
        digest: digest_hex(&bytes),
    };

    Ok(CapturedImage { reference, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG_HEADER: &[u8] = b"\xff\xd8\xff\xe0\0\x10JFIF\0";

    #[test]
    fn test_from_bytes_detects_format() {
        let png = from_bytes("a.png".into(), PNG_HEADER.to_vec(), 1024).unwrap();
        assert_eq!(png.mime_type(), "image/png");

        let jpeg = from_bytes("b.jpg".into(), JPEG_HEADER.to_vec(), 1024).unwrap();
        assert_eq!(jpeg.mime_type(), "image/jpeg");
        assert_eq!(jpeg.reference.size_bytes, JPEG_HEADER.len() as u64);
    }

    #[test]
    fn test_from_bytes_rejects_unknown_format() {
        let result = from_bytes("notes.txt".into(), b"hello world".to_vec(), 1024);
        assert!(matches!(result, Err(ScoutError::ImageLoad(_))));
    }

    #[test]
    fn test_from_bytes_rejects_empty_and_oversized() {
        assert!(matches!(
            from_bytes("empty.jpg".into(), Vec::new(), 1024),
            Err(ScoutError::ImageLoad(_))
        ));
        assert!(matches!(
            from_bytes("big.png".into(), PNG_HEADER.to_vec(), 4),
            Err(ScoutError::ImageLoad(_))
        ));
    }

    #[test]
    fn test_digest_is_stable() {
        let a = from_bytes("a.png".into(), PNG_HEADER.to_vec(), 1024).unwrap();
        let b = from_bytes("renamed.png".into(), PNG_HEADER.to_vec(), 1024).unwrap();
        assert_eq!(a.reference.digest, b.reference.digest);
        assert_eq!(a.reference.digest.len(), 64);
    }

    #[test]
    fn test_base64_data() {
        let img = from_bytes("a.jpg".into(), JPEG_HEADER.to_vec(), 1024).unwrap();
        assert!(img.base64_data().starts_with("/9j/"));
    }
}
