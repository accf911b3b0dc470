//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use kirana_scout::capture;
use kirana_scout::error::ScoutError;
use kirana_scout_common::{FeedbackError, ScoutMode};
use std::path::Path;
use tempfile::tempdir;

/// 存在しない画像を読み込んだ場合
#[test]
fn test_load_nonexistent_image() {
    let result = capture::load_image(Path::new("/nonexistent/path/12345.jpg"), 1024);
    assert!(matches!(result, Err(ScoutError::FileNotFound(_))));
}

/// ディレクトリを画像として渡した場合
#[test]
fn test_load_directory_as_image() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = capture::load_image(dir.path(), 1024);
    assert!(matches!(result, Err(ScoutError::FileNotFound(_))));
}

/// 画像でないファイル
#[test]
fn test_load_text_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("notes.jpg");
    std::fs::write(&path, "not an image").unwrap();

    let result = capture::load_image(&path, 1024);
    assert!(matches!(result, Err(ScoutError::ImageLoad(_))));
}

/// ScoutErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        ScoutError::Config("テスト設定エラー".to_string()),
        ScoutError::FileNotFound("test.jpg".to_string()),
        ScoutError::ImageLoad("broken.png".to_string()),
        ScoutError::ApiCall("API呼び出し失敗".to_string()),
        ScoutError::ApiParse("Empty response".to_string()),
        ScoutError::MissingFeedbackChannel,
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// MissingApiKeyエラーのメッセージ確認
#[test]
fn test_missing_api_key_message() {
    let display = ScoutError::MissingApiKey.to_string();

    assert!(display.contains("APIキー"));
    assert!(display.contains("kirana-scout config"));
}

/// 解析失敗はモードごとのメッセージだけを出す
#[test]
fn test_analysis_failed_message() {
    assert_eq!(
        ScoutError::AnalysisFailed(ScoutMode::PriceScout).to_string(),
        ScoutMode::PriceScout.failure_message()
    );
    assert_eq!(
        ScoutError::AnalysisFailed(ScoutMode::HealthScout).to_string(),
        ScoutMode::HealthScout.failure_message()
    );
    assert_ne!(
        ScoutMode::PriceScout.failure_message(),
        ScoutMode::HealthScout.failure_message()
    );
}

/// 送信失敗には原因とBot管理者の確認案内が入る
#[test]
fn test_feedback_send_message() {
    let display = ScoutError::FeedbackSend("Telegram error: chat not found".into()).to_string();
    assert!(display.contains("chat not found"));
    assert!(display.contains("Admin"));
}

/// 入力検証エラーからの変換
#[test]
fn test_feedback_validation_conversion() {
    let err: ScoutError = FeedbackError::InvalidEmail.into();
    assert!(matches!(err, ScoutError::FeedbackValidation(FeedbackError::InvalidEmail)));
    assert_eq!(err.to_string(), FeedbackError::InvalidEmail.to_string());
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: ScoutError = io_err.into();

    assert!(matches!(err, ScoutError::Io(_)));
    assert!(err.to_string().contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: ScoutError = json_err.into();

    assert!(matches!(err, ScoutError::JsonParse(_)));
}

/// common::Errorからの変換（透過的エラー）
#[test]
fn test_common_error_conversion() {
    let common_err = kirana_scout_common::Error::Parse("パースエラー".to_string());
    let err: ScoutError = common_err.into();

    assert!(matches!(err, ScoutError::Common(_)));
    assert!(err.to_string().contains("パースエラー"));
}
