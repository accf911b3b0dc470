use kirana_scout_common::{FeedbackError, ScoutMode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`kirana-scout config --set-api-key YOUR_KEY` か GEMINI_API_KEY で設定してください")]
    MissingApiKey,

    #[error("フィードバック送信先が設定されていません。`kirana-scout config --set-bot-token TOKEN --set-chat-id ID` で設定してください")]
    MissingFeedbackChannel,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    /// ユーザー向けの解析失敗（原因はログにのみ出す）
    #[error("{}", .0.failure_message())]
    AnalysisFailed(ScoutMode),

    #[error("{0}")]
    FeedbackValidation(#[from] FeedbackError),

    #[error("Send nahi ho paya: {0}. Please check karein ki Bot aapke channel ka Admin hai.")]
    FeedbackSend(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] kirana_scout_common::Error),
}

pub type Result<T> = std::result::Result<T, ScoutError>;
