use crate::error::{Result, ScoutError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// 表示テーマ（端末の色分け）。セッションをまたいで保持する唯一の表示設定
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" | "l" => Ok(Theme::Light),
            "dark" | "d" => Ok(Theme::Dark),
            _ => Err(format!("Unknown theme: {}. Use light or dark", s)),
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    pub timeout_seconds: u64,
    /// これを超える画像は送信しない（Geminiのinline data上限は20MB）
    pub max_image_bytes: u64,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub telegram_api_url: String,
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            api_base_url: DEFAULT_API_BASE_URL.into(),
            timeout_seconds: 60,
            max_image_bytes: 15 * 1024 * 1024,
            telegram_bot_token: None,
            telegram_chat_id: None,
            telegram_api_url: DEFAULT_TELEGRAM_API_URL.into(),
            theme: Theme::Light,
        }
    }
}

/// 送信先（Bot token, chat id）
#[derive(Debug, Clone)]
pub struct FeedbackChannel {
    pub api_url: String,
    pub bot_token: String,
    pub chat_id: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ScoutError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("kirana-scout").join("config.json"))
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        let env_key = env_secret("GEMINI_API_KEY").or_else(|| env_secret("API_KEY"));
        pick_secret(env_key, self.api_key.as_deref()).ok_or(ScoutError::MissingApiKey)
    }

    pub fn feedback_channel(&self) -> Result<FeedbackChannel> {
        let bot_token = pick_secret(
            env_secret("KIRANA_TELEGRAM_BOT_TOKEN"),
            self.telegram_bot_token.as_deref(),
        );
        let chat_id = pick_secret(
            env_secret("KIRANA_TELEGRAM_CHAT_ID"),
            self.telegram_chat_id.as_deref(),
        );

        match (bot_token, chat_id) {
            (Some(bot_token), Some(chat_id)) => Ok(FeedbackChannel {
                api_url: self.telegram_api_url.clone(),
                bot_token,
                chat_id,
            }),
            _ => Err(ScoutError::MissingFeedbackChannel),
        }
    }
}

fn env_secret(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// 環境変数 → 設定ファイルの順に、空でない値を採用
fn pick_secret(env_value: Option<String>, stored: Option<&str>) -> Option<String> {
    env_value
        .filter(|v| !v.trim().is_empty())
        .or_else(|| stored.map(str::to_string).filter(|v| !v.trim().is_empty()))
        .map(|v| v.trim().to_string())
}
