//! フィードバック送信（Telegram Bot API）

use crate::config::{Config, FeedbackChannel};
use crate::error::{Result, ScoutError};
use kirana_scout_common::{format_feedback_message, FeedbackForm, ScoutMode};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct TelegramResponse {
    #[serde(default)]
    ok: Option<bool>,
    #[serde(default)]
    description: Option<String>,
}

/// sendMessage の応答を判定する
fn interpret_response(status: StatusCode, body: &str) -> Result<()> {
    let parsed: TelegramResponse = serde_json::from_str(body).unwrap_or_default();

    if status.is_success() && parsed.ok != Some(false) {
        return Ok(());
    }

    let description = parsed
        .description
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| "Unknown error".to_string());
    tracing::error!("Telegram API error: {} - {}", status, body);
    Err(ScoutError::FeedbackSend(format!("Telegram error: {}", description)))
}

#[derive(Debug, Clone)]
pub struct FeedbackRelay {
    client: reqwest::Client,
    channel: FeedbackChannel,
}

impl FeedbackRelay {
    pub fn new(channel: FeedbackChannel, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScoutError::Config(format!("HTTPクライアント初期化エラー: {}", e)))?;
        Ok(Self { client, channel })
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.channel.api_url.trim_end_matches('/'),
            self.channel.bot_token
        )
    }

    /// HTML形式のメッセージを送信
    pub async fn send(&self, text: &str) -> Result<()> {
        let request = SendMessageRequest {
            chat_id: &self.channel.chat_id,
            text,
            parse_mode: "HTML",
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Telegram request failed: {}", e);
                ScoutError::FeedbackSend(e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        interpret_response(status, &body)
    }
}

/// 表示用の送信時刻
fn sent_at() -> String {
    chrono::Local::now().format("%d/%m/%Y, %H:%M:%S").to_string()
}

/// フィードバックを検証して送信する
///
/// 検証に失敗した場合は送信先の設定も確認せずに返す
pub async fn submit_feedback(config: &Config, form: &FeedbackForm, mode: ScoutMode) -> Result<()> {
    form.validate()?;

    let relay = FeedbackRelay::new(
        config.feedback_channel()?,
        Duration::from_secs(config.timeout_seconds),
    )?;
    let message = format_feedback_message(form, mode, &sent_at());

    relay.send(&message).await?;
    tracing::info!(mode = %mode, "フィードバック送信完了");
    Ok(())
}
