//! Gemini API連携
//!
//! - 価格チェック: 画像 + プロンプト + Google検索ツール（引用元をgroundingMetadataで受け取る）
//! - 成分チェック: 画像 + プロンプト + responseMimeType=application/json

use crate::capture::CapturedImage;
use crate::config::Config;
use crate::error::{Result, ScoutError};
use kirana_scout_common::{build_ingredient_prompt, build_price_prompt, GroundingChunk};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini APIリクエスト
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

/// Gemini APIレスポンス
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

/// レスポンスから取り出したテキストと引用元
#[derive(Debug, Clone, Default)]
pub struct GeminiReply {
    pub text: String,
    pub grounding_chunks: Vec<GroundingChunk>,
}

impl GeminiResponse {
    /// 最初の候補のテキストパートを連結する
    fn into_reply(self) -> Result<GeminiReply> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ScoutError::ApiParse("Empty response".into()))?;

        let text = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let grounding_chunks = candidate
            .grounding_metadata
            .map(|m| m.grounding_chunks)
            .unwrap_or_default();

        Ok(GeminiReply {
            text,
            grounding_chunks,
        })
    }
}

fn image_part(image: &CapturedImage) -> Part {
    Part::InlineData {
        inline_data: InlineData {
            mime_type: image.mime_type().to_string(),
            data: image.base64_data(),
        },
    }
}

/// 価格チェック用リクエスト（Web検索あり）
pub fn build_price_request(image: &CapturedImage) -> GeminiRequest {
    GeminiRequest {
        contents: vec![Content {
            parts: vec![
                image_part(image),
                Part::Text {
                    text: build_price_prompt(),
                },
            ],
        }],
        tools: vec![Tool {
            google_search: GoogleSearch {},
        }],
        generation_config: None,
    }
}

/// 成分チェック用リクエスト（JSON出力）
pub fn build_ingredient_request(image: &CapturedImage) -> GeminiRequest {
    GeminiRequest {
        contents: vec![Content {
            parts: vec![
                image_part(image),
                Part::Text {
                    text: build_ingredient_prompt(),
                },
            ],
        }],
        tools: Vec::new(),
        generation_config: Some(GenerationConfig {
            response_mime_type: "application/json".to_string(),
        }),
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScoutError::Config(format!("HTTPクライアント初期化エラー: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            model,
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.get_api_key()?,
            config.model.clone(),
            config.api_base_url.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Gemini API呼び出し（共通処理）
    pub async fn generate(&self, request: &GeminiRequest) -> Result<GeminiReply> {
        tracing::debug!(model = %self.model, "Gemini APIリクエスト送信");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini API request failed: {}", e);
                ScoutError::ApiCall(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini API error: {} - {}", status, error_text);
            return Err(ScoutError::ApiCall(format!("API error: {}", status)));
        }

        let payload: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ScoutError::ApiParse(e.to_string()))?;

        let reply = payload.into_reply()?;
        tracing::debug!(
            chars = reply.text.len(),
            sources = reply.grounding_chunks.len(),
            "Gemini APIレスポンス受信"
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::from_bytes;

    fn sample_image() -> CapturedImage {
        from_bytes("salt.jpg".into(), b"\xff\xd8\xff\xe0\0\x10JFIF\0".to_vec(), 1024).unwrap()
    }

    #[test]
    fn test_price_request_serialize() {
        let request = build_price_request(&sample_image());
        let json = serde_json::to_value(&request).expect("シリアライズ失敗");

        assert_eq!(json["tools"][0]["google_search"], serde_json::json!({}));
        assert!(json.get("generationConfig").is_none());

        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["inline_data"]["mime_type"], "image/jpeg");
        assert!(parts[0]["inline_data"]["data"].as_str().unwrap().starts_with("/9j/"));
        assert!(parts[1]["text"].as_str().unwrap().contains("NUMERIC_WEIGHT:"));
    }

    #[test]
    fn test_ingredient_request_serialize() {
        let request = build_ingredient_request(&sample_image());
        let json = serde_json::to_string(&request).expect("シリアライズ失敗");

        assert!(json.contains("\"generationConfig\":{\"responseMimeType\":\"application/json\"}"));
        assert!(!json.contains("\"tools\""));
    }

    #[test]
    fn test_response_into_reply() {
        let json = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "PRODUCT_NAME: Maggi\n"}, {"text": "BRAND: Nestle"}]},
                "groundingMetadata": {
                    "groundingChunks": [
                        {"web": {"uri": "https://www.bigbasket.com/maggi", "title": "bigbasket.com"}},
                        {"retrievedContext": {"uri": "gs://x"}}
                    ]
                }
            }]
        }"#;

        let response: GeminiResponse = serde_json::from_str(json).expect("デシリアライズ失敗");
        let reply = response.into_reply().unwrap();
        assert_eq!(reply.text, "PRODUCT_NAME: Maggi\nBRAND: Nestle");
        assert_eq!(reply.grounding_chunks.len(), 2);
        assert!(reply.grounding_chunks[1].web.is_none());
    }

    #[test]
    fn test_response_without_grounding() {
        let json = r#"{"candidates": [{"content": {"parts": [{"text": "{}"}]}}]}"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        let reply = response.into_reply().unwrap();
        assert_eq!(reply.text, "{}");
        assert!(reply.grounding_chunks.is_empty());
    }

    #[test]
    fn test_response_without_candidates() {
        let response: GeminiResponse = serde_json::from_str(r#"{"promptFeedback": {}}"#).unwrap();
        assert!(matches!(response.into_reply(), Err(ScoutError::ApiParse(_))));
    }

    #[test]
    fn test_endpoint() {
        let client = GeminiClient::new(
            "key".into(),
            "gemini-3-flash-preview".into(),
            "https://example.test/v1beta/".into(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-3-flash-preview:generateContent"
        );
    }
}
