//! 画像解析
//!
//! Gemini APIを呼び出し、レスポンスを正規化して型付きの結果を返す。
//! 失敗の原因（通信・APIエラー・パース失敗）はログに残し、呼び出し側には
//! モードごとの「解析失敗」エラーだけを返す。

mod gemini;

pub use gemini::{build_ingredient_request, build_price_request, GeminiClient, GeminiReply, GeminiRequest};

use crate::capture::CapturedImage;
use crate::error::{Result, ScoutError};
use kirana_scout_common::{
    parse_ingredient_response, parse_price_response, IngredientResult, ProductResult, ScoutMode,
    ScoutResult,
};

/// 価格チェック
pub async fn analyze_price(client: &GeminiClient, image: &CapturedImage) -> Result<ProductResult> {
    let reply = client.generate(&build_price_request(image)).await?;
    Ok(parse_price_response(&reply.text, &reply.grounding_chunks))
}

/// 成分チェック
pub async fn analyze_ingredients(
    client: &GeminiClient,
    image: &CapturedImage,
) -> Result<IngredientResult> {
    let reply = client.generate(&build_ingredient_request(image)).await?;
    ingredients_from_reply(&reply)
}

fn ingredients_from_reply(reply: &GeminiReply) -> Result<IngredientResult> {
    Ok(parse_ingredient_response(&reply.text)?)
}

/// モードに応じて解析する
///
/// エラーは常に `ScoutError::AnalysisFailed(mode)` になる
pub async fn analyze(
    client: &GeminiClient,
    mode: ScoutMode,
    image: &CapturedImage,
) -> Result<ScoutResult> {
    let outcome = match mode {
        ScoutMode::PriceScout => analyze_price(client, image).await.map(ScoutResult::Price),
        ScoutMode::HealthScout => analyze_ingredients(client, image)
            .await
            .map(ScoutResult::Health),
    };

    outcome.map_err(|e| {
        tracing::error!(mode = %mode, file = %image.reference.file_name, "解析失敗: {}", e);
        ScoutError::AnalysisFailed(mode)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredients_from_reply() {
        let reply = GeminiReply {
            text: r#"{"productName": "Parle-G", "ingredients": ["Wheat Flour", "Sugar"]}"#.into(),
            grounding_chunks: Vec::new(),
        };
        let result = ingredients_from_reply(&reply).unwrap();
        assert_eq!(result.product_name, "Parle-G");
        assert_eq!(result.ingredients.len(), 2);
    }

    #[test]
    fn test_ingredients_parse_error_keeps_cause() {
        let reply = GeminiReply {
            text: r#"{"productName": "#.into(),
            grounding_chunks: Vec::new(),
        };
        let err = ingredients_from_reply(&reply).unwrap_err();
        assert!(matches!(
            err,
            ScoutError::Common(kirana_scout_common::Error::Json(_))
        ));
    }
}
