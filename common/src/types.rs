//! 解析結果の型定義
//!
//! CLIとセッションで共有される型:
//! - ScoutMode: 価格チェック / 成分チェックのモード
//! - ProductResult: 価格チェックの出力
//! - IngredientResult: 成分チェックの出力
//! - ScoutResult: モードと結果の組（型でモード整合性を保証）

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 解析モード
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoutMode {
    /// 価格チェック（Kirana Scout）
    #[default]
    PriceScout,
    /// 成分・健康チェック（Health Scout）
    HealthScout,
}

impl ScoutMode {
    /// 画面タイトル
    pub fn title(&self) -> &'static str {
        match self {
            ScoutMode::PriceScout => "Kirana Scout",
            ScoutMode::HealthScout => "Health Scout",
        }
    }

    /// 識別子（フィードバック送信時のモード表記）
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoutMode::PriceScout => "PRICE_SCOUT",
            ScoutMode::HealthScout => "HEALTH_SCOUT",
        }
    }

    /// 解析失敗時のユーザー向けメッセージ
    pub fn failure_message(&self) -> &'static str {
        match self {
            ScoutMode::PriceScout => {
                "Product analyze nahi ho paya. Please ek saaf photo click karein."
            }
            ScoutMode::HealthScout => {
                "Ingredients scan nahi ho paye. Please label ki saaf photo click karein."
            }
        }
    }
}

impl fmt::Display for ScoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "price" | "price-scout" | "p" => Ok(ScoutMode::PriceScout),
            "health" | "health-scout" | "h" => Ok(ScoutMode::HealthScout),
            _ => Err(format!("Unknown mode: {}. Use price or health", s)),
        }
    }
}

/// 購入タイミングの推奨
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimingRecommendation {
    #[default]
    BuyNow,
    Wait,
}

impl TimingRecommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimingRecommendation::BuyNow => "BUY_NOW",
            TimingRecommendation::Wait => "WAIT",
        }
    }
}

/// 価格の参照元（Web検索の引用）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSource {
    pub title: String,
    pub uri: String,
}

/// 価格チェック結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResult {
    pub product_name: String,
    pub brand: String,
    /// 表示用の重量（例: "500g"）
    pub estimated_weight: String,
    /// 単価計算の分母。常に正の値
    pub base_weight_value: f64,
    pub base_weight_unit: String,
    pub base_price_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_price_in_photo: Option<String>,
    pub current_market_price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub official_price: Option<String>,
    pub summary: String,
    pub ai_advice: String,
    pub timing_recommendation: TimingRecommendation,
    #[serde(default)]
    pub sources: Vec<PriceSource>,
}

impl Default for ProductResult {
    fn default() -> Self {
        Self {
            product_name: String::new(),
            brand: String::new(),
            estimated_weight: String::new(),
            base_weight_value: 1.0,
            base_weight_unit: "g".into(),
            base_price_value: 0.0,
            detected_price_in_photo: None,
            current_market_price: String::new(),
            official_price: None,
            summary: String::new(),
            ai_advice: String::new(),
            timing_recommendation: TimingRecommendation::BuyNow,
            sources: Vec::new(),
        }
    }
}

/// 成分表の1行（例: Sugar / 20g）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionItem {
    pub item: String,
    pub amount: String,
}

/// 成分チェック結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IngredientResult {
    pub product_name: String,
    pub brand: String,
    /// 検出順
    pub ingredients: Vec<String>,
    pub composition: Vec<CompositionItem>,
    pub health_advice: String,
    pub should_consume: String,
    pub frequency_advice: String,
    pub nutritional_highlights: String,
}

/// モードに対応した解析結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "result")]
pub enum ScoutResult {
    #[serde(rename = "PRICE_SCOUT")]
    Price(ProductResult),
    #[serde(rename = "HEALTH_SCOUT")]
    Health(IngredientResult),
}

impl ScoutResult {
    /// この結果が属するモード
    pub fn mode(&self) -> ScoutMode {
        match self {
            ScoutResult::Price(_) => ScoutMode::PriceScout,
            ScoutResult::Health(_) => ScoutMode::HealthScout,
        }
    }
}

/// Web検索の引用元（groundingChunks[].web）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSource {
    pub uri: String,
    pub title: String,
}

/// グラウンディング情報の1要素
///
/// web以外（retrievedContext等）の要素は`web`がNoneになる
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundingChunk {
    pub web: Option<WebSource>,
}

/// 撮影画像の参照
///
/// 画像バイト列そのものは保持せず、同一性判定用のダイジェストを持つ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    /// SHA-256（hex）
    pub digest: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scout_mode_from_str() {
        assert_eq!("price".parse::<ScoutMode>(), Ok(ScoutMode::PriceScout));
        assert_eq!("PRICE_SCOUT".parse::<ScoutMode>(), Ok(ScoutMode::PriceScout));
        assert_eq!("Health-Scout".parse::<ScoutMode>(), Ok(ScoutMode::HealthScout));
        assert_eq!("h".parse::<ScoutMode>(), Ok(ScoutMode::HealthScout));
        assert!("ingredients".parse::<ScoutMode>().is_err());
    }

    #[test]
    fn test_scout_mode_serialize() {
        let json = serde_json::to_string(&ScoutMode::HealthScout).unwrap();
        assert_eq!(json, "\"HEALTH_SCOUT\"");
        assert_eq!(ScoutMode::default(), ScoutMode::PriceScout);
    }

    #[test]
    fn test_product_result_camel_case() {
        let result = ProductResult {
            product_name: "Maggi".to_string(),
            timing_recommendation: TimingRecommendation::Wait,
            ..Default::default()
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"productName\":\"Maggi\""));
        assert!(json.contains("\"timingRecommendation\":\"WAIT\""));
        assert!(json.contains("\"baseWeightValue\":1.0"));
        // 空のOptionは出力しない
        assert!(!json.contains("officialPrice"));
    }

    #[test]
    fn test_ingredient_result_defaults() {
        let result: IngredientResult = serde_json::from_str(r#"{"productName": "Bourbon"}"#).unwrap();
        assert_eq!(result.product_name, "Bourbon");
        assert!(result.ingredients.is_empty());
        assert!(result.composition.is_empty());
        assert_eq!(result.health_advice, "");
    }

    #[test]
    fn test_scout_result_mode() {
        assert_eq!(ScoutResult::Price(ProductResult::default()).mode(), ScoutMode::PriceScout);
        assert_eq!(ScoutResult::Health(IngredientResult::default()).mode(), ScoutMode::HealthScout);
    }

    #[test]
    fn test_grounding_chunk_without_web() {
        let chunk: GroundingChunk = serde_json::from_str(r#"{"retrievedContext": {"uri": "x"}}"#).unwrap();
        assert!(chunk.web.is_none());
    }
}
