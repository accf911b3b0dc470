//! APIレスポンスパーサー（正規化）
//!
//! AIのレスポンスを型付きの結果に変換する:
//! - 価格チェック: `KEY: value` 形式のラベル付きテキスト
//! - 成分チェック: IngredientResult形式のJSONオブジェクト
//!
//! 欠損・不正なフィールドはエラーにせずデフォルト値で埋める。

use crate::error::{Error, Result};
use crate::types::{
    CompositionItem, GroundingChunk, IngredientResult, PriceSource, ProductResult,
    TimingRecommendation,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

lazy_static! {
    /// parseFloat相当: 先頭の数値部分のみ
    static ref LEADING_NUMBER: Regex =
        Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").unwrap();
}

/// 価格チェックのレスポンスキー
pub mod keys {
    pub const PRODUCT_NAME: &str = "PRODUCT_NAME";
    pub const BRAND: &str = "BRAND";
    pub const WEIGHT: &str = "WEIGHT";
    pub const NUMERIC_WEIGHT: &str = "NUMERIC_WEIGHT";
    pub const WEIGHT_UNIT: &str = "WEIGHT_UNIT";
    pub const NUMERIC_PRICE: &str = "NUMERIC_PRICE";
    pub const PHOTO_PRICE: &str = "PHOTO_PRICE";
    pub const MARKET_PRICE: &str = "MARKET_PRICE";
    pub const OFFICIAL_PRICE: &str = "OFFICIAL_PRICE";
    pub const TIMING: &str = "TIMING";
    pub const SUMMARY: &str = "SUMMARY";
    pub const ADVICE: &str = "ADVICE";
}

/// キーの前に付くことがある装飾文字（箇条書き・強調・見出し）
const LEADING_MARKUP: &[char] = &['*', '#', '>', '-'];

/// 重量単位が取れなかった場合の単位
const DEFAULT_WEIGHT_UNIT: &str = "g";

/// ラベル付きテキストから指定キーの値を抽出
///
/// 行頭の `<KEY>:`（大文字小文字を区別しない）に一致する最初の行の残りを返す。
/// 見つからない場合は空文字。
///
/// # Examples
/// ```
/// use kirana_scout_common::extract_field;
///
/// let text = "PRODUCT_NAME: Maggi Noodles\nbrand:  Nestle ";
/// assert_eq!(extract_field(text, "PRODUCT_NAME"), "Maggi Noodles");
/// assert_eq!(extract_field(text, "BRAND"), "Nestle");
/// assert_eq!(extract_field(text, "WEIGHT"), "");
/// ```
pub fn extract_field(response: &str, key: &str) -> String {
    response
        .lines()
        .find_map(|line| match_field_line(line, key))
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

fn match_field_line<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let body = line.trim_start_matches(|c: char| c.is_whitespace() || LEADING_MARKUP.contains(&c));
    let head = body.get(..key.len())?;
    if !head.eq_ignore_ascii_case(key) {
        return None;
    }

    // "**BRAND**: x" と "**BRAND:** x" の両方を許容
    let rest = &body[key.len()..];
    let rest = rest.strip_prefix("**").unwrap_or(rest);
    let value = rest.trim_start_matches([' ', '\t']).strip_prefix(':')?;
    Some(value.strip_prefix("**").unwrap_or(value))
}

/// 先頭の数値部分をパース（"500g" → 500）
pub fn parse_leading_number(text: &str) -> Option<f64> {
    LEADING_NUMBER
        .find(text.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// 基準重量。単価計算の分母になるため、正の値以外は1にする
pub fn parse_weight_value(raw: &str) -> f64 {
    parse_leading_number(raw)
        .filter(|v| *v > 0.0)
        .unwrap_or(1.0)
}

/// 基準価格。負の値・数値以外は0
pub fn parse_price_value(raw: &str) -> f64 {
    parse_leading_number(raw)
        .filter(|v| *v >= 0.0)
        .unwrap_or(0.0)
}

/// TIMINGフィールドを推奨に変換
///
/// "WAIT"を含めばWAIT、それ以外（空・不明な値を含む）はBUY_NOW
pub fn parse_timing(raw: &str) -> TimingRecommendation {
    if raw.to_uppercase().contains("WAIT") {
        TimingRecommendation::Wait
    } else {
        TimingRecommendation::BuyNow
    }
}

/// グラウンディング情報から参照元を抽出（webのみ、順序維持）
pub fn collect_sources(chunks: &[GroundingChunk]) -> Vec<PriceSource> {
    chunks
        .iter()
        .filter_map(|chunk| chunk.web.as_ref())
        .map(|web| PriceSource {
            title: web.title.clone(),
            uri: web.uri.clone(),
        })
        .collect()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// 価格チェックのレスポンスをパース
///
/// 失敗しない。欠損フィールドは空文字、数値はデフォルト値になる。
pub fn parse_price_response(response: &str, chunks: &[GroundingChunk]) -> ProductResult {
    let field = |key: &str| extract_field(response, key);

    let unit = field(keys::WEIGHT_UNIT);

    ProductResult {
        product_name: field(keys::PRODUCT_NAME),
        brand: field(keys::BRAND),
        estimated_weight: field(keys::WEIGHT),
        base_weight_value: parse_weight_value(&field(keys::NUMERIC_WEIGHT)),
        base_weight_unit: if unit.is_empty() {
            DEFAULT_WEIGHT_UNIT.to_string()
        } else {
            unit
        },
        base_price_value: parse_price_value(&field(keys::NUMERIC_PRICE)),
        detected_price_in_photo: non_empty(field(keys::PHOTO_PRICE)),
        current_market_price: field(keys::MARKET_PRICE),
        official_price: non_empty(field(keys::OFFICIAL_PRICE)),
        summary: field(keys::SUMMARY),
        ai_advice: field(keys::ADVICE),
        timing_recommendation: parse_timing(&field(keys::TIMING)),
        sources: collect_sources(chunks),
    }
}

/// レスポンスからJSONオブジェクト部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 最初の `{` から最後の `}` まで
pub fn extract_json_object(response: &str) -> Option<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Some(response[start..end].trim());
        }
    }

    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end >= start {
        Some(&response[start..=end])
    } else {
        None
    }
}

/// 成分チェックのレスポンスをパース
///
/// 空のレスポンスは `{}` として扱う。JSONとして壊れている場合のみエラー。
pub fn parse_ingredient_response(response: &str) -> Result<IngredientResult> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Ok(IngredientResult::default());
    }

    let json_str = extract_json_object(trimmed).unwrap_or(trimmed);
    let value: Value = serde_json::from_str(json_str)?;

    let obj = match value {
        Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
        other => other,
    };

    let Some(map) = obj.as_object() else {
        return Err(Error::Parse("JSONオブジェクトが見つかりません".into()));
    };

    Ok(IngredientResult {
        product_name: get_string(map, "productName"),
        brand: get_string(map, "brand"),
        ingredients: get_string_list(map, "ingredients"),
        composition: get_composition(map, "composition"),
        health_advice: get_string(map, "healthAdvice"),
        should_consume: get_string(map, "shouldConsume"),
        frequency_advice: get_string(map, "frequencyAdvice"),
        nutritional_highlights: get_string(map, "nutritionalHighlights"),
    })
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(value_to_text)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => Some(other.to_string()),
    }
}

fn get_string(map: &Map<String, Value>, key: &str) -> String {
    map.get(key).and_then(value_to_text).unwrap_or_default()
}

fn get_string_list(map: &Map<String, Value>, key: &str) -> Vec<String> {
    match map.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(value_to_text)
            .filter(|s| !s.trim().is_empty())
            .collect(),
        // "Sugar, Salt" のようにカンマ区切りで返ってくることがある
        Some(Value::String(s)) => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn get_composition(map: &Map<String, Value>, key: &str) -> Vec<CompositionItem> {
    let Some(Value::Array(items)) = map.get(key) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|entry| match entry {
            Value::Object(obj) => Some(CompositionItem {
                item: get_string(obj, "item"),
                amount: get_string(obj, "amount"),
            }),
            Value::String(s) => {
                let (item, amount) = s.split_once(':').unwrap_or((s.as_str(), ""));
                Some(CompositionItem {
                    item: item.trim().to_string(),
                    amount: amount.trim().to_string(),
                })
            }
            _ => None,
        })
        .collect()
}

/// 表示用に装飾文字（`**` と `###`）を除去して前後の空白を削る
///
/// 除去で新たなマーカーができる場合（"*###*" → "**"）も消えるまで繰り返すので、
/// `clean_text(&clean_text(s)) == clean_text(s)` が常に成り立つ。
pub fn clean_text(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = current.replace("**", "").replace("###", "");
        if next == current {
            break;
        }
        current = next;
    }
    current.trim().to_string()
}
