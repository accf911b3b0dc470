//! 数量に応じた価格計算
//!
//! 単価 = basePriceValue / baseWeightValue をユーザー指定の数量に掛ける。

use crate::parser::parse_leading_number;
use crate::types::ProductResult;

/// 入力された数量をパース。不正値・負の値は0
pub fn parse_quantity(input: &str) -> f64 {
    clamp_quantity(parse_leading_number(input).unwrap_or(0.0))
}

/// 数量を0以上に丸める
pub fn clamp_quantity(quantity: f64) -> f64 {
    if quantity.is_finite() && quantity > 0.0 {
        quantity
    } else {
        0.0
    }
}

/// 単価（1単位あたりの価格）
pub fn unit_price(result: &ProductResult) -> f64 {
    // パーサー経由なら正の値だが、JSONから読み込んだ結果も受け付けるため再確認する
    let weight = if result.base_weight_value > 0.0 {
        result.base_weight_value
    } else {
        1.0
    };
    result.base_price_value / weight
}

/// 指定数量の価格
pub fn compute_price(result: &ProductResult, quantity: f64) -> f64 {
    unit_price(result) * clamp_quantity(quantity)
}

/// 表示用（小数2桁）
pub fn format_price(value: f64) -> String {
    format!("{:.2}", value)
}
