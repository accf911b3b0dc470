//! プロンプト生成モジュール
//!
//! - build_price_prompt: 価格チェック用（ラベル付き行形式で回答させる）
//! - build_ingredient_prompt: 成分チェック用（JSON形式で回答させる）
//!
//! 価格チェックのキーは parser::keys と一致させること。

use crate::parser::keys;

/// 価格チェックで要求するフィールド（キー, 説明）
pub const PRICE_FIELDS: &[(&str, &str)] = &[
    (keys::PRODUCT_NAME, "[Name]"),
    (keys::BRAND, "[Brand Name]"),
    (keys::WEIGHT, "[Full Weight String, e.g., 500g]"),
    (keys::NUMERIC_WEIGHT, "[Just the number, e.g., 500]"),
    (keys::WEIGHT_UNIT, "[Just the unit, g or kg]"),
    (keys::NUMERIC_PRICE, "[The average market price as a number only, e.g., 20]"),
    (keys::PHOTO_PRICE, "[Price string in photo]"),
    (keys::MARKET_PRICE, "[Full Market price string, e.g., ₹20]"),
    (keys::OFFICIAL_PRICE, "[Price on major retail apps]"),
    (keys::TIMING, "[BUY_NOW or WAIT]"),
    (keys::SUMMARY, "[A 2-sentence summary in Hinglish]"),
    (keys::ADVICE, "[Specific advice in Hinglish]"),
];

/// 価格チェック用プロンプト
///
/// Web検索ツールと組み合わせて使う前提
pub fn build_price_prompt() -> String {
    let format_lines = PRICE_FIELDS
        .iter()
        .map(|(key, hint)| format!("{}: {}", key, hint))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Identify the Kirana (grocery) product in this image and provide pricing analysis.

IMPORTANT: Write the SUMMARY and ADVICE in Hinglish.

Tasks:
1. Identify Brand and Product Name.
2. Detect/Estimate Weight (e.g., 1kg, 500g). Extract numeric value and unit separately.
3. Detect MRP/Price if visible in photo.
4. Use Google Search to find current average market prices.
5. Decide if the user should 'BUY_NOW' or 'WAIT'.

Provide response in this exact format, one field per line:
{format_lines}
"#
    )
}

/// 成分チェック用プロンプト
///
/// responseMimeType=application/json と組み合わせて使う
pub fn build_ingredient_prompt() -> String {
    r#"Analyze the grocery product in this image specifically for its ingredients and health impact.

IMPORTANT: Provide the healthAdvice, shouldConsume, and frequencyAdvice in Hinglish.

Tasks:
1. Identify Product Name and Brand.
2. List all visible or known ingredients.
3. Breakdown the composition (e.g., Sugar: 20g, Fats: 10g).
4. Provide AI advice on health impact.
5. State clearly if it should be consumed (Yes/No/Moderate).
6. Advise on how much/how often to eat it.

Provide response in this exact JSON format:
{
  "productName": "string",
  "brand": "string",
  "ingredients": ["string"],
  "composition": [{"item": "string", "amount": "string"}],
  "healthAdvice": "string (Hinglish)",
  "shouldConsume": "string (Hinglish)",
  "frequencyAdvice": "string (Hinglish)",
  "nutritionalHighlights": "string (Hinglish)"
}
"#
    .to_string()
}
