//! 共有用テキスト生成

use crate::parser::clean_text;
use crate::state::ViewState;
use crate::types::ScoutResult;

/// 共有時のアプリ名
pub const APP_NAME: &str = "Kirana Scout";

/// 解析結果から共有テキストを作る
pub fn build_share_text(result: &ScoutResult) -> String {
    match result {
        ScoutResult::Price(product) => format!(
            "Product: {}\nRate: {}\nAI Advice: {}\n\nChecked via {}!",
            clean_text(&product.product_name),
            clean_text(&product.current_market_price),
            clean_text(&product.ai_advice),
            APP_NAME,
        ),
        ScoutResult::Health(health) => format!(
            "Product: {}\nHealth Advice: {}\nShould Consume: {}",
            health.product_name, health.health_advice, health.should_consume,
        ),
    }
}

/// 現在の画面状態から共有テキストを作る。結果がなければNone
pub fn share_text_for(state: &ViewState) -> Option<String> {
    state.result().map(build_share_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IngredientResult, ProductResult};

    #[test]
    fn test_price_share_text_is_cleaned() {
        let result = ScoutResult::Price(ProductResult {
            product_name: "**Maggi**".to_string(),
            current_market_price: "₹14".to_string(),
            ai_advice: "### Abhi le lo".to_string(),
            ..Default::default()
        });
        assert_eq!(
            build_share_text(&result),
            "Product: Maggi\nRate: ₹14\nAI Advice: Abhi le lo\n\nChecked via Kirana Scout!"
        );
    }

    #[test]
    fn test_health_share_text() {
        let result = ScoutResult::Health(IngredientResult {
            product_name: "Bourbon".to_string(),
            health_advice: "Sugar zyada hai".to_string(),
            should_consume: "Moderate".to_string(),
            ..Default::default()
        });
        assert_eq!(
            build_share_text(&result),
            "Product: Bourbon\nHealth Advice: Sugar zyada hai\nShould Consume: Moderate"
        );
    }

    #[test]
    fn test_nothing_to_share_when_idle() {
        assert!(share_text_for(&ViewState::default()).is_none());
    }
}
