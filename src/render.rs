//! 端末表示
//!
//! 装飾文字の除去（clean_text）は抽出時ではなくここで行う。

use crate::config::Theme;
use dialoguer::console::Style;
use kirana_scout_common::{
    clean_text, format_price, IngredientResult, Phase, ProductResult, ScoutMode, ScoutResult,
    TimingRecommendation, ViewState,
};
use std::fmt::Write as _;

/// テーマごとの配色
struct Palette {
    accent: Style,
    good: Style,
    warn: Style,
    muted: Style,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                accent: Style::new().blue().bold(),
                good: Style::new().green(),
                warn: Style::new().red(),
                muted: Style::new().black().dim(),
            },
            Theme::Dark => Self {
                accent: Style::new().cyan().bright().bold(),
                good: Style::new().green().bright(),
                warn: Style::new().yellow().bright(),
                muted: Style::new().white().dim(),
            },
        }
    }
}

fn idle_headline(mode: ScoutMode) -> (&'static str, &'static str) {
    match mode {
        ScoutMode::PriceScout => (
            "Product ki photo khicho, asli rate jano.",
            "Blinkit, Zepto aur market ke sahi rate ka pata lagayein.",
        ),
        ScoutMode::HealthScout => (
            "Product ki photo khicho, asli ingredients jano.",
            "Isme kya pada hai aur ye kitna healthy hai, sab jano.",
        ),
    }
}

/// 画面状態を文字列に描画
pub fn render_state(state: &ViewState, theme: Theme) -> String {
    let palette = Palette::for_theme(theme);
    let mut out = String::new();

    let _ = writeln!(out, "{}", palette.accent.apply_to(format!("== {} ==", state.mode().title())));

    match state.phase() {
        Phase::Idle => {
            let (headline, sub) = idle_headline(state.mode());
            let _ = writeln!(out, "{}", headline);
            let _ = writeln!(out, "{}", palette.muted.apply_to(sub));
        }
        Phase::Loading { image, .. } => {
            let _ = writeln!(out, "📸 {} analyze ho raha hai...", image.file_name);
        }
        Phase::Error { image, message } => {
            let _ = writeln!(out, "📸 {}", image.file_name);
            let _ = writeln!(out, "{}", palette.warn.apply_to(format!("⚠ {}", message)));
            let _ = writeln!(out, "{}", palette.muted.apply_to("Dobara try karne ke liye `reset` likhein."));
        }
        Phase::Result { image, result, quantity } => {
            let _ = writeln!(out, "📸 {}", image.file_name);
            match result {
                ScoutResult::Price(product) => render_price(&mut out, product, *quantity, &palette),
                ScoutResult::Health(health) => render_health(&mut out, health, &palette),
            }
        }
    }

    out
}

fn render_price(out: &mut String, product: &ProductResult, quantity: f64, palette: &Palette) {
    let _ = writeln!(out, "{}", palette.muted.apply_to(clean_text(&product.brand)));
    let _ = writeln!(out, "{}", palette.accent.apply_to(clean_text(&product.product_name)));

    let timing = match product.timing_recommendation {
        TimingRecommendation::BuyNow => palette.good.apply_to("✅ BUY NOW"),
        TimingRecommendation::Wait => palette.warn.apply_to("⏳ WAIT"),
    };
    let _ = writeln!(out, "{}", timing);

    let _ = writeln!(out, "\nMarket Rate: {}", clean_text(&product.current_market_price));
    if !product.estimated_weight.is_empty() {
        let _ = writeln!(out, "Weight: {}", clean_text(&product.estimated_weight));
    }

    let price = kirana_scout_common::compute_price(product, quantity);
    let _ = writeln!(out, "\n-- Quantity Calculator --");
    let _ = writeln!(
        out,
        "{}{} = ₹{}",
        quantity,
        product.base_weight_unit,
        format_price(price)
    );
    let _ = writeln!(
        out,
        "{}",
        palette.muted.apply_to(format!(
            "Original: {}{} for ₹{}",
            product.base_weight_value, product.base_weight_unit, product.base_price_value
        ))
    );

    let _ = writeln!(out, "\nAI Advice: \"{}\"", clean_text(&product.ai_advice));

    if let Some(official) = &product.official_price {
        let _ = writeln!(out, "Online Apps: {}", clean_text(official));
    }
    if let Some(photo) = &product.detected_price_in_photo {
        let _ = writeln!(out, "Photo MRP: {}", clean_text(photo));
    }

    if !product.summary.is_empty() {
        let _ = writeln!(out, "\n{}", clean_text(&product.summary));
    }

    if !product.sources.is_empty() {
        let _ = writeln!(out, "\nSources:");
        for source in &product.sources {
            let _ = writeln!(out, "  - {} {}", source.title, palette.muted.apply_to(&source.uri));
        }
    }
}

fn render_health(out: &mut String, health: &IngredientResult, palette: &Palette) {
    let _ = writeln!(out, "{}", palette.muted.apply_to(&health.brand));
    let _ = writeln!(out, "{}", palette.accent.apply_to(&health.product_name));

    if !health.should_consume.is_empty() {
        let _ = writeln!(out, "Khana chahiye? {}", health.should_consume);
    }

    if !health.ingredients.is_empty() {
        let _ = writeln!(out, "\nIngredients:");
        for ingredient in &health.ingredients {
            let _ = writeln!(out, "  - {}", ingredient);
        }
    }

    if !health.composition.is_empty() {
        let _ = writeln!(out, "\nComposition:");
        let width = health
            .composition
            .iter()
            .map(|c| c.item.chars().count())
            .max()
            .unwrap_or(0);
        for entry in &health.composition {
            let _ = writeln!(out, "  {:<width$}  {}", entry.item, entry.amount, width = width);
        }
    }

    if !health.health_advice.is_empty() {
        let _ = writeln!(out, "\nHealth Advice: {}", health.health_advice);
    }
    if !health.frequency_advice.is_empty() {
        let _ = writeln!(out, "Kitna / Kab: {}", health.frequency_advice);
    }
    if !health.nutritional_highlights.is_empty() {
        let _ = writeln!(out, "Highlights: {}", health.nutritional_highlights);
    }
}
