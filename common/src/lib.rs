//! Kirana Scout Common Library
//!
//! CLIと対話セッションで共有される型と純粋ロジック:
//! 正規化（parser）、画面状態（state）、価格計算、フィードバック検証

pub mod types;
pub mod error;
pub mod parser;
pub mod prompts;
pub mod pricing;
pub mod state;
pub mod feedback;
pub mod share;

pub use types::{
    CompositionItem, GroundingChunk, ImageRef, IngredientResult, PriceSource, ProductResult,
    ScoutMode, ScoutResult, TimingRecommendation, WebSource,
};
pub use error::{Error, Result};
pub use parser::{
    clean_text, collect_sources, extract_field, parse_ingredient_response, parse_price_response,
};
pub use prompts::{build_ingredient_prompt, build_price_prompt};
pub use pricing::{compute_price, format_price, parse_quantity};
pub use state::{reduce, Event, Phase, RequestTicket, ViewState};
pub use feedback::{format_feedback_message, FeedbackError, FeedbackForm};
pub use share::{build_share_text, share_text_for};
