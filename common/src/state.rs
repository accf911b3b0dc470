//! 画面状態の状態機械
//!
//! 状態は `reduce(state, event) -> state` でのみ遷移する。
//!
//! | 遷移元 | イベント | 遷移先 |
//! |---|---|---|
//! | Idle | 画像撮影 | Loading |
//! | Loading | 解析成功 | Result |
//! | Loading | 解析失敗 | Error |
//! | Idle / Loading / Result / Error | リセット | Idle（同じモード） |
//! | すべて | モード切替 | Idle（新しいモード） |
//!
//! 解析リクエストは発行時に `RequestTicket` を受け取り、完了時にチケットが
//! 現在のLoading状態と一致する場合のみ結果を反映する。モード切替やリセット後に
//! 届いた古いレスポンスは黙って捨てられる（通信自体はキャンセルしない）。

use crate::pricing::{clamp_quantity, compute_price};
use crate::types::{ImageRef, IngredientResult, ProductResult, ScoutMode, ScoutResult};

/// 解析リクエストの発行時スナップショット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    /// 撮影ごとに増える連番
    pub generation: u64,
    pub mode: ScoutMode,
    pub image_digest: String,
}

/// 現在のフェーズ
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Loading {
        image: ImageRef,
        ticket: RequestTicket,
    },
    Result {
        image: ImageRef,
        result: ScoutResult,
        /// 価格計算用の数量（価格チェックのみ使用）
        quantity: f64,
    },
    Error {
        image: ImageRef,
        message: String,
    },
}

/// 状態遷移を引き起こすイベント
#[derive(Debug, Clone)]
pub enum Event {
    ImageCaptured(ImageRef),
    AnalysisSucceeded {
        ticket: RequestTicket,
        result: ScoutResult,
    },
    AnalysisFailed {
        ticket: RequestTicket,
        message: String,
    },
    QuantityChanged(f64),
    Reset,
    SwitchMode(ScoutMode),
}

/// 画面状態
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    mode: ScoutMode,
    phase: Phase,
    generation: u64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(ScoutMode::PriceScout)
    }
}

impl ViewState {
    pub fn new(mode: ScoutMode) -> Self {
        Self {
            mode,
            phase: Phase::Idle,
            generation: 0,
        }
    }

    pub fn mode(&self) -> ScoutMode {
        self.mode
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn image(&self) -> Option<&ImageRef> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Loading { image, .. }
            | Phase::Result { image, .. }
            | Phase::Error { image, .. } => Some(image),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading { .. })
    }

    pub fn result(&self) -> Option<&ScoutResult> {
        match &self.phase {
            Phase::Result { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn price_result(&self) -> Option<&ProductResult> {
        match self.result() {
            Some(ScoutResult::Price(result)) => Some(result),
            _ => None,
        }
    }

    pub fn health_result(&self) -> Option<&IngredientResult> {
        match self.result() {
            Some(ScoutResult::Health(result)) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    /// 発行中リクエストのチケット
    pub fn pending_ticket(&self) -> Option<&RequestTicket> {
        match &self.phase {
            Phase::Loading { ticket, .. } => Some(ticket),
            _ => None,
        }
    }

    /// チケットが現在のLoading状態と一致するか
    pub fn accepts(&self, ticket: &RequestTicket) -> bool {
        self.pending_ticket() == Some(ticket)
    }

    /// 価格計算用の数量（価格チェックの結果表示中のみ）
    pub fn quantity(&self) -> Option<f64> {
        match &self.phase {
            Phase::Result {
                result: ScoutResult::Price(_),
                quantity,
                ..
            } => Some(*quantity),
            _ => None,
        }
    }

    /// 数量に応じた価格
    pub fn computed_price(&self) -> Option<f64> {
        let result = self.price_result()?;
        let quantity = self.quantity()?;
        Some(compute_price(result, quantity))
    }

    fn idle(mode: ScoutMode, generation: u64) -> Self {
        Self {
            mode,
            phase: Phase::Idle,
            generation,
        }
    }
}

/// 状態遷移関数
pub fn reduce(state: ViewState, event: Event) -> ViewState {
    let ViewState {
        mode,
        phase,
        generation,
    } = state;

    match (phase, event) {
        // モード切替はどの状態からでもIdleへ。画像・結果・エラーを破棄する
        (_, Event::SwitchMode(new_mode)) => ViewState::idle(new_mode, generation),

        (_, Event::Reset) => ViewState::idle(mode, generation),

        (Phase::Idle, Event::ImageCaptured(image)) => {
            let generation = generation + 1;
            let ticket = RequestTicket {
                generation,
                mode,
                image_digest: image.digest.clone(),
            };
            ViewState {
                mode,
                phase: Phase::Loading { image, ticket },
                generation,
            }
        }

        (Phase::Loading { image, ticket }, Event::AnalysisSucceeded { ticket: done, result })
            if ticket == done && result.mode() == mode =>
        {
            let quantity = match &result {
                ScoutResult::Price(product) => product.base_weight_value,
                ScoutResult::Health(_) => 0.0,
            };
            ViewState {
                mode,
                phase: Phase::Result {
                    image,
                    result,
                    quantity,
                },
                generation,
            }
        }

        (Phase::Loading { image, ticket }, Event::AnalysisFailed { ticket: done, message })
            if ticket == done =>
        {
            ViewState {
                mode,
                phase: Phase::Error { image, message },
                generation,
            }
        }

        (
            Phase::Result {
                image,
                result: result @ ScoutResult::Price(_),
                ..
            },
            Event::QuantityChanged(quantity),
        ) => ViewState {
            mode,
            phase: Phase::Result {
                image,
                result,
                quantity: clamp_quantity(quantity),
            },
            generation,
        },

        // 古いレスポンス・Idle以外での撮影などは無視
        (phase, _) => ViewState {
            mode,
            phase,
            generation,
        },
    }
}
