use crate::config::Theme;
use clap::{Parser, Subcommand};
use kirana_scout_common::ScoutMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kirana-scout")]
#[command(about = "商品写真AI解析ツール（価格チェック・成分チェック）", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 商品写真を1枚解析して結果を表示
    Scan {
        /// 画像ファイルのパス (jpeg/png/webp)
        #[arg(required = true)]
        image: PathBuf,

        /// 解析モード (price/health)
        #[arg(short, long, default_value = "price")]
        mode: ScoutMode,

        /// 価格計算の数量（基準重量と同じ単位）
        #[arg(short, long)]
        quantity: Option<String>,

        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,

        /// シェア用テキストも出力
        #[arg(long)]
        share: bool,
    },

    /// 対話セッション（撮影→解析→数量計算→シェア）
    Session {
        /// 開始モード (price/health)
        #[arg(short, long, default_value = "price")]
        mode: ScoutMode,
    },

    /// フィードバックを送信
    Feedback {
        /// Gmailアドレス（省略時は入力を求める）
        #[arg(short, long)]
        email: Option<String>,

        /// メッセージ（省略時は入力を求める）
        #[arg(long)]
        message: Option<String>,

        /// 利用中のモード
        #[arg(short, long, default_value = "price")]
        mode: ScoutMode,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// Telegram Botトークンを設定
        #[arg(long)]
        set_bot_token: Option<String>,

        /// TelegramチャットIDを設定
        #[arg(long)]
        set_chat_id: Option<String>,

        /// 表示テーマ (light/dark)
        #[arg(long)]
        theme: Option<Theme>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// `scan` の数量指定は価格チェックでのみ使える
pub fn check_scan_quantity(mode: ScoutMode, quantity: Option<&str>) -> Result<(), String> {
    match (mode, quantity) {
        (ScoutMode::HealthScout, Some(_)) => Err(
            "--quantity は価格チェック (--mode price) でのみ使えます".to_string(),
        ),
        _ => Ok(()),
    }
}
