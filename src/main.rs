use anyhow::Context;
use clap::Parser;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use kirana_scout::{analyzer, capture, cli, config, feedback, render, session};
use kirana_scout_common::{parse_quantity, reduce, share_text_for, Event, FeedbackForm, ViewState};
use cli::{Cli, Commands};
use config::Config;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "kirana_scout=debug,kirana_scout_common=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let mut config = Config::load().context("設定ファイルの読み込みに失敗")?;

    match cli.command {
        Commands::Scan { image, mode, quantity, json, share } => {
            cli::check_scan_quantity(mode, quantity.as_deref()).map_err(anyhow::Error::msg)?;
            let client = analyzer::GeminiClient::from_config(&config)?;
            let captured = capture::load_image(&image, config.max_image_bytes)?;

            let mut state = reduce(ViewState::new(mode), Event::ImageCaptured(captured.reference.clone()));
            let ticket = state
                .pending_ticket()
                .cloned()
                .context("解析リクエストを開始できません")?;

            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
                spinner.set_style(style);
            }
            spinner.set_message(format!("📸 {} analyze ho raha hai...", captured.reference.file_name));
            spinner.enable_steady_tick(Duration::from_millis(120));

            let outcome = analyzer::analyze(&client, mode, &captured).await;
            spinner.finish_and_clear();

            state = match outcome {
                Ok(result) => reduce(state, Event::AnalysisSucceeded { ticket, result }),
                Err(e) => reduce(state, Event::AnalysisFailed { ticket, message: e.to_string() }),
            };
            if let Some(input) = quantity {
                state = reduce(state, Event::QuantityChanged(parse_quantity(&input)));
            }

            if let Some(message) = state.error() {
                anyhow::bail!("{}", message);
            }

            if json {
                let result = state.result().context("解析結果がありません")?;
                println!("{}", serde_json::to_string_pretty(result)?);
            } else {
                print!("{}", render::render_state(&state, config.theme));
            }

            if share {
                if let Some(text) = share_text_for(&state) {
                    println!("\n{}", text);
                }
            }
        }

        Commands::Session { mode } => {
            session::run_session(config, mode).await?;
        }

        Commands::Feedback { email, message, mode } => {
            let email = match email {
                Some(email) => email,
                None => Input::<String>::new().with_prompt("Aapka Gmail").interact_text()?,
            };
            let message = match message {
                Some(message) => message,
                None => Input::<String>::new().with_prompt("Feedback").interact_text()?,
            };

            let form = FeedbackForm::new(email, message);
            feedback::submit_feedback(&config, &form, mode).await?;
            println!("🙏 Shukriya! Aapka feedback mil gaya.");
        }

        Commands::Config { set_api_key, set_bot_token, set_chat_id, theme, show } => {
            let mut changed = false;

            if let Some(key) = set_api_key {
                config.api_key = Some(key);
                changed = true;
                println!("✔ APIキーを設定しました");
            }
            if let Some(token) = set_bot_token {
                config.telegram_bot_token = Some(token);
                changed = true;
                println!("✔ Telegram Botトークンを設定しました");
            }
            if let Some(chat_id) = set_chat_id {
                config.telegram_chat_id = Some(chat_id);
                changed = true;
                println!("✔ TelegramチャットIDを設定しました");
            }
            if let Some(theme) = theme {
                config.theme = theme;
                changed = true;
                println!("✔ テーマ: {}", theme);
            }

            if changed {
                config.save().context("設定ファイルの保存に失敗")?;
            }

            if show || !changed {
                println!("設定ファイル: {}", Config::config_path()?.display());
                println!("モデル: {}", config.model);
                println!("APIキー: {}", mask(config.api_key.as_deref()));
                println!("Telegram Bot: {}", mask(config.telegram_bot_token.as_deref()));
                println!(
                    "Telegram Chat: {}",
                    config.telegram_chat_id.as_deref().unwrap_or("(未設定)")
                );
                println!("テーマ: {}", config.theme);
                println!("タイムアウト: {}秒", config.timeout_seconds);
            }
        }
    }

    Ok(())
}

fn mask(secret: Option<&str>) -> String {
    match secret {
        Some(s) if s.chars().count() > 4 => {
            let tail: String = s.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
            format!("****{}", tail)
        }
        Some(_) => "****".to_string(),
        None => "(未設定)".to_string(),
    }
}
