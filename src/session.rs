//! 対話セッション
//!
//! 標準入力のコマンドと解析完了通知を1つずつ状態機械に流す。
//! 解析リクエストは別タスクで実行するため、解析中もモード切替・リセットを受け付ける。
//! 古いリクエストの完了通知はチケット不一致で捨てられる。

use crate::analyzer::{self, GeminiClient};
use crate::capture::{load_image, CapturedImage};
use crate::config::Config;
use crate::error::Result;
use crate::feedback::submit_feedback;
use crate::render::render_state;
use indicatif::{ProgressBar, ProgressStyle};
use kirana_scout_common::{
    parse_quantity, reduce, share_text_for, Event, FeedbackForm, RequestTicket, ScoutMode,
    ScoutResult, ViewState,
};
use std::io::BufRead;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// セッションコマンド
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// 写真を読み込んで解析
    Capture(PathBuf),
    /// モード切替（省略時はもう一方のモード）
    SwitchMode(Option<ScoutMode>),
    Reset,
    Quantity(String),
    Share,
    Feedback,
    Theme,
    Show,
    Help,
    Quit,
    Unknown(String),
}

/// 入力行をコマンドに変換
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let (name, arg) = match line.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (line, ""),
    };

    match name.to_lowercase().as_str() {
        "" | "show" | "s" => Command::Show,
        "photo" | "p" | "capture" | "scan" if !arg.is_empty() => {
            Command::Capture(PathBuf::from(arg.trim_matches(|c| c == '"' || c == '\'')))
        }
        "mode" | "m" => {
            if arg.is_empty() {
                Command::SwitchMode(None)
            } else {
                match arg.parse::<ScoutMode>() {
                    Ok(mode) => Command::SwitchMode(Some(mode)),
                    Err(_) => Command::Unknown(line.to_string()),
                }
            }
        }
        "price" => Command::SwitchMode(Some(ScoutMode::PriceScout)),
        "health" => Command::SwitchMode(Some(ScoutMode::HealthScout)),
        "reset" | "r" | "retry" => Command::Reset,
        "qty" | "q" | "quantity" => Command::Quantity(arg.to_string()),
        "share" => Command::Share,
        "feedback" | "f" => Command::Feedback,
        "theme" | "t" => Command::Theme,
        "help" | "h" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

const HELP: &str = "\
Commands:
  photo <path>        photo load karke analyze karein
  mode [price|health] mode badlein (analysis chal raha ho tab bhi)
  reset               nayi photo ke liye wapas shuru karein
  qty <number>        quantity badal ke price dekhein
  share               result share text
  feedback            feedback bhejein
  theme               light/dark theme badlein
  show                current screen
  quit                band karein";

/// 解析タスクの完了通知
#[derive(Debug)]
pub struct Completion {
    pub ticket: RequestTicket,
    pub outcome: std::result::Result<ScoutResult, String>,
}

impl Completion {
    fn into_event(self) -> Event {
        match self.outcome {
            Ok(result) => Event::AnalysisSucceeded {
                ticket: self.ticket,
                result,
            },
            Err(message) => Event::AnalysisFailed {
                ticket: self.ticket,
                message,
            },
        }
    }
}

struct Session {
    config: Config,
    client: GeminiClient,
    state: ViewState,
    spinner: Option<ProgressBar>,
    completions: UnboundedSender<Completion>,
    /// 送信に失敗したフィードバック（再送用）
    unsent_feedback: Option<FeedbackForm>,
}

impl Session {
    fn apply(&mut self, event: Event) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, event);
        self.sync_spinner();
    }

    fn sync_spinner(&mut self) {
        match (self.state.is_loading(), self.spinner.is_some()) {
            (true, false) => {
                let spinner = ProgressBar::new_spinner();
                let template = match self.config.theme {
                    crate::config::Theme::Light => "{spinner:.blue} {msg}",
                    crate::config::Theme::Dark => "{spinner:.cyan} {msg}",
                };
                if let Ok(style) = ProgressStyle::with_template(template) {
                    spinner.set_style(style);
                }
                spinner.set_message("AI analyze kar raha hai...");
                spinner.enable_steady_tick(Duration::from_millis(120));
                self.spinner = Some(spinner);
            }
            (false, true) => {
                if let Some(spinner) = self.spinner.take() {
                    spinner.finish_and_clear();
                }
            }
            _ => {}
        }
    }

    fn print(&self, text: &str) {
        match &self.spinner {
            Some(spinner) => spinner.suspend(|| println!("{}", text)),
            None => println!("{}", text),
        }
    }

    fn print_state(&self) {
        self.print(&render_state(&self.state, self.config.theme));
    }

    fn capture(&mut self, path: PathBuf) {
        if self.state.image().is_some() {
            self.print("Pehle `reset` karein, phir nayi photo dein.");
            return;
        }

        let image = match load_image(&path, self.config.max_image_bytes) {
            Ok(image) => image,
            Err(e) => {
                self.print(&format!("⚠ {}", e));
                return;
            }
        };

        self.apply(Event::ImageCaptured(image.reference.clone()));
        if let Some(ticket) = self.state.pending_ticket().cloned() {
            self.spawn_analysis(ticket, image);
        }
        self.print_state();
    }

    fn spawn_analysis(&self, ticket: RequestTicket, image: CapturedImage) {
        let client = self.client.clone();
        let completions = self.completions.clone();
        tracing::debug!(generation = ticket.generation, mode = %ticket.mode, "解析リクエスト発行");

        tokio::spawn(async move {
            let outcome = analyzer::analyze(&client, ticket.mode, &image)
                .await
                .map_err(|e| e.to_string());
            // セッション終了後は受信側がないので送信失敗は無視
            let _ = completions.send(Completion { ticket, outcome });
        });
    }

    fn complete(&mut self, completion: Completion) {
        if !self.state.accepts(&completion.ticket) {
            tracing::debug!(
                generation = completion.ticket.generation,
                mode = %completion.ticket.mode,
                "古いレスポンスを破棄"
            );
            return;
        }
        self.apply(completion.into_event());
        self.print_state();
    }

    async fn feedback(&mut self, lines: &mut UnboundedReceiver<String>) {
        let previous = self.unsent_feedback.take().unwrap_or_default();

        let Some(email) = self.prompt(lines, "Aapka Gmail", &previous.email).await else {
            return;
        };
        let Some(message) = self.prompt(lines, "Feedback", &previous.message).await else {
            return;
        };

        let form = FeedbackForm::new(email, message);
        match submit_feedback(&self.config, &form, self.state.mode()).await {
            Ok(()) => self.print("🙏 Shukriya! Aapka feedback mil gaya."),
            Err(e) => {
                self.print(&format!("⚠ {}", e));
                self.unsent_feedback = Some(form);
            }
        }
    }

    /// 解析中でもスピナーと混ざらないように表示してから1行読む
    async fn prompt(
        &self,
        lines: &mut UnboundedReceiver<String>,
        label: &str,
        default: &str,
    ) -> Option<String> {
        self.print(&prompt_label(label, default));
        read_answer(lines, default).await
    }

    fn toggle_theme(&mut self) {
        self.config.theme = self.config.theme.toggled();
        if let Err(e) = self.config.save() {
            tracing::warn!("テーマ設定の保存に失敗: {}", e);
        }
        self.print(&format!("Theme: {}", self.config.theme));
    }

    async fn handle(
        &mut self,
        command: Command,
        lines: &mut UnboundedReceiver<String>,
    ) -> ControlFlow<()> {
        match command {
            Command::Capture(path) => self.capture(path),
            Command::SwitchMode(mode) => {
                let target = mode.unwrap_or(match self.state.mode() {
                    ScoutMode::PriceScout => ScoutMode::HealthScout,
                    ScoutMode::HealthScout => ScoutMode::PriceScout,
                });
                self.apply(Event::SwitchMode(target));
                self.print_state();
            }
            Command::Reset => {
                self.apply(Event::Reset);
                self.print_state();
            }
            Command::Quantity(input) => {
                if self.state.price_result().is_none() {
                    self.print("Quantity sirf price result ke saath kaam karta hai.");
                } else {
                    self.apply(Event::QuantityChanged(parse_quantity(&input)));
                    self.print_state();
                }
            }
            Command::Share => match share_text_for(&self.state) {
                Some(text) => self.print(&text),
                None => self.print("Share karne ke liye pehle result chahiye."),
            },
            Command::Feedback => self.feedback(lines).await,
            Command::Theme => self.toggle_theme(),
            Command::Show => self.print_state(),
            Command::Help => self.print(HELP),
            Command::Quit => return ControlFlow::Break(()),
            Command::Unknown(input) => {
                self.print(&format!("Samajh nahi aaya: {} (`help` likhein)", input))
            }
        }
        ControlFlow::Continue(())
    }
}

/// 標準入力を別スレッドで読み、行ごとに送る
fn spawn_line_reader() -> UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn prompt_label(label: &str, default: &str) -> String {
    if default.is_empty() {
        format!("{}:", label)
    } else {
        format!("{} [{}]:", label, default)
    }
}

/// 1行入力。空入力ならデフォルト値。入力終了時はNone
async fn read_answer(lines: &mut UnboundedReceiver<String>, default: &str) -> Option<String> {
    let line = lines.recv().await?;
    let line = line.trim();
    Some(if line.is_empty() { default.to_string() } else { line.to_string() })
}

/// 対話セッションを開始
pub async fn run_session(config: Config, mode: ScoutMode) -> Result<()> {
    let client = GeminiClient::from_config(&config)?;
    let (completions, mut completion_rx) = mpsc::unbounded_channel();
    let mut lines = spawn_line_reader();

    let mut session = Session {
        config,
        client,
        state: ViewState::new(mode),
        spinner: None,
        completions,
        unsent_feedback: None,
    };

    session.print_state();
    session.print("(`help` likhein commands ke liye)");

    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else { break };
                if session.handle(parse_command(&line), &mut lines).await.is_break() {
                    break;
                }
            }
            Some(completion) = completion_rx.recv() => session.complete(completion),
        }
    }

    if let Some(spinner) = session.spinner.take() {
        spinner.finish_and_clear();
    }
    Ok(())
}
