//! フィードバックフォームの検証とメッセージ生成
//!
//! 送信処理（HTTP）はCLI側。ここでは入力検証と送信本文の組み立てのみ行う。

use crate::types::ScoutMode;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref GMAIL_ADDRESS: Regex = Regex::new(r"^[a-z0-9._%+-]+@gmail\.com$").unwrap();
}

/// メッセージ本文の最小文字数（前後の空白を除く）
pub const MIN_MESSAGE_CHARS: usize = 5;

/// 入力検証エラー（送信前に表示し、APIは呼ばない）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedbackError {
    #[error("Kripya ek asli @gmail.com address hi dalein.")]
    InvalidEmail,

    #[error("Feedback thoda vistar mein likhein.")]
    MessageTooShort,
}

/// フィードバック入力
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackForm {
    pub email: String,
    pub message: String,
}

impl FeedbackForm {
    pub fn new(email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            message: message.into(),
        }
    }

    /// 入力を検証（メールアドレス → 本文の順）
    pub fn validate(&self) -> Result<(), FeedbackError> {
        validate_email(&self.email)?;
        validate_message(&self.message)
    }
}

/// 連絡先は @gmail.com のアドレスのみ受け付ける
pub fn validate_email(email: &str) -> Result<(), FeedbackError> {
    if GMAIL_ADDRESS.is_match(&email.trim().to_lowercase()) {
        Ok(())
    } else {
        Err(FeedbackError::InvalidEmail)
    }
}

pub fn validate_message(message: &str) -> Result<(), FeedbackError> {
    if message.trim().chars().count() < MIN_MESSAGE_CHARS {
        Err(FeedbackError::MessageTooShort)
    } else {
        Ok(())
    }
}

/// HTMLの特殊文字をエスケープ（parse_mode=HTML 用）
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 送信本文を組み立てる
///
/// `sent_at` は表示用に整形済みの時刻文字列
pub fn format_feedback_message(form: &FeedbackForm, mode: ScoutMode, sent_at: &str) -> String {
    format!(
        "<b>🚀 Naya Feedback Aaya Hai!</b>\n\n\
         <b>📧 User Gmail:</b> {}\n\
         <b>📝 Message:</b> {}\n\n\
         <b>📱 App Mode:</b> {}\n\
         <b>🕒 Time:</b> {}",
        escape_html(form.email.trim()),
        escape_html(form.message.trim()),
        mode.as_str(),
        escape_html(sent_at),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email("user@gmail.com"), Ok(()));
        assert_eq!(validate_email("  User.Name+shop@Gmail.com "), Ok(()));
        assert_eq!(validate_email("user@yahoo.com"), Err(FeedbackError::InvalidEmail));
        assert_eq!(validate_email("user@gmail.com.evil"), Err(FeedbackError::InvalidEmail));
        assert_eq!(validate_email("@gmail.com"), Err(FeedbackError::InvalidEmail));
        assert_eq!(validate_email(""), Err(FeedbackError::InvalidEmail));
    }

    #[test]
    fn test_validate_message() {
        assert_eq!(validate_message("hi"), Err(FeedbackError::MessageTooShort));
        assert_eq!(validate_message("   hey   "), Err(FeedbackError::MessageTooShort));
        assert_eq!(validate_message("really liked this app overall"), Ok(()));
        assert_eq!(validate_message("badhiya"), Ok(()));
    }

    #[test]
    fn test_form_validate_order() {
        let form = FeedbackForm::new("user@yahoo.com", "hi");
        assert_eq!(form.validate(), Err(FeedbackError::InvalidEmail));

        let form = FeedbackForm::new("user@gmail.com", "hi");
        assert_eq!(form.validate(), Err(FeedbackError::MessageTooShort));

        let form = FeedbackForm::new("user@gmail.com", "really liked this app overall");
        assert_eq!(form.validate(), Ok(()));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            FeedbackError::InvalidEmail.to_string(),
            "Kripya ek asli @gmail.com address hi dalein."
        );
        assert_eq!(
            FeedbackError::MessageTooShort.to_string(),
            "Feedback thoda vistar mein likhein."
        );
    }

    #[test]
    fn test_format_feedback_message() {
        let form = FeedbackForm::new("user@gmail.com", "Price <b>galat</b> tha & slow");
        let message = format_feedback_message(&form, ScoutMode::HealthScout, "15/10/2026, 10:30:00");

        assert!(message.contains("<b>📧 User Gmail:</b> user@gmail.com"));
        assert!(message.contains("Price &lt;b&gt;galat&lt;/b&gt; tha &amp; slow"));
        assert!(message.contains("<b>📱 App Mode:</b> HEALTH_SCOUT"));
        assert!(message.contains("15/10/2026, 10:30:00"));
    }
}
