mod telegram;

pub use telegram::TelegramNotifier;

use thiserror::Error;

pub type ChatId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to notify chat {chat_id}: {reason}")]
pub struct NotifyError {
    pub chat_id: ChatId,
    pub reason: String,
}

/// Delivers one message to one chat. The bot credential lives in the implementation.
pub trait Notifier {
    fn send_text(&self, chat_id: ChatId, caption: &str) -> Result<(), NotifyError>;

    fn send_photo(&self, chat_id: ChatId, image_url: &str, caption: &str)
    -> Result<(), NotifyError>;
}
