use serde::Deserialize;
use serde_json::{Value, json};

use super::{ChatId, Notifier, NotifyError};
use crate::http;

const API_BASE: &str = "https://api.telegram.org";

pub struct TelegramNotifier {
    agent: ureq::Agent,
    api_base: String,
    bot_key: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(bot_key: impl Into<String>) -> Self {
        Self::with_api_base(API_BASE, bot_key)
    }

    pub fn with_api_base(api_base: impl Into<String>, bot_key: impl Into<String>) -> Self {
        Self {
            agent: http::build_agent(),
            api_base: api_base.into(),
            bot_key: bot_key.into(),
        }
    }

    fn call(&self, chat_id: ChatId, method: &str, payload: &Value) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/{method}", self.api_base, self.bot_key);
        let fail = |reason: String| NotifyError { chat_id, reason };

        let raw = http::post_json(&self.agent, &url, None, payload)
            .map_err(|failure| fail(format!("{method}: {failure}")))?;
        let response: ApiResponse = serde_json::from_str(&raw)
            .map_err(|err| fail(format!("{method}: malformed response: {err}")))?;
        if !response.ok {
            let description = response
                .description
                .unwrap_or_else(|| "no description".to_string());
            return Err(fail(format!("{method}: {description}")));
        }
        Ok(())
    }
}

impl Notifier for TelegramNotifier {
    fn send_text(&self, chat_id: ChatId, caption: &str) -> Result<(), NotifyError> {
        self.call(
            chat_id,
            "sendMessage",
            &json!({ "chat_id": chat_id, "text": caption }),
        )
    }

    fn send_photo(
        &self,
        chat_id: ChatId,
        image_url: &str,
        caption: &str,
    ) -> Result<(), NotifyError> {
        self.call(
            chat_id,
            "sendPhoto",
            &json!({ "chat_id": chat_id, "photo": image_url, "caption": caption }),
        )
    }
}
