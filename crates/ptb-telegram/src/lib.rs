//! Telegram adapter (teloxide).
//!
//! This crate implements the `ptb-core` MessagingPort over Telegram Bot API
//! and feeds incoming updates into the core dispatcher.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup},
};

use tokio::time::sleep;

pub mod handlers;
pub mod router;

use ptb_core::{
    domain::ChatId,
    errors::Error,
    messaging::{port::MessagingPort, types::ReplyKeyboard},
    Result,
};

/// Sent instead of an empty reply; Telegram rejects blank message text.
const BLANK_REPLY: &str = "—";

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        tracing::warn!("telegram flood control, retrying after {d:?}");
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

/// Reply keyboard markup, resized to fit its buttons.
pub fn to_markup(keyboard: &ReplyKeyboard) -> KeyboardMarkup {
    let rows: Vec<Vec<KeyboardButton>> = keyboard
        .rows
        .iter()
        .map(|row| row.iter().map(KeyboardButton::new).collect())
        .collect();
    KeyboardMarkup::new(rows).resize_keyboard(true)
}

fn outgoing_text(text: &str) -> String {
    if text.trim().is_empty() {
        BLANK_REPLY.to_string()
    } else {
        text.to_string()
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<&ReplyKeyboard>,
    ) -> Result<()> {
        let text = outgoing_text(text);
        let markup = keyboard.map(to_markup);

        self.with_retry(|| {
            let req = self.bot.send_message(Self::tg_chat(chat_id), text.clone());
            match &markup {
                Some(m) => req.reply_markup(m.clone()),
                None => req,
            }
        })
        .await?;
        Ok(())
    }
}
