use async_trait::async_trait;

use crate::{domain::ChatId, messaging::types::ReplyKeyboard, Result};

/// Outbound messaging port.
///
/// The dispatcher only ever sends plain text, optionally with a reply keyboard
/// attached; polling and markup rendering belong to the adapter.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<&ReplyKeyboard>,
    ) -> Result<()>;
}
