use ptb_core::{
    domain::{ChatId, Sender},
    messaging::types::IncomingText,
    Result,
};

use crate::router::AppState;

pub async fn handle_text(
    state: &AppState,
    chat_id: ChatId,
    sender: Sender,
    text: &str,
) -> Result<()> {
    tracing::debug!(
        chat_id = chat_id.0,
        user_id = sender.user_id.0,
        admin = state.cfg.admin_id == sender.user_id.0,
        "text message"
    );

    state
        .dispatcher
        .handle(&IncomingText {
            chat_id,
            sender,
            text: text.to_string(),
        })
        .await
}
