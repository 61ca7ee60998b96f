//! Telegram update handlers.
//!
//! Each handler turns a teloxide update into the core message model and hands
//! it to the dispatcher. Replies go out through the messaging port.

use std::sync::Arc;

use teloxide::{
    requests::ResponseResult,
    types::{Message, User},
};

use ptb_core::domain::{ChatId, Sender, UserId};

use crate::router::AppState;

mod text;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let sender = sender_of(user);
    let chat_id = ChatId(msg.chat.id.0);

    // Sequentialize messages per chat.
    let _guard = state.chat_locks.lock_chat(chat_id.0).await;

    let result = match msg.text() {
        Some(text) => text::handle_text(&state, chat_id, sender, text).await,
        None => state.dispatcher.handle_other(chat_id, &sender).await,
    };

    if let Err(e) = result {
        tracing::error!(chat_id = chat_id.0, "failed to answer update: {e}");
    }
    Ok(())
}

fn sender_of(user: &User) -> Sender {
    Sender {
        user_id: UserId(user.id.0 as i64),
        username: user
            .username
            .clone()
            .unwrap_or_else(|| user.full_name()),
    }
}
