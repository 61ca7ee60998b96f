use std::collections::HashMap;

use crate::domain::ChatId;

/// What the bot expects as the next message in a chat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingItemName,
    AwaitingItemNumber,
    AwaitingStatusText,
}

/// Per-chat conversation slots. Entries never expire on their own.
#[derive(Debug, Default)]
pub struct Conversations {
    states: HashMap<ChatId, ConversationState>,
}

impl Conversations {
    pub fn get(&self, chat_id: ChatId) -> ConversationState {
        self.states.get(&chat_id).copied().unwrap_or_default()
    }

    pub fn begin(&mut self, chat_id: ChatId, state: ConversationState) {
        if state == ConversationState::Idle {
            self.states.remove(&chat_id);
        } else {
            self.states.insert(chat_id, state);
        }
    }

    /// Consume the pending state, leaving the chat idle.
    pub fn take(&mut self, chat_id: ChatId) -> ConversationState {
        self.states.remove(&chat_id).unwrap_or_default()
    }

    pub fn reset(&mut self, chat_id: ChatId) {
        self.states.remove(&chat_id);
    }
}
