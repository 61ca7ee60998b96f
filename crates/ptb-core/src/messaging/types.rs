use crate::domain::{ChatId, Sender};

/// Incoming text message, already stripped of Telegram specifics.
#[derive(Clone, Debug)]
pub struct IncomingText {
    pub chat_id: ChatId,
    pub sender: Sender,
    pub text: String,
}

/// Reply keyboard: rows of button labels. Pressing a button sends its label
/// back as a plain text message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplyKeyboard {
    pub rows: Vec<Vec<String>>,
}

impl ReplyKeyboard {
    pub fn new(rows: &[&[&str]]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| row.iter().map(|label| label.to_string()).collect())
                .collect(),
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.rows.iter().flatten().any(|l| l == label)
    }
}

/// One outgoing message produced by the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<ReplyKeyboard>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: ReplyKeyboard) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}
