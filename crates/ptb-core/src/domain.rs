/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Who sent a message: platform id plus the handle shown in the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sender {
    pub user_id: UserId,
    pub username: String,
}

/// The configured admin identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminIdentity {
    pub user_id: UserId,
    /// Telegram handle, with or without a leading `@`.
    pub username: String,
    /// Name used in user-facing texts.
    pub display_name: String,
}

impl AdminIdentity {
    pub fn is_admin(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    /// `https://t.me/<handle>` for the admin account.
    pub fn contact_link(&self) -> String {
        format!("https://t.me/{}", self.username.trim().trim_start_matches('@'))
    }
}
