//! Routes incoming text to exactly one handler.
//!
//! Resolution order per message:
//! 1. `/start`, `/cancel`, `/clients`
//! 2. pending conversation for the chat (menu phrases are not re-checked)
//! 3. exact menu phrase
//! 4. fallback help with the role keyboard

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    catalog::CatalogStore,
    clients::{ClientRegistry, TIMESTAMP_FORMAT},
    config::Config,
    conversation::{ConversationState, Conversations},
    domain::{AdminIdentity, ChatId, Sender},
    errors::Error,
    menu::{keyboard_for, MenuAction},
    messaging::{
        port::MessagingPort,
        types::{IncomingText, Reply},
    },
    status::StatusRegister,
    texts, Result,
};

/// Mutable application state. Guarded as a whole so that every
/// load-mutate-save sequence runs inside one critical section.
#[derive(Debug)]
pub struct BotState {
    pub catalog: CatalogStore,
    pub status: StatusRegister,
    pub conversations: Conversations,
}

pub struct Dispatcher {
    admin: AdminIdentity,
    state: Mutex<BotState>,
    registry: Mutex<ClientRegistry>,
    messenger: Arc<dyn MessagingPort>,
}

impl Dispatcher {
    pub fn new(
        admin: AdminIdentity,
        catalog: CatalogStore,
        registry: ClientRegistry,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            admin,
            state: Mutex::new(BotState {
                catalog,
                status: StatusRegister::default(),
                conversations: Conversations::default(),
            }),
            registry: Mutex::new(registry),
            messenger,
        }
    }

    /// Load the catalog and open the ledger named in `cfg`.
    pub fn from_config(cfg: &Config, messenger: Arc<dyn MessagingPort>) -> Result<Self> {
        let catalog = CatalogStore::load(&cfg.catalog_file)?;
        tracing::info!(
            items = catalog.len(),
            path = %cfg.catalog_file.display(),
            "catalog loaded"
        );
        Ok(Self::new(
            cfg.admin_identity(),
            catalog,
            ClientRegistry::new(&cfg.clients_file),
            messenger,
        ))
    }

    pub async fn status(&self) -> String {
        self.state.lock().await.status.get().to_string()
    }

    pub async fn catalog_items(&self) -> Vec<String> {
        self.state.lock().await.catalog.items().to_vec()
    }

    pub async fn conversation(&self, chat_id: ChatId) -> ConversationState {
        self.state.lock().await.conversations.get(chat_id)
    }

    /// Dispatch and deliver the replies.
    ///
    /// Persistence failures are logged and answered with a "try again" text;
    /// only delivery failures are returned.
    pub async fn handle(&self, msg: &IncomingText) -> Result<()> {
        let replies = match self.dispatch(msg).await {
            Ok(replies) => replies,
            Err(e) => {
                tracing::error!(
                    chat_id = msg.chat_id.0,
                    user_id = msg.sender.user_id.0,
                    "handler failed: {e}"
                );
                vec![Reply::text(texts::SAVE_FAILED)]
            }
        };
        self.send_all(msg.chat_id, &replies).await
    }

    /// Non-text messages (stickers, photos, ...) get the role menu.
    pub async fn handle_other(&self, chat_id: ChatId, sender: &Sender) -> Result<()> {
        let reply = self.fallback(self.admin.is_admin(sender.user_id));
        self.send_all(chat_id, &[reply]).await
    }

    pub async fn dispatch(&self, msg: &IncomingText) -> Result<Vec<Reply>> {
        let chat_id = msg.chat_id;
        let is_admin = self.admin.is_admin(msg.sender.user_id);

        if let Some((cmd, _args)) = parse_command(&msg.text) {
            match cmd.as_str() {
                "start" => return self.start(chat_id, &msg.sender, is_admin).await,
                "cancel" => {
                    self.state.lock().await.conversations.reset(chat_id);
                    return Ok(vec![Reply::with_keyboard(
                        texts::CANCELLED,
                        keyboard_for(is_admin),
                    )]);
                }
                "clients" => return self.clients(is_admin).await,
                _ => {}
            }
        }

        let mut state = self.state.lock().await;

        let pending = state.conversations.get(chat_id);
        if pending != ConversationState::Idle {
            if !is_admin {
                tracing::warn!(
                    user_id = msg.sender.user_id.0,
                    ?pending,
                    "non-admin message during admin conversation"
                );
                return Ok(vec![Reply::text(texts::DENIED)]);
            }
            state.conversations.take(chat_id);
            return self.continue_conversation(&mut state, pending, &msg.text);
        }

        if let Some(action) = MenuAction::from_text(&msg.text) {
            if action.is_privileged() && !is_admin {
                tracing::warn!(
                    user_id = msg.sender.user_id.0,
                    ?action,
                    "privileged action denied"
                );
                return Ok(vec![Reply::text(texts::DENIED)]);
            }
            return Ok(self.run_action(&mut state, chat_id, action));
        }

        Ok(vec![self.fallback(is_admin)])
    }

    async fn start(&self, chat_id: ChatId, sender: &Sender, is_admin: bool) -> Result<Vec<Reply>> {
        self.state.lock().await.conversations.reset(chat_id);

        let name = &self.admin.display_name;
        if is_admin {
            return Ok(vec![Reply::with_keyboard(
                texts::admin_welcome(name),
                keyboard_for(true),
            )]);
        }

        let record = self
            .registry
            .lock()
            .await
            .record_visit(sender.user_id, &sender.username)?;
        tracing::info!(
            id = record.id,
            user_id = sender.user_id.0,
            username = %sender.username,
            "client visit"
        );

        Ok(vec![Reply::with_keyboard(
            texts::user_welcome(name),
            keyboard_for(false),
        )])
    }

    async fn clients(&self, is_admin: bool) -> Result<Vec<Reply>> {
        if !is_admin {
            return Ok(vec![Reply::text(texts::DENIED)]);
        }

        let records = self.registry.lock().await.records()?;
        if records.is_empty() {
            return Ok(vec![Reply::text(texts::NO_CLIENTS)]);
        }

        let mut out = texts::clients_header(records.len());
        for r in &records {
            out.push_str(&format!(
                "\n{}. {} ({}), {}",
                r.id,
                r.username,
                r.user_id.0,
                r.last_seen_at.format(TIMESTAMP_FORMAT)
            ));
        }
        Ok(vec![Reply::text(out)])
    }

    fn run_action(&self, state: &mut BotState, chat_id: ChatId, action: MenuAction) -> Vec<Reply> {
        let name = &self.admin.display_name;
        let reply = match action {
            MenuAction::SetPresent => {
                state.status.set(texts::present(name));
                tracing::info!(status = %state.status.get(), "status updated");
                Reply::text(texts::STATUS_UPDATED)
            }
            MenuAction::SetAbsent => {
                state.status.set(texts::absent(name));
                tracing::info!(status = %state.status.get(), "status updated");
                Reply::text(texts::STATUS_UPDATED)
            }
            MenuAction::ChangeStatus => {
                state
                    .conversations
                    .begin(chat_id, ConversationState::AwaitingStatusText);
                Reply::text(texts::ASK_STATUS_TEXT)
            }
            MenuAction::AddItem => {
                state
                    .conversations
                    .begin(chat_id, ConversationState::AwaitingItemName);
                Reply::text(texts::ASK_ITEM_NAME)
            }
            MenuAction::RemoveItem => {
                if state.catalog.is_empty() {
                    Reply::text(texts::NOTHING_TO_REMOVE)
                } else {
                    state
                        .conversations
                        .begin(chat_id, ConversationState::AwaitingItemNumber);
                    Reply::text(format!(
                        "{}\n{}",
                        texts::ASK_ITEM_NUMBER,
                        state.catalog.numbered_listing()
                    ))
                }
            }
            MenuAction::ViewCatalog => {
                if state.catalog.is_empty() {
                    Reply::text(texts::CATALOG_EMPTY)
                } else {
                    Reply::text(format!(
                        "{}\n{}",
                        texts::CATALOG_HEADER,
                        state.catalog.numbered_listing()
                    ))
                }
            }
            MenuAction::QueryStatus => Reply::text(state.status.get()),
            MenuAction::Contact => Reply::text(texts::contact(name, &self.admin.contact_link())),
        };
        vec![reply]
    }

    fn continue_conversation(
        &self,
        state: &mut BotState,
        pending: ConversationState,
        text: &str,
    ) -> Result<Vec<Reply>> {
        let reply = match pending {
            ConversationState::AwaitingItemName => {
                state.catalog.append(text)?;
                tracing::info!(item = %text, items = state.catalog.len(), "catalog item added");
                Reply::with_keyboard(texts::item_added(text), keyboard_for(true))
            }
            ConversationState::AwaitingItemNumber => remove_by_number(&mut state.catalog, text)?,
            ConversationState::AwaitingStatusText => {
                state.status.set(text);
                tracing::info!(status = %text, "status updated");
                Reply::with_keyboard(texts::STATUS_UPDATED, keyboard_for(true))
            }
            ConversationState::Idle => self.fallback(true),
        };
        Ok(vec![reply])
    }

    fn fallback(&self, is_admin: bool) -> Reply {
        let text = if is_admin {
            texts::admin_help()
        } else {
            texts::user_help(&self.admin.display_name)
        };
        Reply::with_keyboard(text, keyboard_for(is_admin))
    }

    async fn send_all(&self, chat_id: ChatId, replies: &[Reply]) -> Result<()> {
        for reply in replies {
            self.messenger
                .send_text(chat_id, &reply.text, reply.keyboard.as_ref())
                .await?;
        }
        Ok(())
    }
}

/// Remove by 1-based number. Bad input ends the flow without retry.
fn remove_by_number(catalog: &mut CatalogStore, text: &str) -> Result<Reply> {
    let Ok(number) = text.trim().parse::<i64>() else {
        return Ok(Reply::text(texts::NOT_A_NUMBER));
    };

    let index = number
        .checked_sub(1)
        .and_then(|i| usize::try_from(i).ok());
    let Some(index) = index else {
        return Ok(Reply::text(texts::INVALID_NUMBER));
    };

    match catalog.remove_at(index) {
        Ok(item) => {
            tracing::info!(item = %item, items = catalog.len(), "catalog item removed");
            Ok(Reply::with_keyboard(
                texts::item_removed(&item),
                keyboard_for(true),
            ))
        }
        Err(Error::Validation(_)) => Ok(Reply::text(texts::INVALID_NUMBER)),
        Err(e) => Err(e),
    }
}

/// Split `/cmd@botname args` into a lowercase command name and the rest.
fn parse_command(text: &str) -> Option<(String, String)> {
    let text = text.trim();
    if !text.starts_with('/') {
        return None;
    }

    let mut parts = text.splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    Some((cmd, rest))
}
