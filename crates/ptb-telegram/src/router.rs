use std::{collections::HashMap, sync::Arc};

use teloxide::{dptree, prelude::*};

use tokio::sync::{Mutex, OwnedMutexGuard};

use ptb_core::{config::Config, dispatcher::Dispatcher, messaging::port::MessagingPort};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub dispatcher: Arc<Dispatcher>,
    pub chat_locks: Arc<ChatLocks>,
}

/// One lock per chat so updates from the same chat are handled in order.
#[derive(Default)]
pub struct ChatLocks {
    inner: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl ChatLocks {
    pub async fn lock_chat(&self, chat_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(chat_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

pub async fn run_polling(cfg: Arc<Config>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    match bot.get_me().await {
        Ok(me) => tracing::info!("ptb started: @{}", me.username()),
        Err(e) => tracing::warn!("get_me failed: {e}"),
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let dispatcher = Arc::new(Dispatcher::from_config(&cfg, messenger)?);

    tracing::info!(
        admin_id = cfg.admin_id,
        catalog = %cfg.catalog_file.display(),
        clients = %cfg.clients_file.display(),
        "bot is running"
    );

    let state = Arc::new(AppState {
        cfg,
        dispatcher,
        chat_locks: Arc::new(ChatLocks::default()),
    });

    let handler =
        dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    teloxide::dispatching::Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
