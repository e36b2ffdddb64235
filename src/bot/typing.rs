//! Typing indicator shown while the brain works on a reply

use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::ChatAction;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Telegram clears the indicator after ~5 seconds, so it is refreshed a little sooner
pub const TYPING_REFRESH: Duration = Duration::from_secs(4);

/// Send `ChatAction::Typing` immediately and then every [`TYPING_REFRESH`]
///
/// Runs until the returned handle is aborted.
pub fn start_typing_indicator(bot: Bot, chat_id: ChatId) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Err(e) = bot.send_chat_action(chat_id, ChatAction::Typing).await {
                warn!(chat_id = %chat_id, error = %e, "Failed to send typing indicator");
            }
            tokio::time::sleep(TYPING_REFRESH).await;
            debug!(chat_id = %chat_id, "Refreshing typing indicator");
        }
    })
}
