//! Message Handler module for processing incoming Telegram messages

use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{debug, info};

use crate::brain::Brain;
use crate::localization::t;

use super::typing::start_typing_indicator;

pub async fn message_handler(bot: Bot, msg: Message, brain: Arc<Brain>) -> Result<()> {
    match msg.text() {
        Some(text) => handle_text_message(&bot, &msg, text, &brain).await,
        None => handle_unsupported_message(&bot, &msg).await,
    }
}

async fn handle_text_message(bot: &Bot, msg: &Message, text: &str, brain: &Brain) -> Result<()> {
    let chat_id = msg.chat.id;
    debug!(chat_id = %chat_id, chars = text.len(), "Received text message");

    let typing = start_typing_indicator(bot.clone(), chat_id);
    let reply = brain.respond(chat_id.0, text).await;
    typing.abort();

    bot.send_message(chat_id, reply)
        .await
        .with_context(|| format!("Failed to send reply to chat {}", chat_id))?;
    info!(chat_id = %chat_id, "Reply sent");
    Ok(())
}

async fn handle_unsupported_message(bot: &Bot, msg: &Message) -> Result<()> {
    debug!(chat_id = %msg.chat.id, "Received unsupported message type");
    bot.send_message(msg.chat.id, t("unsupported-message"))
        .await
        .context("Failed to send unsupported-message notice")?;
    Ok(())
}
