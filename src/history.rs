//! # Conversation History Module
//!
//! Bounded per-chat record of recent turns, used as context for conversational
//! completions. Lives in memory only; a restart discards it.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

/// One exchange: what the user said and what the bot replied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub user: String,
    pub bot: String,
}

/// Recent turns per chat, oldest evicted first
pub struct ConversationLog {
    max_turns: usize,
    chats: Mutex<HashMap<i64, VecDeque<ChatTurn>>>,
}

impl ConversationLog {
    pub fn new(max_turns: usize) -> Self {
        Self {
            max_turns,
            chats: Mutex::new(HashMap::new()),
        }
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Append a turn, dropping the oldest once the chat is at capacity
    pub fn record(&self, chat_id: i64, user: &str, bot: &str) {
        if self.max_turns == 0 {
            return;
        }
        let mut chats = self.chats.lock().unwrap_or_else(PoisonError::into_inner);
        let turns = chats.entry(chat_id).or_default();
        while turns.len() >= self.max_turns {
            turns.pop_front();
        }
        turns.push_back(ChatTurn {
            user: user.to_string(),
            bot: bot.to_string(),
        });
    }

    /// Up to `n` most recent turns, oldest first
    pub fn recent(&self, chat_id: i64, n: usize) -> Vec<ChatTurn> {
        let chats = self.chats.lock().unwrap_or_else(PoisonError::into_inner);
        chats
            .get(&chat_id)
            .map(|turns| {
                let skip = turns.len().saturating_sub(n);
                turns.iter().skip(skip).cloned().collect()
            })
            .unwrap_or_default()
    }

    pub fn clear(&self, chat_id: i64) {
        let mut chats = self.chats.lock().unwrap_or_else(PoisonError::into_inner);
        chats.remove(&chat_id);
    }
}
