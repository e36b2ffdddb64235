//! # Brain Module
//!
//! The response pipeline. One message in, one reply string out; nothing escapes
//! as an error. Stages, in order of precedence:
//!
//! 1. Empty input gets the "say something" prompt, with no network calls
//! 2. `/start` and `/help`
//! 3. Explicit verb prefixes (`weather Lagos`, `summarize ...`), bypassing the classifier
//! 4. Whole-message small talk
//! 5. Heuristic classifier, then dispatcher and blender
//! 6. Language-model planner, then dispatcher and blender
//! 7. A canned fallback line, or a conversational completion when a model is configured
//!
//! Replies are clipped to the configured length and recorded in the per-chat history.

use rand::seq::SliceRandom;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::blender::Blender;
use crate::capability::Capability;
use crate::config::BotConfig;
use crate::dispatcher::{FallbackDispatcher, ResultCache};
use crate::history::{ChatTurn, ConversationLog};
use crate::http::Fetch;
use crate::intent::{classify, detect_small_talk, parse_command, Command, IntentDecision, SmallTalk};
use crate::lm::{GenerationRequest, NlpTask, TextGenerator};
use crate::localization::{help_text, t, t_args, variants};
use crate::planner::Planner;
use crate::providers::{clip, default_chains};

const DEFAULT_LM_MAX_TOKENS: u32 = 200;
const DEFAULT_LM_TEMPERATURE: f32 = 0.7;

pub struct Brain {
    dispatcher: FallbackDispatcher,
    planner: Option<Planner>,
    blender: Blender,
    generator: Option<Arc<dyn TextGenerator>>,
    history: ConversationLog,
    max_reply_chars: usize,
    lm_max_new_tokens: u32,
    lm_temperature: f32,
}

impl Brain {
    /// Build the full pipeline with the default provider chains
    pub fn new(
        config: &BotConfig,
        fetch: Arc<dyn Fetch>,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        let chains = default_chains(fetch, config.weather_api_key.as_deref());
        let cache = Arc::new(ResultCache::from_config(&config.cache));
        Self::with_dispatcher(config, FallbackDispatcher::new(chains, cache), generator)
    }

    /// Build the pipeline around an existing dispatcher
    pub fn with_dispatcher(
        config: &BotConfig,
        dispatcher: FallbackDispatcher,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        let (lm_max_new_tokens, lm_temperature) = config
            .lm
            .as_ref()
            .map(|lm| (lm.max_new_tokens, lm.temperature))
            .unwrap_or((DEFAULT_LM_MAX_TOKENS, DEFAULT_LM_TEMPERATURE));

        let mut blender = Blender::new(generator.clone());
        if let Some(lm) = &config.lm {
            blender = blender.with_max_new_tokens(lm.max_new_tokens);
        }

        Self {
            dispatcher,
            planner: generator.clone().map(Planner::new),
            blender,
            generator,
            history: ConversationLog::new(config.history_turns),
            max_reply_chars: config.max_reply_chars,
            lm_max_new_tokens,
            lm_temperature,
        }
    }

    pub fn dispatcher(&self) -> &FallbackDispatcher {
        &self.dispatcher
    }

    pub fn history(&self) -> &ConversationLog {
        &self.history
    }

    /// Produce exactly one reply for one message
    pub async fn respond(&self, chat_id: i64, message: &str) -> String {
        info!(chat_id, chars = message.len(), "Handling message");

        let reply = self.route(chat_id, message).await;
        let reply = clip(&reply, self.max_reply_chars);

        let message = message.trim();
        if !message.is_empty() {
            self.history.record(chat_id, message, &reply);
        }
        reply
    }

    async fn route(&self, chat_id: i64, message: &str) -> String {
        let message = message.trim();
        if message.is_empty() {
            return t("empty-input");
        }

        if let Some(command) = parse_command(message) {
            debug!(?command, "Explicit command");
            return match command {
                Command::Start => t("welcome"),
                Command::Help => help_text(),
                Command::Nlp(task, text) => self.transform(task, &text).await,
                Command::Lookup(capability, argument) => {
                    self.lookup(message, capability, &argument).await
                }
            };
        }

        if let Some(kind) = detect_small_talk(message) {
            debug!(?kind, "Small talk");
            return small_talk(kind);
        }

        if let Some(IntentDecision::CallTool {
            capability,
            argument,
        }) = classify(message)
        {
            return self.lookup(message, capability, &argument).await;
        }

        if let Some(planner) = &self.planner {
            if let IntentDecision::CallTool {
                capability,
                argument,
            } = planner.plan(message).await
            {
                return self.lookup(message, capability, &argument).await;
            }
        }

        self.converse(chat_id, message).await
    }

    async fn lookup(&self, message: &str, capability: Capability, argument: &str) -> String {
        let raw = self.dispatcher.resolve(capability, argument).await;
        self.blender
            .blend(message, capability, argument, raw.as_deref())
            .await
    }

    async fn transform(&self, task: NlpTask, text: &str) -> String {
        let Some(generator) = &self.generator else {
            return t("nlp-unavailable");
        };

        let failed_key = format!("nlp-failed-{}", task.key());
        match generator.generate(task.request(text, self.lm_max_new_tokens)).await {
            Ok(output) if !output.trim().is_empty() => t_args(
                &format!("nlp-{}", task.key()),
                &[("text", output.trim())],
            ),
            Ok(_) => t(&failed_key),
            Err(e) => {
                warn!(task = task.key(), error = %e, "Text transformation failed");
                t(&failed_key)
            }
        }
    }

    async fn converse(&self, chat_id: i64, message: &str) -> String {
        let Some(generator) = &self.generator else {
            return pick("fallback");
        };

        let turns = self.history.recent(chat_id, self.history.max_turns());
        let request = GenerationRequest::new(conversation_prompt(&turns, message))
            .max_new_tokens(self.lm_max_new_tokens)
            .temperature(self.lm_temperature);

        match generator.generate(request).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => pick("fallback"),
            Err(e) => {
                warn!(chat_id, error = %e, "Conversational completion failed");
                pick("fallback")
            }
        }
    }
}

fn conversation_prompt(turns: &[ChatTurn], message: &str) -> String {
    let mut prompt = String::from(
        "You are PharmaCare Bot, a friendly assistant for health and everyday questions. \
         Answer briefly and never invent drug dosages.\n",
    );
    for turn in turns {
        prompt.push_str(&format!("User: {}\nBot: {}\n", turn.user, turn.bot));
    }
    prompt.push_str(&format!("User: {}\nBot:", message));
    prompt
}

fn small_talk(kind: SmallTalk) -> String {
    match kind {
        SmallTalk::Greeting => pick("greeting"),
        SmallTalk::Goodbye => pick("goodbye"),
        SmallTalk::Thanks => pick("thanks"),
    }
}

/// Random numbered variant of a message
fn pick(prefix: &str) -> String {
    let options = variants(prefix);
    options
        .choose(&mut rand::thread_rng())
        .cloned()
        .unwrap_or_else(|| t(&format!("{prefix}-1")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_prompt_includes_history() {
        let turns = vec![ChatTurn {
            user: "hi".to_string(),
            bot: "hello".to_string(),
        }];
        let prompt = conversation_prompt(&turns, "how are you");
        assert!(prompt.contains("User: hi\nBot: hello\n"));
        assert!(prompt.ends_with("User: how are you\nBot:"));
    }

    #[test]
    fn test_pick_returns_a_variant() {
        let options = variants("fallback");
        assert_eq!(options.len(), 3);
        assert!(options.contains(&pick("fallback")));
    }
}
