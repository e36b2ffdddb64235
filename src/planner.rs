//! # Planner Module
//!
//! Language-model fallback for messages the heuristic classifier can't place.
//! The model is shown the message and the closed set of capability names and
//! asked for a JSON plan. Its output is untrusted text: the first balanced
//! `{...}` object is parsed strictly, then once more after a bounded repair
//! (single quotes to double, trailing commas removed). Anything unusable maps
//! to [`IntentDecision::Respond`].

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::capability::Capability;
use crate::intent::{clean_argument, IntentDecision};
use crate::lm::{GenerationRequest, TextGenerator};

lazy_static! {
    static ref TRAILING_COMMA: Regex =
        Regex::new(r",\s*([}\]])").expect("Trailing comma pattern should be valid");
}

const PLANNER_MAX_TOKENS: u32 = 64;
const PLANNER_TEMPERATURE: f32 = 0.1;

#[derive(Debug, Deserialize)]
struct RawPlan {
    action: Option<String>,
    #[serde(alias = "capability", alias = "name")]
    tool: Option<String>,
    #[serde(alias = "arg", alias = "query")]
    argument: Option<Value>,
}

pub struct Planner {
    generator: Arc<dyn TextGenerator>,
}

impl Planner {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Ask the model for a plan; every failure degrades to `Respond`
    pub async fn plan(&self, message: &str) -> IntentDecision {
        let request = GenerationRequest::new(build_prompt(message))
            .max_new_tokens(PLANNER_MAX_TOKENS)
            .temperature(PLANNER_TEMPERATURE);

        match self.generator.generate(request).await {
            Ok(text) => {
                let decision = parse_plan(&text);
                debug!(?decision, "Planner decision");
                decision
            }
            Err(e) => {
                warn!(error = %e, "Planner call failed");
                IntentDecision::Respond
            }
        }
    }
}

pub fn build_prompt(message: &str) -> String {
    format!(
        "You route messages for a pharmacy assistant bot.\n\
         Available tools: {}.\n\
         If a tool can answer the message, reply with JSON only: \
         {{\"action\": \"call_tool\", \"tool\": \"<tool>\", \"argument\": \"<argument>\"}}.\n\
         Otherwise reply with {{\"action\": \"respond\"}}.\n\
         Message: {}\n\
         JSON:",
        Capability::catalog(),
        message.trim()
    )
}

/// Slice of the first balanced `{...}` object, honoring quoted strings
pub fn find_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;

    let mut quote: Option<char> = None;
    let mut escape = false;
    let mut depth = 0usize;

    for (i, ch) in text[start..].char_indices() {
        if let Some(q) = quote {
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' => quote = Some(ch),
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn repair(object: &str) -> String {
    let quoted = object.replace('\'', "\"");
    TRAILING_COMMA.replace_all(&quoted, "$1").into_owned()
}

fn decode(object: &str) -> Option<RawPlan> {
    match serde_json::from_str::<RawPlan>(object) {
        Ok(plan) => Some(plan),
        Err(strict_err) => {
            debug!(error = %strict_err, "Strict plan parse failed, repairing");
            serde_json::from_str::<RawPlan>(&repair(object)).ok()
        }
    }
}

fn argument_text(value: Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => clean_argument(&s),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Interpret generated text as a plan
pub fn parse_plan(text: &str) -> IntentDecision {
    let Some(plan) = find_json_object(text).and_then(decode) else {
        return IntentDecision::Respond;
    };

    let Some(action) = plan.action else {
        return IntentDecision::Respond;
    };
    if !action.trim().eq_ignore_ascii_case("call_tool") {
        return IntentDecision::Respond;
    }

    let Some(capability) = plan
        .tool
        .map(|tool| tool.trim().replace([' ', '-'], "_"))
        .and_then(|tool| Capability::from_str(&tool).ok())
    else {
        return IntentDecision::Respond;
    };

    let argument = argument_text(plan.argument);
    if argument.is_empty() && !capability.accepts_empty_argument() {
        return IntentDecision::Respond;
    }
    IntentDecision::call(capability, argument)
}
