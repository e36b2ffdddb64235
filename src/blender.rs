//! Rewrites raw provider output into a friendlier reply.
//!
//! With a language model configured the raw output is rephrased; otherwise, or
//! when the model fails or returns nothing, a fixed template is used. Missing
//! raw output short-circuits to the capability's "not found" text without any
//! model call.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::capability::Capability;
use crate::lm::{GenerationRequest, TextGenerator};
use crate::localization::t_args;

const BLEND_MAX_TOKENS: u32 = 150;
const BLEND_TEMPERATURE: f32 = 0.3;

pub struct Blender {
    generator: Option<Arc<dyn TextGenerator>>,
    max_new_tokens: u32,
}

impl Blender {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self {
            generator,
            max_new_tokens: BLEND_MAX_TOKENS,
        }
    }

    pub fn with_max_new_tokens(mut self, max_new_tokens: u32) -> Self {
        self.max_new_tokens = max_new_tokens;
        self
    }

    pub async fn blend(
        &self,
        message: &str,
        capability: Capability,
        argument: &str,
        raw: Option<&str>,
    ) -> String {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return not_found(capability, argument);
        };

        let Some(generator) = &self.generator else {
            return template(capability, raw);
        };

        let request = GenerationRequest::new(rewrite_prompt(message, raw))
            .max_new_tokens(self.max_new_tokens)
            .temperature(BLEND_TEMPERATURE);

        match generator.generate(request).await {
            Ok(text) if !text.trim().is_empty() => {
                debug!(capability = %capability, chars = text.len(), "Blended provider output");
                text.trim().to_string()
            }
            Ok(_) => {
                debug!(capability = %capability, "Empty rewrite, using template");
                template(capability, raw)
            }
            Err(e) => {
                warn!(capability = %capability, error = %e, "Rewrite failed, using template");
                template(capability, raw)
            }
        }
    }
}

fn rewrite_prompt(message: &str, raw: &str) -> String {
    format!(
        "Rewrite the information below as a short, friendly answer to the user's question. \
         Keep every number, name and unit exactly as given.\n\
         Question: {}\n\
         Information: {}\n\
         Answer:",
        message.trim(),
        raw
    )
}

pub fn template(capability: Capability, raw: &str) -> String {
    t_args("blend-template", &[("capability", capability.as_ref()), ("raw", raw)])
}

pub fn not_found(capability: Capability, argument: &str) -> String {
    t_args(&capability.not_found_key(), &[("query", argument.trim())])
}
