//! Shared test doubles: an in-memory fetch layer and a scripted text generator

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};

use pharmacare::config::BotConfig;
use pharmacare::errors::FetchError;
use pharmacare::http::{Fetch, FetchRequest, Payload};
use pharmacare::lm::{GenerationRequest, TextGenerator};

/// URL-prefix routed fetch double; unrouted URLs return `None`
#[derive(Default)]
pub struct MockFetch {
    routes: Vec<(String, Payload)>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl MockFetch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(mut self, url_prefix: &str, body: Value) -> Self {
        self.routes.push((url_prefix.to_string(), Payload::Json(body)));
        self
    }

    pub fn text(mut self, url_prefix: &str, body: &str) -> Self {
        self.routes.push((url_prefix.to_string(), Payload::Text(body.to_string())));
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn calls_to(&self, url_prefix: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.starts_with(url_prefix))
            .count()
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetch for MockFetch {
    async fn get(&self, request: FetchRequest) -> Option<Payload> {
        let payload = self
            .routes
            .iter()
            .find(|(prefix, _)| request.url.starts_with(prefix.as_str()))
            .map(|(_, payload)| payload.clone());
        self.requests.lock().unwrap().push(request);
        payload
    }
}

type Script = dyn Fn(&GenerationRequest) -> Result<String, FetchError> + Send + Sync;

/// Text generator driven by a closure, recording every request
pub struct ScriptedGenerator {
    script: Box<Script>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new<F>(script: F) -> Arc<Self>
    where
        F: Fn(&GenerationRequest) -> Result<String, FetchError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            script: Box::new(script),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Answers planner prompts with `plan` and echoes the information line of rewrite prompts
    pub fn assistant(plan: &'static str, chat_reply: &'static str) -> Arc<Self> {
        Self::new(move |request| {
            let prompt = request.prompt.as_str();
            if prompt.contains("Available tools:") {
                Ok(plan.to_string())
            } else if let Some(info) = prompt.split("Information: ").nth(1) {
                Ok(info.split("\nAnswer:").next().unwrap_or_default().to_string())
            } else {
                Ok(chat_reply.to_string())
            }
        })
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, FetchError> {
        let result = (self.script)(&request);
        self.requests.lock().unwrap().push(request);
        result
    }
}

pub fn test_config() -> BotConfig {
    BotConfig::default()
}
