//! Knowledge providers: encyclopedia summary, instant answers, dictionary

use async_trait::async_trait;
use std::sync::Arc;

use super::{clip, fetch_json, str_at, Provider};
use crate::http::{Fetch, FetchRequest};

pub const WIKIPEDIA_SUMMARY_URL: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";
pub const DUCKDUCKGO_URL: &str = "https://api.duckduckgo.com/";
pub const DICTIONARY_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";

const MAX_EXTRACT_CHARS: usize = 900;

pub struct Wikipedia {
    fetch: Arc<dyn Fetch>,
}

impl Wikipedia {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl Provider for Wikipedia {
    fn name(&self) -> &'static str {
        "wikipedia"
    }

    async fn fetch(&self, topic: &str) -> Option<String> {
        let title = topic.trim().replace(' ', "_");
        let url = format!("{}/{}", WIKIPEDIA_SUMMARY_URL, urlencoding::encode(&title));
        let body = fetch_json(self.fetch.as_ref(), FetchRequest::new(url)).await?;

        // Disambiguation pages have an extract, but not a useful one
        if str_at(&body, "/type") == Some("disambiguation") {
            return None;
        }
        let extract = str_at(&body, "/extract")?;
        Some(format!("📘 Wikipedia: {}", clip(extract, MAX_EXTRACT_CHARS)))
    }
}

pub struct DuckDuckGo {
    fetch: Arc<dyn Fetch>,
}

impl DuckDuckGo {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl Provider for DuckDuckGo {
    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    async fn fetch(&self, query: &str) -> Option<String> {
        let request = FetchRequest::new(DUCKDUCKGO_URL)
            .query("q", query)
            .query("format", "json")
            .query("no_html", "1")
            .query("skip_disambig", "1");
        let body = fetch_json(self.fetch.as_ref(), request).await?;

        let answer = str_at(&body, "/AbstractText")
            .or_else(|| str_at(&body, "/Answer"))
            .or_else(|| str_at(&body, "/Definition"))?;
        Some(format!("🔎 DuckDuckGo: {}", clip(answer, MAX_EXTRACT_CHARS)))
    }
}

pub struct Dictionary {
    fetch: Arc<dyn Fetch>,
}

impl Dictionary {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl Provider for Dictionary {
    fn name(&self) -> &'static str {
        "dictionary"
    }

    async fn fetch(&self, word: &str) -> Option<String> {
        // Dictionary entries are single words; skip phrases outright
        let word = word.trim();
        if word.is_empty() || word.contains(char::is_whitespace) {
            return None;
        }

        let url = format!("{}/{}", DICTIONARY_URL, urlencoding::encode(word));
        let body = fetch_json(self.fetch.as_ref(), FetchRequest::new(url)).await?;

        let definition = str_at(&body, "/0/meanings/0/definitions/0/definition")?;
        let part_of_speech = str_at(&body, "/0/meanings/0/partOfSpeech")
            .map(|p| format!(" ({p})"))
            .unwrap_or_default();
        Some(format!("📖 Dictionary: {word}{part_of_speech}: {definition}"))
    }
}
