//! News providers: Reddit listings and GNews headlines

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::{fetch_json, str_at, Provider};
use crate::http::{Fetch, FetchRequest};

pub const REDDIT_TOP_URL: &str = "https://www.reddit.com/r/worldnews/top.json";
pub const REDDIT_SEARCH_URL: &str = "https://www.reddit.com/search.json";
pub const GNEWS_TOP_URL: &str = "https://gnews.io/api/v4/top-headlines";
pub const GNEWS_SEARCH_URL: &str = "https://gnews.io/api/v4/search";

const MAX_HEADLINES: usize = 3;

fn format_headlines(headlines: &[(String, String)], topic: &str) -> Option<String> {
    if headlines.is_empty() {
        return None;
    }
    let title = if topic.is_empty() {
        "📰 Top stories:".to_string()
    } else {
        format!("📰 News about {topic}:")
    };
    let lines: Vec<String> = headlines
        .iter()
        .map(|(headline, link)| format!("• {headline}\n  🔗 {link}"))
        .collect();
    Some(format!("{title}\n{}", lines.join("\n")))
}

/// Social-link aggregator listing
pub struct Reddit {
    fetch: Arc<dyn Fetch>,
}

impl Reddit {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl Provider for Reddit {
    fn name(&self) -> &'static str {
        "reddit"
    }

    async fn fetch(&self, topic: &str) -> Option<String> {
        let topic = topic.trim();
        let request = if topic.is_empty() {
            FetchRequest::new(REDDIT_TOP_URL)
                .query("t", "day")
                .query("limit", MAX_HEADLINES.to_string())
        } else {
            FetchRequest::new(REDDIT_SEARCH_URL)
                .query("q", topic)
                .query("sort", "new")
                .query("limit", MAX_HEADLINES.to_string())
        };
        let body = fetch_json(self.fetch.as_ref(), request).await?;

        let headlines: Vec<(String, String)> = body
            .pointer("/data/children")
            .and_then(Value::as_array)?
            .iter()
            .filter_map(|child| {
                let title = str_at(child, "/data/title")?;
                let permalink = str_at(child, "/data/permalink")?;
                Some((title.to_string(), format!("https://www.reddit.com{permalink}")))
            })
            .take(MAX_HEADLINES)
            .collect();

        format_headlines(&headlines, topic)
    }
}

/// Headline search using the public demo token
pub struct GNews {
    fetch: Arc<dyn Fetch>,
}

impl GNews {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl Provider for GNews {
    fn name(&self) -> &'static str {
        "gnews"
    }

    async fn fetch(&self, topic: &str) -> Option<String> {
        let topic = topic.trim();
        let request = if topic.is_empty() {
            FetchRequest::new(GNEWS_TOP_URL)
        } else {
            FetchRequest::new(GNEWS_SEARCH_URL).query("q", topic)
        }
        .query("lang", "en")
        .query("token", "demo");
        let body = fetch_json(self.fetch.as_ref(), request).await?;

        let headlines: Vec<(String, String)> = body
            .get("articles")
            .and_then(Value::as_array)?
            .iter()
            .filter_map(|article| {
                Some((
                    str_at(article, "/title")?.to_string(),
                    str_at(article, "/url")?.to_string(),
                ))
            })
            .take(MAX_HEADLINES)
            .collect();

        format_headlines(&headlines, topic)
    }
}
