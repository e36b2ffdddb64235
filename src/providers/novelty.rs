//! Novelty providers. Each capability here has a single source and no fallback.

use async_trait::async_trait;
use std::sync::Arc;

use super::{fetch_json, number_at, str_at, Provider};
use crate::http::{Fetch, FetchRequest};

pub const JOKE_URL: &str = "https://official-joke-api.appspot.com/random_joke";
pub const CAT_FACT_URL: &str = "https://catfact.ninja/fact";
pub const BORED_URL: &str = "https://bored-api.appbrewery.com/random";
pub const RANDOM_USER_URL: &str = "https://randomuser.me/api/";
pub const NUMBERS_URL: &str = "http://numbersapi.com";

/// Two-part joke: setup, newline, punchline
pub struct OfficialJoke {
    fetch: Arc<dyn Fetch>,
}

impl OfficialJoke {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl Provider for OfficialJoke {
    fn name(&self) -> &'static str {
        "official_joke"
    }

    async fn fetch(&self, _argument: &str) -> Option<String> {
        let body = fetch_json(self.fetch.as_ref(), FetchRequest::new(JOKE_URL)).await?;
        let setup = str_at(&body, "/setup")?;
        let punchline = str_at(&body, "/punchline")?;
        Some(format!("😂 {setup}\n{punchline}"))
    }
}

pub struct CatFact {
    fetch: Arc<dyn Fetch>,
}

impl CatFact {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl Provider for CatFact {
    fn name(&self) -> &'static str {
        "catfact"
    }

    async fn fetch(&self, _argument: &str) -> Option<String> {
        let body = fetch_json(self.fetch.as_ref(), FetchRequest::new(CAT_FACT_URL)).await?;
        str_at(&body, "/fact").map(|fact| format!("🧠 Fun fact: {fact}"))
    }
}

/// Activity suggester
pub struct BoredActivity {
    fetch: Arc<dyn Fetch>,
}

impl BoredActivity {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl Provider for BoredActivity {
    fn name(&self) -> &'static str {
        "bored"
    }

    async fn fetch(&self, _argument: &str) -> Option<String> {
        let body = fetch_json(self.fetch.as_ref(), FetchRequest::new(BORED_URL)).await?;
        let activity = str_at(&body, "/activity")?;
        let kind = str_at(&body, "/type")
            .map(|t| format!(" ({t})"))
            .unwrap_or_default();
        Some(format!("🎯 Try this: {activity}{kind}"))
    }
}

/// Random-profile generator
pub struct RandomUserMe {
    fetch: Arc<dyn Fetch>,
}

impl RandomUserMe {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl Provider for RandomUserMe {
    fn name(&self) -> &'static str {
        "randomuser"
    }

    async fn fetch(&self, _argument: &str) -> Option<String> {
        let body = fetch_json(self.fetch.as_ref(), FetchRequest::new(RANDOM_USER_URL)).await?;
        let person = body.pointer("/results/0")?;

        let first = str_at(person, "/name/first")?;
        let last = str_at(person, "/name/last").unwrap_or_default();
        let mut lines = vec![format!("👤 {first} {last}").trim_end().to_string()];
        if let Some(age) = number_at(person, "/dob/age") {
            lines.push(format!("Age: {age}"));
        }
        if let Some(country) = str_at(person, "/location/country") {
            lines.push(format!("Country: {country}"));
        }
        if let Some(email) = str_at(person, "/email") {
            lines.push(format!("Email: {email}"));
        }
        Some(lines.join("\n"))
    }
}

/// Number trivia; plain-text responses
pub struct NumbersApi {
    fetch: Arc<dyn Fetch>,
}

impl NumbersApi {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl Provider for NumbersApi {
    fn name(&self) -> &'static str {
        "numbersapi"
    }

    async fn fetch(&self, number: &str) -> Option<String> {
        let number = number.trim();
        let subject = if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
            number
        } else {
            "random"
        };
        let url = format!("{NUMBERS_URL}/{subject}/trivia");
        let text = self.fetch.get(FetchRequest::new(url)).await?.into_text()?;
        let text = text.trim();
        (!text.is_empty()).then(|| format!("🔢 {text}"))
    }
}
