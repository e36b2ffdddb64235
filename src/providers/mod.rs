//! Provider adapters for the public APIs behind each capability
//!
//! Every adapter performs its request through the shared [`Fetch`] layer and
//! defensively walks the provider's JSON shape. Any transport failure or shape
//! mismatch becomes `None`; adapters never error past their own boundary.
//!
//! - `weather`: OpenWeatherMap, Open-Meteo, wttr.in
//! - `knowledge`: Wikipedia, DuckDuckGo, dictionaryapi.dev
//! - `drug`: OpenFDA, RxNav, DailyMed
//! - `news`: Reddit, GNews
//! - `novelty`: jokes, facts, activities, random profiles, number trivia
//! - `reference`: universities, zip codes, countries, map links, food, names, artists, clock

pub mod drug;
pub mod knowledge;
pub mod news;
pub mod novelty;
pub mod reference;
pub mod weather;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::capability::Capability;
use crate::http::{Fetch, FetchRequest};

/// One external source able to answer a capability
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short stable name used in logs
    fn name(&self) -> &'static str;

    /// Look up `argument`, returning a formatted answer or `None`
    async fn fetch(&self, argument: &str) -> Option<String>;
}

/// Ordered fallback chains keyed by capability
pub type ProviderChains = HashMap<Capability, Vec<Arc<dyn Provider>>>;

/// Build the default provider chains in priority order
///
/// Credentialed providers go first and are only included when their key is set.
pub fn default_chains(fetch: Arc<dyn Fetch>, weather_api_key: Option<&str>) -> ProviderChains {
    let mut chains: ProviderChains = HashMap::new();

    let mut weather_chain: Vec<Arc<dyn Provider>> = Vec::new();
    if let Some(key) = weather_api_key {
        weather_chain.push(Arc::new(weather::OpenWeatherMap::new(fetch.clone(), key)));
    }
    weather_chain.push(Arc::new(weather::OpenMeteo::new(fetch.clone())));
    weather_chain.push(Arc::new(weather::Wttr::new(fetch.clone())));
    chains.insert(Capability::Weather, weather_chain);

    chains.insert(
        Capability::Knowledge,
        vec![
            Arc::new(knowledge::Wikipedia::new(fetch.clone())),
            Arc::new(knowledge::DuckDuckGo::new(fetch.clone())),
            Arc::new(knowledge::Dictionary::new(fetch.clone())),
        ],
    );
    chains.insert(
        Capability::Drug,
        vec![
            Arc::new(drug::OpenFda::new(fetch.clone())),
            Arc::new(drug::RxNav::new(fetch.clone())),
            Arc::new(drug::DailyMed::new(fetch.clone())),
        ],
    );
    chains.insert(
        Capability::News,
        vec![
            Arc::new(news::Reddit::new(fetch.clone())),
            Arc::new(news::GNews::new(fetch.clone())),
        ],
    );

    chains.insert(Capability::Joke, vec![Arc::new(novelty::OfficialJoke::new(fetch.clone()))]);
    chains.insert(Capability::Fact, vec![Arc::new(novelty::CatFact::new(fetch.clone()))]);
    chains.insert(Capability::Activity, vec![Arc::new(novelty::BoredActivity::new(fetch.clone()))]);
    chains.insert(Capability::RandomUser, vec![Arc::new(novelty::RandomUserMe::new(fetch.clone()))]);
    chains.insert(Capability::NumberTrivia, vec![Arc::new(novelty::NumbersApi::new(fetch.clone()))]);

    chains.insert(Capability::University, vec![Arc::new(reference::Universities::new(fetch.clone()))]);
    chains.insert(Capability::ZipCode, vec![Arc::new(reference::Zippopotam::new(fetch.clone()))]);
    chains.insert(Capability::Country, vec![Arc::new(reference::RestCountries::new(fetch.clone()))]);
    chains.insert(Capability::Map, vec![Arc::new(reference::OpenStreetMapLink)]);
    chains.insert(Capability::Food, vec![Arc::new(reference::OpenFoodFacts::new(fetch.clone()))]);
    chains.insert(
        Capability::NameGuess,
        vec![
            Arc::new(reference::Agify::new(fetch.clone())),
            Arc::new(reference::Genderize::new(fetch.clone())),
        ],
    );
    chains.insert(Capability::Artist, vec![Arc::new(reference::MusicBrainz::new(fetch))]);
    chains.insert(Capability::DateTime, vec![Arc::new(reference::LocalClock)]);

    chains
}

/// Fetch a request and interpret the body as JSON
pub(crate) async fn fetch_json(fetch: &dyn Fetch, request: FetchRequest) -> Option<Value> {
    fetch.get(request).await?.into_json()
}

/// Non-empty trimmed string at a JSON pointer
pub(crate) fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Number at a JSON pointer rendered without a trailing `.0`
pub(crate) fn number_at(value: &Value, pointer: &str) -> Option<String> {
    let number = value.pointer(pointer)?;
    if let Some(i) = number.as_i64() {
        return Some(i.to_string());
    }
    number.as_f64().map(|f| {
        if f.fract() == 0.0 {
            format!("{}", f as i64)
        } else {
            format!("{f}")
        }
    })
}

/// Truncate to `max_chars` characters, appending an ellipsis when cut
pub fn clip(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}

/// Capitalize the first letter of each word ("new york" -> "New York")
pub(crate) fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
