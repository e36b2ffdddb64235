//! Geo and reference providers, plus the local clock

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::{fetch_json, number_at, str_at, title_case, Provider};
use crate::http::{Fetch, FetchRequest};

pub const UNIVERSITIES_URL: &str = "http://universities.hipolabs.com/search";
pub const ZIPPOPOTAM_URL: &str = "https://api.zippopotam.us/us";
pub const RESTCOUNTRIES_URL: &str = "https://restcountries.com/v3.1/name";
pub const OSM_SEARCH_URL: &str = "https://www.openstreetmap.org/search";
pub const OPENFOODFACTS_URL: &str = "https://world.openfoodfacts.org/cgi/search.pl";
pub const AGIFY_URL: &str = "https://api.agify.io";
pub const GENDERIZE_URL: &str = "https://api.genderize.io";
pub const MUSICBRAINZ_URL: &str = "https://musicbrainz.org/ws/2/artist/";

const MAX_ITEMS: usize = 5;

/// University directory by country
pub struct Universities {
    fetch: Arc<dyn Fetch>,
}

impl Universities {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl Provider for Universities {
    fn name(&self) -> &'static str {
        "hipolabs"
    }

    async fn fetch(&self, country: &str) -> Option<String> {
        let body = fetch_json(
            self.fetch.as_ref(),
            FetchRequest::new(UNIVERSITIES_URL).query("country", country.trim()),
        )
        .await?;

        let entries: Vec<String> = body
            .as_array()?
            .iter()
            .filter_map(|uni| {
                let name = str_at(uni, "/name")?;
                Some(match str_at(uni, "/web_pages/0") {
                    Some(site) => format!("• {name} ({site})"),
                    None => format!("• {name}"),
                })
            })
            .take(MAX_ITEMS)
            .collect();

        if entries.is_empty() {
            return None;
        }
        Some(format!("🏛️ Universities in {}:\n{}", title_case(country), entries.join("\n")))
    }
}

/// US postal-code lookup
pub struct Zippopotam {
    fetch: Arc<dyn Fetch>,
}

impl Zippopotam {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl Provider for Zippopotam {
    fn name(&self) -> &'static str {
        "zippopotam"
    }

    async fn fetch(&self, zip: &str) -> Option<String> {
        let zip = zip.trim();
        if zip.is_empty() || !zip.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let url = format!("{ZIPPOPOTAM_URL}/{zip}");
        let body = fetch_json(self.fetch.as_ref(), FetchRequest::new(url)).await?;

        let place = str_at(&body, "/places/0/place name")?;
        let state = str_at(&body, "/places/0/state").unwrap_or_default();
        Some(format!("🏠 ZIP {zip}: {place}, {state}").trim_end_matches(", ").to_string())
    }
}

/// Country facts
pub struct RestCountries {
    fetch: Arc<dyn Fetch>,
}

impl RestCountries {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl Provider for RestCountries {
    fn name(&self) -> &'static str {
        "restcountries"
    }

    async fn fetch(&self, country: &str) -> Option<String> {
        let url = format!("{}/{}", RESTCOUNTRIES_URL, urlencoding::encode(country.trim()));
        let body = fetch_json(self.fetch.as_ref(), FetchRequest::new(url)).await?;
        let entry = body.pointer("/0")?;

        let name = str_at(entry, "/name/common")?;
        let mut lines = vec![format!("🌍 {name}")];
        if let Some(capital) = str_at(entry, "/capital/0") {
            lines.push(format!("Capital: {capital}"));
        }
        if let Some(region) = str_at(entry, "/region") {
            lines.push(format!("Region: {region}"));
        }
        if let Some(population) = number_at(entry, "/population") {
            lines.push(format!("Population: {population}"));
        }
        Some(lines.join("\n"))
    }
}

/// Map-link builder; no network call
pub struct OpenStreetMapLink;

#[async_trait]
impl Provider for OpenStreetMapLink {
    fn name(&self) -> &'static str {
        "openstreetmap_link"
    }

    async fn fetch(&self, place: &str) -> Option<String> {
        let place = place.trim();
        if place.is_empty() {
            return None;
        }
        Some(format!(
            "🗺️ {}: {}?query={}",
            title_case(place),
            OSM_SEARCH_URL,
            urlencoding::encode(place)
        ))
    }
}

/// Food product lookup
pub struct OpenFoodFacts {
    fetch: Arc<dyn Fetch>,
}

impl OpenFoodFacts {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl Provider for OpenFoodFacts {
    fn name(&self) -> &'static str {
        "openfoodfacts"
    }

    async fn fetch(&self, product: &str) -> Option<String> {
        let request = FetchRequest::new(OPENFOODFACTS_URL)
            .query("search_terms", product.trim())
            .query("search_simple", "1")
            .query("action", "process")
            .query("json", "1")
            .query("page_size", "3");
        let body = fetch_json(self.fetch.as_ref(), request).await?;

        let products: Vec<String> = body
            .get("products")
            .and_then(Value::as_array)?
            .iter()
            .filter_map(|item| {
                let name = str_at(item, "/product_name")?;
                let mut line = format!("• {name}");
                if let Some(brand) = str_at(item, "/brands") {
                    line.push_str(&format!(" by {brand}"));
                }
                if let Some(grade) = str_at(item, "/nutriscore_grade") {
                    line.push_str(&format!(" (Nutri-Score {})", grade.to_uppercase()));
                }
                Some(line)
            })
            .collect();

        if products.is_empty() {
            return None;
        }
        Some(format!("🍎 Food products for {}:\n{}", product.trim(), products.join("\n")))
    }
}

/// Age prediction from a first name
pub struct Agify {
    fetch: Arc<dyn Fetch>,
}

impl Agify {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl Provider for Agify {
    fn name(&self) -> &'static str {
        "agify"
    }

    async fn fetch(&self, name: &str) -> Option<String> {
        let body = fetch_json(
            self.fetch.as_ref(),
            FetchRequest::new(AGIFY_URL).query("name", name.trim()),
        )
        .await?;
        let age = number_at(&body, "/age")?;
        Some(format!("👤 People named {} are around {age} years old", title_case(name)))
    }
}

/// Gender prediction from a first name
pub struct Genderize {
    fetch: Arc<dyn Fetch>,
}

impl Genderize {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl Provider for Genderize {
    fn name(&self) -> &'static str {
        "genderize"
    }

    async fn fetch(&self, name: &str) -> Option<String> {
        let body = fetch_json(
            self.fetch.as_ref(),
            FetchRequest::new(GENDERIZE_URL).query("name", name.trim()),
        )
        .await?;
        let gender = str_at(&body, "/gender")?;
        let probability = body
            .get("probability")
            .and_then(Value::as_f64)
            .map(|p| format!(" ({:.0}% likely)", p * 100.0))
            .unwrap_or_default();
        Some(format!("👤 {} is usually a {gender} name{probability}", title_case(name)))
    }
}

/// Artist search
pub struct MusicBrainz {
    fetch: Arc<dyn Fetch>,
}

impl MusicBrainz {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl Provider for MusicBrainz {
    fn name(&self) -> &'static str {
        "musicbrainz"
    }

    async fn fetch(&self, artist: &str) -> Option<String> {
        let request = FetchRequest::new(MUSICBRAINZ_URL)
            .query("query", artist.trim())
            .query("fmt", "json")
            .query("limit", "1");
        let body = fetch_json(self.fetch.as_ref(), request).await?;
        let entry = body.pointer("/artists/0")?;

        let name = str_at(entry, "/name")?;
        let mut details = Vec::new();
        if let Some(kind) = str_at(entry, "/type") {
            details.push(kind.to_string());
        }
        if let Some(country) = str_at(entry, "/country") {
            details.push(country.to_string());
        }
        if let Some(note) = str_at(entry, "/disambiguation") {
            details.push(note.to_string());
        }

        if details.is_empty() {
            Some(format!("🎵 {name}"))
        } else {
            Some(format!("🎵 {name} ({})", details.join(", ")))
        }
    }
}

/// Current local date and time
pub struct LocalClock;

#[async_trait]
impl Provider for LocalClock {
    fn name(&self) -> &'static str {
        "local_clock"
    }

    async fn fetch(&self, _argument: &str) -> Option<String> {
        let now = chrono::Local::now();
        Some(format!(
            "🕒 Current Date & Time: {}",
            now.format("%A, %d %B %Y | %I:%M %p")
        ))
    }
}
