//! Drug information providers: OpenFDA labels, RxNav, DailyMed

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::{clip, fetch_json, str_at, title_case, Provider};
use crate::http::{Fetch, FetchRequest};

pub const OPENFDA_LABEL_URL: &str = "https://api.fda.gov/drug/label.json";
pub const RXNAV_DRUGS_URL: &str = "https://rxnav.nlm.nih.gov/REST/drugs.json";
pub const DAILYMED_DRUGNAMES_URL: &str = "https://dailymed.nlm.nih.gov/dailymed/services/v2/drugnames.json";

const MAX_LABEL_CHARS: usize = 700;
const MAX_NAMES: usize = 5;

/// Regulatory label search on brand or generic name
pub struct OpenFda {
    fetch: Arc<dyn Fetch>,
}

impl OpenFda {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl Provider for OpenFda {
    fn name(&self) -> &'static str {
        "openfda"
    }

    async fn fetch(&self, drug: &str) -> Option<String> {
        let term = drug.trim().replace('"', "");
        let search = format!("openfda.brand_name:\"{term}\" openfda.generic_name:\"{term}\"");
        let request = FetchRequest::new(OPENFDA_LABEL_URL)
            .query("search", search)
            .query("limit", "1");
        let body = fetch_json(self.fetch.as_ref(), request).await?;

        let label = body.pointer("/results/0")?;
        let usage = str_at(label, "/indications_and_usage/0")
            .or_else(|| str_at(label, "/purpose/0"))
            .or_else(|| str_at(label, "/description/0"))?;
        let name = str_at(label, "/openfda/brand_name/0")
            .map(str::to_string)
            .unwrap_or_else(|| title_case(&term));

        let mut answer = format!("💊 {name} (OpenFDA): {}", clip(usage, MAX_LABEL_CHARS));
        if let Some(warning) = str_at(label, "/warnings/0") {
            answer.push_str(&format!("\n⚠️ {}", clip(warning, 300)));
        }
        Some(answer)
    }
}

/// Normalized drug names registry
pub struct RxNav {
    fetch: Arc<dyn Fetch>,
}

impl RxNav {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl Provider for RxNav {
    fn name(&self) -> &'static str {
        "rxnav"
    }

    async fn fetch(&self, drug: &str) -> Option<String> {
        let body = fetch_json(
            self.fetch.as_ref(),
            FetchRequest::new(RXNAV_DRUGS_URL).query("name", drug.trim()),
        )
        .await?;

        let names: Vec<&str> = body
            .pointer("/drugGroup/conceptGroup")
            .and_then(Value::as_array)?
            .iter()
            .filter_map(|group| group.get("conceptProperties").and_then(Value::as_array))
            .flatten()
            .filter_map(|concept| str_at(concept, "/name"))
            .take(MAX_NAMES)
            .collect();

        if names.is_empty() {
            return None;
        }
        Some(format!(
            "💊 RxNav: {} is registered as:\n• {}",
            title_case(drug),
            names.join("\n• ")
        ))
    }
}

/// Medication label registry
pub struct DailyMed {
    fetch: Arc<dyn Fetch>,
}

impl DailyMed {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl Provider for DailyMed {
    fn name(&self) -> &'static str {
        "dailymed"
    }

    async fn fetch(&self, drug: &str) -> Option<String> {
        let body = fetch_json(
            self.fetch.as_ref(),
            FetchRequest::new(DAILYMED_DRUGNAMES_URL).query("drug_name", drug.trim()),
        )
        .await?;

        let names: Vec<&str> = body
            .get("data")
            .and_then(Value::as_array)?
            .iter()
            .filter_map(|entry| str_at(entry, "/drug_name"))
            .take(MAX_NAMES)
            .collect();

        if names.is_empty() {
            return None;
        }
        Some(format!(
            "💊 DailyMed: registered medicines matching {}:\n• {}",
            title_case(drug),
            names.join("\n• ")
        ))
    }
}
