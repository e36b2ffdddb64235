//! # Provider Adapter Tests
//!
//! Response-shape handling for each adapter, driven by canned payloads.

mod common;

#[cfg(test)]
mod tests {
    use super::common::MockFetch;
    use pharmacare::providers::drug::{DailyMed, OpenFda, OPENFDA_LABEL_URL, DAILYMED_DRUGNAMES_URL};
    use pharmacare::providers::knowledge::{
        Dictionary, DuckDuckGo, Wikipedia, DICTIONARY_URL, DUCKDUCKGO_URL, WIKIPEDIA_SUMMARY_URL,
    };
    use pharmacare::providers::news::{GNews, Reddit, GNEWS_SEARCH_URL, REDDIT_TOP_URL};
    use pharmacare::providers::novelty::{NumbersApi, RandomUserMe, NUMBERS_URL, RANDOM_USER_URL};
    use pharmacare::providers::reference::{
        Agify, LocalClock, OpenStreetMapLink, RestCountries, Universities, Zippopotam, AGIFY_URL,
        RESTCOUNTRIES_URL, UNIVERSITIES_URL, ZIPPOPOTAM_URL,
    };
    use pharmacare::providers::weather::{
        OpenMeteo, Wttr, OPEN_METEO_FORECAST_URL, OPEN_METEO_GEOCODING_URL, WTTR_URL,
    };
    use pharmacare::providers::Provider;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_open_meteo_geocodes_then_forecasts() {
        let fetch = Arc::new(
            MockFetch::new()
                .json(
                    OPEN_METEO_GEOCODING_URL,
                    json!({"results": [{"name": "Lagos", "country": "Nigeria", "latitude": 6.45, "longitude": 3.39}]}),
                )
                .json(
                    OPEN_METEO_FORECAST_URL,
                    json!({"current_weather": {"temperature": 29.0, "weathercode": 61, "windspeed": 12.5}}),
                ),
        );
        let provider = OpenMeteo::new(fetch.clone());

        let answer = provider.fetch("Lagos").await.unwrap();
        assert!(answer.starts_with("🌦️ Weather in Lagos, Nigeria: 29°C"), "got: {answer}");
        assert!(answer.ends_with(", wind 12.5 km/h"));

        let forecast = &fetch.requests()[1];
        assert_eq!(forecast.query_value("latitude"), Some("6.45"));
        assert_eq!(forecast.query_value("current_weather"), Some("true"));
    }

    #[tokio::test]
    async fn test_open_meteo_unknown_place() {
        let fetch = Arc::new(MockFetch::new().json(OPEN_METEO_GEOCODING_URL, json!({"generationtime_ms": 0.5})));
        assert_eq!(OpenMeteo::new(fetch.clone()).fetch("Atlantis").await, None);
        assert_eq!(fetch.calls_to(OPEN_METEO_FORECAST_URL), 0);
    }

    #[tokio::test]
    async fn test_wttr_plain_text() {
        let fetch = Arc::new(MockFetch::new().text(WTTR_URL, "Lagos: 🌦 +29°C\n"));
        assert_eq!(
            Wttr::new(fetch).fetch("Lagos").await.as_deref(),
            Some("🌦️ Lagos: 🌦 +29°C")
        );

        let fetch = Arc::new(MockFetch::new().text(WTTR_URL, "Unknown location; please try ~Lagos"));
        assert_eq!(Wttr::new(fetch).fetch("Lagosx").await, None);
    }

    #[tokio::test]
    async fn test_wikipedia_skips_disambiguation() {
        let fetch = Arc::new(MockFetch::new().json(
            WIKIPEDIA_SUMMARY_URL,
            json!({"type": "disambiguation", "extract": "Mercury may refer to:"}),
        ));
        assert_eq!(Wikipedia::new(fetch.clone()).fetch("mercury").await, None);

        let fetch = Arc::new(MockFetch::new().json(
            WIKIPEDIA_SUMMARY_URL,
            json!({"type": "standard", "extract": "Aspirin is a medication."}),
        ));
        assert_eq!(
            Wikipedia::new(fetch.clone()).fetch("acetylsalicylic acid").await.as_deref(),
            Some("📘 Wikipedia: Aspirin is a medication.")
        );
        assert!(fetch.requests()[0].url.ends_with("/acetylsalicylic_acid"));
    }

    #[tokio::test]
    async fn test_duckduckgo_answer_fields() {
        let fetch = Arc::new(MockFetch::new().json(
            DUCKDUCKGO_URL,
            json!({"AbstractText": "", "Answer": "", "Definition": "A pain reliever."}),
        ));
        assert_eq!(
            DuckDuckGo::new(fetch).fetch("analgesic").await.as_deref(),
            Some("🔎 DuckDuckGo: A pain reliever.")
        );
    }

    #[tokio::test]
    async fn test_dictionary_single_words_only() {
        let fetch = Arc::new(MockFetch::new().json(
            DICTIONARY_URL,
            json!([{"meanings": [{"partOfSpeech": "noun", "definitions": [{"definition": "A drug that relieves pain."}]}]}]),
        ));
        let provider = Dictionary::new(fetch.clone());
        assert_eq!(
            provider.fetch("analgesic").await.as_deref(),
            Some("📖 Dictionary: analgesic (noun): A drug that relieves pain.")
        );
        assert_eq!(provider.fetch("two words").await, None);
        assert_eq!(fetch.call_count(), 1);
    }

    #[tokio::test]
    async fn test_openfda_label_with_warning() {
        let fetch = Arc::new(MockFetch::new().json(
            OPENFDA_LABEL_URL,
            json!({"results": [{
                "openfda": {"brand_name": ["Advil"]},
                "indications_and_usage": ["Temporarily relieves minor aches and pains."],
                "warnings": ["Stomach bleeding warning."]
            }]}),
        ));
        let answer = OpenFda::new(fetch.clone()).fetch("ibuprofen").await.unwrap();
        assert_eq!(
            answer,
            "💊 Advil (OpenFDA): Temporarily relieves minor aches and pains.\n⚠️ Stomach bleeding warning."
        );
        let search = fetch.requests()[0].query_value("search").unwrap().to_string();
        assert!(search.contains("openfda.generic_name:\"ibuprofen\""));
    }

    #[tokio::test]
    async fn test_dailymed_names() {
        let fetch = Arc::new(MockFetch::new().json(
            DAILYMED_DRUGNAMES_URL,
            json!({"data": [{"drug_name": "IBUPROFEN"}, {"drug_name": "IBUPROFEN AND FAMOTIDINE"}]}),
        ));
        let answer = DailyMed::new(fetch).fetch("ibuprofen").await.unwrap();
        assert!(answer.contains("• IBUPROFEN\n• IBUPROFEN AND FAMOTIDINE"));
    }

    #[tokio::test]
    async fn test_reddit_top_stories() {
        let fetch = Arc::new(MockFetch::new().json(
            REDDIT_TOP_URL,
            json!({"data": {"children": [
                {"data": {"title": "Headline one", "permalink": "/r/worldnews/1"}},
                {"data": {"title": "", "permalink": "/r/worldnews/2"}}
            ]}}),
        ));
        assert_eq!(
            Reddit::new(fetch).fetch("").await.as_deref(),
            Some("📰 Top stories:\n• Headline one\n  🔗 https://www.reddit.com/r/worldnews/1")
        );
    }

    #[tokio::test]
    async fn test_gnews_topic_search() {
        let fetch = Arc::new(MockFetch::new().json(
            GNEWS_SEARCH_URL,
            json!({"articles": [{"title": "Vaccine news", "url": "https://example.org/v"}]}),
        ));
        let answer = GNews::new(fetch.clone()).fetch("vaccines").await.unwrap();
        assert!(answer.starts_with("📰 News about vaccines:"));
        assert_eq!(fetch.requests()[0].query_value("token"), Some("demo"));
    }

    #[tokio::test]
    async fn test_numbers_api_text() {
        let fetch = Arc::new(MockFetch::new().text(NUMBERS_URL, "42 is the answer."));
        assert_eq!(
            NumbersApi::new(fetch.clone()).fetch("42").await.as_deref(),
            Some("🔢 42 is the answer.")
        );
        NumbersApi::new(fetch.clone()).fetch("").await;
        assert!(fetch.requests()[1].url.ends_with("/random/trivia"));
    }

    #[tokio::test]
    async fn test_random_user_profile() {
        let fetch = Arc::new(MockFetch::new().json(
            RANDOM_USER_URL,
            json!({"results": [{
                "name": {"first": "Ada", "last": "Obi"},
                "dob": {"age": 34},
                "location": {"country": "Nigeria"},
                "email": "ada@example.com"
            }]}),
        ));
        assert_eq!(
            RandomUserMe::new(fetch).fetch("").await.as_deref(),
            Some("👤 Ada Obi\nAge: 34\nCountry: Nigeria\nEmail: ada@example.com")
        );
    }

    #[tokio::test]
    async fn test_reference_adapters() {
        let fetch = Arc::new(
            MockFetch::new()
                .json(
                    UNIVERSITIES_URL,
                    json!([{"name": "University of Ghana", "web_pages": ["https://ug.edu.gh"]}]),
                )
                .json(
                    ZIPPOPOTAM_URL,
                    json!({"places": [{"place name": "Beverly Hills", "state": "California"}]}),
                )
                .json(
                    RESTCOUNTRIES_URL,
                    json!([{"name": {"common": "Kenya"}, "capital": ["Nairobi"], "region": "Africa", "population": 53771300}]),
                )
                .json(AGIFY_URL, json!({"name": "amara", "age": 31.0})),
        );

        assert_eq!(
            Universities::new(fetch.clone()).fetch("ghana").await.as_deref(),
            Some("🏛️ Universities in Ghana:\n• University of Ghana (https://ug.edu.gh)")
        );
        assert_eq!(
            Zippopotam::new(fetch.clone()).fetch("90210").await.as_deref(),
            Some("🏠 ZIP 90210: Beverly Hills, California")
        );
        assert_eq!(Zippopotam::new(fetch.clone()).fetch("abc").await, None);
        assert_eq!(
            RestCountries::new(fetch.clone()).fetch("kenya").await.as_deref(),
            Some("🌍 Kenya\nCapital: Nairobi\nRegion: Africa\nPopulation: 53771300")
        );
        assert_eq!(
            Agify::new(fetch.clone()).fetch("amara").await.as_deref(),
            Some("👤 People named Amara are around 31 years old")
        );
    }

    #[tokio::test]
    async fn test_offline_providers() {
        let link = OpenStreetMapLink.fetch("eiffel tower").await.unwrap();
        assert_eq!(
            link,
            "🗺️ Eiffel Tower: https://www.openstreetmap.org/search?query=eiffel%20tower"
        );
        assert_eq!(OpenStreetMapLink.fetch("  ").await, None);

        let now = LocalClock.fetch("").await.unwrap();
        assert!(now.starts_with("🕒 Current Date & Time: "));
    }
}
