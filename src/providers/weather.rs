//! Weather providers: OpenWeatherMap (keyed), Open-Meteo and wttr.in

use async_trait::async_trait;
use std::sync::Arc;

use super::{fetch_json, number_at, str_at, title_case, Provider};
use crate::http::{Fetch, FetchRequest};

pub const OPENWEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const OPEN_METEO_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const OPEN_METEO_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const WTTR_URL: &str = "https://wttr.in";

/// Current conditions from OpenWeatherMap; needs an API key
pub struct OpenWeatherMap {
    fetch: Arc<dyn Fetch>,
    api_key: String,
}

impl OpenWeatherMap {
    pub fn new(fetch: Arc<dyn Fetch>, api_key: &str) -> Self {
        Self {
            fetch,
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl Provider for OpenWeatherMap {
    fn name(&self) -> &'static str {
        "openweathermap"
    }

    async fn fetch(&self, city: &str) -> Option<String> {
        let request = FetchRequest::new(OPENWEATHER_URL)
            .query("q", city)
            .query("appid", self.api_key.as_str())
            .query("units", "metric");
        let body = fetch_json(self.fetch.as_ref(), request).await?;

        let temp = number_at(&body, "/main/temp")?;
        let description = str_at(&body, "/weather/0/description")?;
        let place = str_at(&body, "/name")
            .map(str::to_string)
            .unwrap_or_else(|| title_case(city));

        Some(format!("🌦️ Weather in {place}: {temp}°C, {description}"))
    }
}

/// Geocoding followed by a current-conditions forecast; no key required
pub struct OpenMeteo {
    fetch: Arc<dyn Fetch>,
}

impl OpenMeteo {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }
}

/// WMO weather interpretation codes used by Open-Meteo
pub fn describe_weather_code(code: i64) -> &'static str {
    match code {
        0 => "clear sky",
        1 => "mainly clear",
        2 => "partly cloudy",
        3 => "overcast",
        45 | 48 => "fog",
        51 | 53 | 55 => "drizzle",
        56 | 57 => "freezing drizzle",
        61 | 63 | 65 => "rain",
        66 | 67 => "freezing rain",
        71 | 73 | 75 | 77 => "snow",
        80..=82 => "rain showers",
        85 | 86 => "snow showers",
        95 => "thunderstorm",
        96 | 99 => "thunderstorm with hail",
        _ => "unknown conditions",
    }
}

#[async_trait]
impl Provider for OpenMeteo {
    fn name(&self) -> &'static str {
        "open_meteo"
    }

    async fn fetch(&self, city: &str) -> Option<String> {
        let geo = fetch_json(
            self.fetch.as_ref(),
            FetchRequest::new(OPEN_METEO_GEOCODING_URL)
                .query("name", city)
                .query("count", "1"),
        )
        .await?;

        let latitude = number_at(&geo, "/results/0/latitude")?;
        let longitude = number_at(&geo, "/results/0/longitude")?;
        let place = match (str_at(&geo, "/results/0/name"), str_at(&geo, "/results/0/country")) {
            (Some(name), Some(country)) => format!("{name}, {country}"),
            (Some(name), None) => name.to_string(),
            _ => title_case(city),
        };

        let forecast = fetch_json(
            self.fetch.as_ref(),
            FetchRequest::new(OPEN_METEO_FORECAST_URL)
                .query("latitude", latitude)
                .query("longitude", longitude)
                .query("current_weather", "true"),
        )
        .await?;

        let temp = number_at(&forecast, "/current_weather/temperature")?;
        let description = forecast
            .pointer("/current_weather/weathercode")
            .and_then(|v| v.as_i64())
            .map(describe_weather_code)
            .unwrap_or("unknown conditions");
        let wind = number_at(&forecast, "/current_weather/windspeed")
            .map(|w| format!(", wind {w} km/h"))
            .unwrap_or_default();

        Some(format!("🌦️ Weather in {place}: {temp}°C, {description}{wind}"))
    }
}

/// One-line plain-text report from wttr.in
pub struct Wttr {
    fetch: Arc<dyn Fetch>,
}

impl Wttr {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl Provider for Wttr {
    fn name(&self) -> &'static str {
        "wttr"
    }

    async fn fetch(&self, city: &str) -> Option<String> {
        let url = format!("{}/{}", WTTR_URL, urlencoding::encode(city.trim()));
        let text = self
            .fetch
            .get(FetchRequest::new(url).query("format", "3"))
            .await?
            .into_text()?;

        let line = text.trim();
        // wttr answers unknown places with a 200 and an explanatory sentence
        if line.is_empty() || line.to_lowercase().contains("unknown location") || line.starts_with('<') {
            return None;
        }
        Some(format!("🌦️ {line}"))
    }
}
