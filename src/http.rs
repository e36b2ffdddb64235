//! # HTTP Fetch Module
//!
//! Uniform outbound GET used by every provider adapter. Failure is silent:
//! transport errors, timeouts and non-200 statuses are retried a small fixed
//! number of times with a linear backoff, then surface as `None`.

use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::HttpConfig;
use crate::errors::FetchError;

/// Body of a successful response
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    /// Interpret the payload as JSON, parsing text bodies served with a non-JSON content type
    pub fn into_json(self) -> Option<Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(text) => serde_json::from_str(&text).ok(),
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Payload::Text(text) => Some(text),
            Payload::Json(Value::String(text)) => Some(text),
            Payload::Json(_) => None,
        }
    }
}

/// A GET request description
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            timeout: None,
        }
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.push((key.to_string(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Query parameter lookup, mostly for assertions
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Outbound GET capability shared by provider adapters
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Perform the request. `None` means "no result" for any reason.
    async fn get(&self, request: FetchRequest) -> Option<Payload>;
}

/// Calculate the delay before retry `attempt` (1-based): linear backoff plus jitter
pub fn calculate_retry_delay(attempt: u32, config: &HttpConfig) -> u64 {
    let base = config.retry_delay_ms;
    let linear = base.saturating_mul(u64::from(attempt.max(1)));
    let jitter = if base >= 4 {
        rand::thread_rng().gen_range(0..=base / 4)
    } else {
        0
    };
    linear + jitter
}

/// `Fetch` implementation backed by `reqwest`
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    config: HttpConfig,
}

impl HttpFetcher {
    pub fn new(config: HttpConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client, config })
    }

    async fn try_once(&self, request: &FetchRequest) -> Result<Payload, FetchError> {
        let mut builder = self.client.get(&request.url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        let mut has_user_agent = false;
        for (key, value) in &request.headers {
            has_user_agent |= key.eq_ignore_ascii_case("user-agent");
            builder = builder.header(key.as_str(), value.as_str());
        }
        if !has_user_agent {
            builder = builder.header(USER_AGENT, self.config.user_agent.as_str());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;

        if response.status() != StatusCode::OK {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.contains("json"))
            .unwrap_or(false);

        let body = response.text().await?;

        if is_json {
            Ok(Payload::Json(serde_json::from_str(&body)?))
        } else {
            Ok(Payload::Text(body))
        }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get(&self, request: FetchRequest) -> Option<Payload> {
        let attempts = self.config.max_retries + 1;

        for attempt in 1..=attempts {
            match self.try_once(&request).await {
                Ok(payload) => {
                    debug!(url = %request.url, attempt, "Fetch succeeded");
                    return Some(payload);
                }
                Err(e) if e.is_retryable() && attempt < attempts => {
                    let delay = calculate_retry_delay(attempt, &self.config);
                    debug!(url = %request.url, attempt, error = %e, delay_ms = delay, "Fetch failed, retrying");
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => {
                    warn!(url = %request.url, attempt, error = %e, "Fetch gave up");
                    return None;
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_config() -> HttpConfig {
        HttpConfig {
            timeout_secs: 2,
            max_retries: 2,
            retry_delay_ms: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_calculate_retry_delay() {
        let config = HttpConfig::default();

        let delay1 = calculate_retry_delay(1, &config);
        assert!(delay1 >= config.retry_delay_ms);
        assert!(delay1 <= config.retry_delay_ms + config.retry_delay_ms / 4);

        // Linear: the second retry waits at least twice the base
        let delay2 = calculate_retry_delay(2, &config);
        assert!(delay2 >= 2 * config.retry_delay_ms);
    }

    #[test]
    fn test_payload_into_json_parses_text_bodies() {
        let payload = Payload::Text(r#"{"AbstractText":"x"}"#.to_string());
        assert_eq!(payload.into_json().unwrap()["AbstractText"], "x");
        assert!(Payload::Text("plain".into()).into_json().is_none());
    }

    #[tokio::test]
    async fn test_json_response_is_parsed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/summary"))
            .and(query_param("q", "malaria"))
            .and(header("user-agent", crate::config::DEFAULT_USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"extract": "A disease"})))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(fast_config()).unwrap();
        let payload = fetcher
            .get(FetchRequest::new(format!("{}/summary", server.uri())).query("q", "malaria"))
            .await;

        assert_eq!(payload, Some(Payload::Json(serde_json::json!({"extract": "A disease"}))));
    }

    #[tokio::test]
    async fn test_plain_text_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Lagos: +31°C"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(fast_config()).unwrap();
        let payload = fetcher.get(FetchRequest::new(server.uri())).await;

        assert_eq!(payload, Some(Payload::Text("Lagos: +31°C".to_string())));
    }

    #[tokio::test]
    async fn test_non_200_retries_then_gives_up() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3) // first attempt + 2 retries
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(fast_config()).unwrap();
        assert!(fetcher.get(FetchRequest::new(server.uri())).await.is_none());
    }

    #[tokio::test]
    async fn test_recovers_on_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(fast_config()).unwrap();
        assert_eq!(
            fetcher.get(FetchRequest::new(server.uri())).await,
            Some(Payload::Text("ok".to_string()))
        );
    }

    #[tokio::test]
    async fn test_malformed_json_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("{not json", "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(fast_config()).unwrap();
        assert!(fetcher.get(FetchRequest::new(server.uri())).await.is_none());
    }

    #[tokio::test]
    async fn test_connection_refused_is_no_result() {
        let fetcher = HttpFetcher::new(fast_config()).unwrap();
        assert!(fetcher.get(FetchRequest::new("http://127.0.0.1:9/")).await.is_none());
    }
}
