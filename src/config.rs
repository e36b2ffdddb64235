//! # Configuration Module
//!
//! This module defines configuration structures for the bot, including
//! outbound HTTP settings, cache limits, the optional language-model endpoint
//! and reply shaping. Values are read from the environment.

use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

// Constants for bot configuration
pub const DEFAULT_USER_AGENT: &str = "PharmaCareBot/1.0 (+https://example.com)";
pub const DEFAULT_LM_MODEL: &str = "google/flan-t5-small";
pub const DEFAULT_LM_BASE_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_MAX_REPLY_CHARS: usize = 3000;
pub const DEFAULT_HISTORY_TURNS: usize = 6;

/// Outbound HTTP settings shared by every provider adapter
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Timeout for a single attempt in seconds
    pub timeout_secs: u64,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Base delay for the linear backoff in milliseconds
    pub retry_delay_ms: u64,
    /// User-Agent header sent when the caller doesn't set one
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 8,
            max_retries: 2,
            retry_delay_ms: 300,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Result cache limits
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Time-to-live of a cached provider result in seconds
    pub ttl_secs: u64,
    /// Entries kept before the oldest insertion is evicted
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 300, // 5 minutes
            max_entries: 512,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Circuit breaker settings for the inference endpoint
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Consecutive failures before opening
    pub threshold: u32,
    /// Time before a half-open trial request is allowed, in seconds
    pub reset_secs: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            threshold: 5,
            reset_secs: 60, // 1 minute
        }
    }
}

/// Hosted text-generation endpoint settings. Only present when a key is configured.
#[derive(Debug, Clone)]
pub struct LmConfig {
    pub api_key: String,
    /// Default model for planning, blending and conversation
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub breaker: BreakerConfig,
}

impl LmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_LM_MODEL.to_string(),
            base_url: DEFAULT_LM_BASE_URL.to_string(),
            timeout_secs: 20,
            max_new_tokens: 200,
            temperature: 0.7,
            breaker: BreakerConfig::default(),
        }
    }
}

/// Top-level configuration for the bot process
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram_token: Option<String>,
    /// Enables the credentialed weather provider
    pub weather_api_key: Option<String>,
    pub http: HttpConfig,
    pub cache: CacheConfig,
    pub lm: Option<LmConfig>,
    pub max_reply_chars: usize,
    pub history_turns: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            telegram_token: None,
            weather_api_key: None,
            http: HttpConfig::default(),
            cache: CacheConfig::default(),
            lm: None,
            max_reply_chars: DEFAULT_MAX_REPLY_CHARS,
            history_turns: DEFAULT_HISTORY_TURNS,
        }
    }
}

impl BotConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Empty values are treated as unset. A value that fails to parse is an error
    /// naming the offending variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |keys: &[&str]| -> Option<String> {
            keys.iter()
                .filter_map(|key| lookup(*key))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        let defaults = Self::default();

        let http = HttpConfig {
            timeout_secs: parse_or(get(&["BRAIN_HTTP_TIMEOUT"]), "BRAIN_HTTP_TIMEOUT", defaults.http.timeout_secs)?,
            max_retries: parse_or(get(&["BRAIN_HTTP_RETRIES"]), "BRAIN_HTTP_RETRIES", defaults.http.max_retries)?,
            retry_delay_ms: parse_or(
                get(&["BRAIN_HTTP_RETRY_DELAY_MS"]),
                "BRAIN_HTTP_RETRY_DELAY_MS",
                defaults.http.retry_delay_ms,
            )?,
            user_agent: defaults.http.user_agent.clone(),
        };

        let cache = CacheConfig {
            ttl_secs: parse_or(get(&["BRAIN_CACHE_TTL"]), "BRAIN_CACHE_TTL", defaults.cache.ttl_secs)?,
            max_entries: parse_or(
                get(&["BRAIN_CACHE_MAX_ENTRIES"]),
                "BRAIN_CACHE_MAX_ENTRIES",
                defaults.cache.max_entries,
            )?,
        };

        let lm = match get(&["HF_API_KEY", "HUGGINGFACE_API_KEY"]) {
            Some(key) => {
                let mut lm = LmConfig::new(key);
                if let Some(model) = get(&["HF_MODEL"]) {
                    lm.model = model;
                }
                if let Some(base_url) = get(&["HF_BASE_URL"]) {
                    lm.base_url = base_url.trim_end_matches('/').to_string();
                }
                lm.timeout_secs = parse_or(get(&["HF_TIMEOUT"]), "HF_TIMEOUT", lm.timeout_secs)?;
                lm.max_new_tokens = parse_or(get(&["HF_MAX_NEW_TOKENS"]), "HF_MAX_NEW_TOKENS", lm.max_new_tokens)?;
                lm.temperature = parse_or(get(&["HF_TEMPERATURE"]), "HF_TEMPERATURE", lm.temperature)?;
                lm.breaker = BreakerConfig {
                    threshold: parse_or(
                        get(&["HF_BREAKER_THRESHOLD"]),
                        "HF_BREAKER_THRESHOLD",
                        lm.breaker.threshold,
                    )?,
                    reset_secs: parse_or(get(&["HF_BREAKER_RESET"]), "HF_BREAKER_RESET", lm.breaker.reset_secs)?,
                };
                Some(lm)
            }
            None => None,
        };

        Ok(Self {
            telegram_token: get(&["TELEGRAM_BOT_TOKEN", "TELEGRAM_TOKEN"]),
            weather_api_key: get(&["WEATHER_API_KEY", "OPENWEATHER_KEY"]),
            http,
            cache,
            lm,
            max_reply_chars: parse_or(
                get(&["BRAIN_MAX_REPLY_CHARS"]),
                "BRAIN_MAX_REPLY_CHARS",
                defaults.max_reply_chars,
            )?,
            history_turns: parse_or(get(&["BRAIN_HISTORY_TURNS"]), "BRAIN_HISTORY_TURNS", defaults.history_turns)?,
        })
    }
}

fn parse_or<T>(value: Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Invalid value for {name}: {raw:?}")),
        None => Ok(default),
    }
}
