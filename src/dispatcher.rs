//! # Fallback Dispatcher Module
//!
//! Resolves a capability + argument to a single answer by checking the cache,
//! then trying the capability's providers strictly in priority order until one
//! returns something. Both successes and "no result" outcomes are cached, so a
//! repeated query within the TTL window costs no outbound calls.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, TtlCache};
use crate::capability::Capability;
use crate::providers::ProviderChains;

/// Result cache type used by the dispatcher; `None` is the cached "no result" sentinel
pub type ResultCache = TtlCache<CacheKey, Option<String>>;

pub struct FallbackDispatcher {
    chains: ProviderChains,
    cache: Arc<ResultCache>,
}

impl FallbackDispatcher {
    pub fn new(chains: ProviderChains, cache: Arc<ResultCache>) -> Self {
        for (capability, chain) in &chains {
            if chain.is_empty() {
                warn!(capability = %capability, "Capability registered with an empty provider chain");
            }
        }
        Self { chains, cache }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Provider names for a capability, in the order they are tried
    pub fn chain_names(&self, capability: Capability) -> Vec<&'static str> {
        self.chains
            .get(&capability)
            .map(|chain| chain.iter().map(|p| p.name()).collect())
            .unwrap_or_default()
    }

    /// Resolve a capability, returning the first non-empty provider answer
    pub async fn resolve(&self, capability: Capability, argument: &str) -> Option<String> {
        let key = CacheKey::new(capability, argument);
        let cacheable = capability.is_cacheable();

        if cacheable {
            if let Some(cached) = self.cache.get(&key) {
                debug!(capability = %capability, hit = cached.is_some(), "Cache hit");
                return cached;
            }
        }

        let result = self.run_chain(capability, argument).await;

        if cacheable {
            self.cache.set(key, result.clone());
        }
        result
    }

    async fn run_chain(&self, capability: Capability, argument: &str) -> Option<String> {
        let Some(chain) = self.chains.get(&capability) else {
            warn!(capability = %capability, "No providers registered");
            return None;
        };

        for provider in chain {
            match provider.fetch(argument).await {
                Some(answer) if !answer.trim().is_empty() => {
                    info!(capability = %capability, provider = provider.name(), "Provider answered");
                    return Some(answer);
                }
                _ => {
                    debug!(capability = %capability, provider = provider.name(), "Provider had no result, falling back");
                }
            }
        }

        info!(capability = %capability, providers = chain.len(), "All providers exhausted");
        None
    }
}
