//! # Localization Module
//!
//! Every fixed user-facing text comes from a Fluent resource embedded at
//! compile time (`locales/en/main.ftl`). Bidi isolation marks are disabled so
//! formatted output is byte-exact.

use anyhow::{anyhow, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource};
use std::sync::OnceLock;
use tracing::error;
use unic_langid::LanguageIdentifier;

const EN_MAIN_FTL: &str = include_str!("../locales/en/main.ftl");

/// Localization manager for PharmaCare Bot
pub struct LocalizationManager {
    bundle: FluentBundle<FluentResource>,
}

impl LocalizationManager {
    /// Create a manager from the embedded English resource
    pub fn new() -> Result<Self> {
        Self::from_source("en", EN_MAIN_FTL)
    }

    /// Create a manager from FTL source text
    pub fn from_source(locale: &str, source: &str) -> Result<Self> {
        let locale: LanguageIdentifier = locale.parse()?;
        let mut bundle = FluentBundle::new_concurrent(vec![locale]);
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow!("Failed to parse FTL resource: {:?}", errors))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow!("Failed to add FTL resource: {:?}", errors))?;

        Ok(Self { bundle })
    }

    fn empty() -> Self {
        let mut bundle = FluentBundle::new_concurrent(vec![LanguageIdentifier::default()]);
        bundle.set_use_isolating(false);
        Self { bundle }
    }

    pub fn has_message(&self, key: &str) -> bool {
        self.bundle.has_message(key)
    }

    /// Get a localized message
    pub fn get_message(&self, key: &str, args: Option<&FluentArgs>) -> String {
        let Some(msg) = self.bundle.get_message(key) else {
            return format!("Missing translation: {}", key);
        };
        let Some(pattern) = msg.value() else {
            return format!("Missing value for key: {}", key);
        };

        let mut errors = vec![];
        let value = self.bundle.format_pattern(pattern, args, &mut errors);
        if !errors.is_empty() {
            error!(key, ?errors, "Errors while formatting message");
        }
        value.into_owned()
    }

    /// Get a localized message with simple string arguments
    pub fn get_message_with_args(&self, key: &str, args: &[(&str, &str)]) -> String {
        let mut fluent_args = FluentArgs::new();
        for (name, value) in args {
            fluent_args.set(*name, *value);
        }
        self.get_message(key, Some(&fluent_args))
    }

    /// All numbered variants of a message (`prefix-1`, `prefix-2`, ...)
    pub fn variants(&self, prefix: &str) -> Vec<String> {
        (1..)
            .map(|n| format!("{prefix}-{n}"))
            .take_while(|key| self.has_message(key))
            .map(|key| self.get_message(&key, None))
            .collect()
    }
}

static LOCALIZATION_MANAGER: OnceLock<LocalizationManager> = OnceLock::new();

/// Get the global localization manager, loading it on first use
pub fn get_localization_manager() -> &'static LocalizationManager {
    LOCALIZATION_MANAGER.get_or_init(|| {
        LocalizationManager::new().unwrap_or_else(|e| {
            error!(error = %e, "Failed to load embedded translations");
            LocalizationManager::empty()
        })
    })
}

/// Convenience function to get a localized message
pub fn t(key: &str) -> String {
    get_localization_manager().get_message(key, None)
}

/// Convenience function to get a localized message with arguments
pub fn t_args(key: &str, args: &[(&str, &str)]) -> String {
    get_localization_manager().get_message_with_args(key, args)
}

/// Numbered variants of a message from the global manager
pub fn variants(prefix: &str) -> Vec<String> {
    get_localization_manager().variants(prefix)
}

/// Help text assembled from its sections
pub fn help_text() -> String {
    ["help-intro", "help-lookups", "help-nlp", "help-chat", "help-disclaimer"]
        .iter()
        .map(|key| t(key))
        .collect::<Vec<_>>()
        .join("\n\n")
}
