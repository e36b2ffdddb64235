//! # PharmaCare Telegram Bot
//!
//! A Telegram bot that answers drug, weather, encyclopedia, news and novelty
//! questions by routing each message to a capability and resolving it through
//! an ordered chain of public API providers, with caching and optional
//! language-model planning and rewriting.

pub mod blender;
pub mod bot;
pub mod brain;
pub mod cache;
pub mod capability;
pub mod circuit_breaker;
pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod history;
pub mod http;
pub mod intent;
pub mod lm;
pub mod localization;
pub mod planner;
pub mod providers;
