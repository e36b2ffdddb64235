//! # Intent Module
//!
//! Regex-based interpretation of a raw user message:
//!
//! - Explicit commands and verb prefixes (`/help`, `weather Lagos`, `summarize ...`)
//! - Whole-message small talk (greetings, goodbyes, thanks)
//! - The heuristic classifier: an ordered list of keyword rules, each choosing a
//!   capability and extracting its argument
//!
//! ## Rule order
//!
//! Rules are evaluated in a fixed total order and the first match wins:
//! drug, weather, news, zip code, university, country, map, food, artist,
//! name guess, joke, number trivia, fact, activity, random user, date/time,
//! knowledge. Domain keywords are checked before generic question forms, so
//! "what is the weather in Oslo" is weather and not a knowledge lookup.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, trace};

use crate::capability::Capability;
use crate::lm::NlpTask;

/// What the pipeline should do with a message
#[derive(Debug, Clone, PartialEq)]
pub enum IntentDecision {
    CallTool {
        capability: Capability,
        argument: String,
    },
    Respond,
}

impl IntentDecision {
    pub fn call(capability: Capability, argument: impl Into<String>) -> Self {
        IntentDecision::CallTool {
            capability,
            argument: argument.into(),
        }
    }
}

/// Explicit commands that bypass classification
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Help,
    Nlp(NlpTask, String),
    Lookup(Capability, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmallTalk {
    Greeting,
    Goodbye,
    Thanks,
}

#[derive(Clone, Copy)]
enum PrefixTarget {
    Nlp(NlpTask),
    Lookup(Capability),
}

// Longer prefixes first where one is a prefix of another
const VERB_PREFIXES: &[(&str, PrefixTarget)] = &[
    ("summarize ", PrefixTarget::Nlp(NlpTask::Summarize)),
    ("summarise ", PrefixTarget::Nlp(NlpTask::Summarize)),
    ("shorten ", PrefixTarget::Nlp(NlpTask::Shorten)),
    ("expand ", PrefixTarget::Nlp(NlpTask::Expand)),
    ("paraphrase ", PrefixTarget::Nlp(NlpTask::Paraphrase)),
    ("weather ", PrefixTarget::Lookup(Capability::Weather)),
    ("drug ", PrefixTarget::Lookup(Capability::Drug)),
    ("wiki ", PrefixTarget::Lookup(Capability::Knowledge)),
    ("define ", PrefixTarget::Lookup(Capability::Knowledge)),
    ("search ", PrefixTarget::Lookup(Capability::Knowledge)),
    ("map ", PrefixTarget::Lookup(Capability::Map)),
    ("news ", PrefixTarget::Lookup(Capability::News)),
    ("zip ", PrefixTarget::Lookup(Capability::ZipCode)),
    ("country ", PrefixTarget::Lookup(Capability::Country)),
    ("food ", PrefixTarget::Lookup(Capability::Food)),
    ("universities in ", PrefixTarget::Lookup(Capability::University)),
    ("universities ", PrefixTarget::Lookup(Capability::University)),
    ("university ", PrefixTarget::Lookup(Capability::University)),
    ("guess ", PrefixTarget::Lookup(Capability::NameGuess)),
    ("artist ", PrefixTarget::Lookup(Capability::Artist)),
];

lazy_static! {
    static ref GREETING: Regex = Regex::new(
        r"^(?:hi|hello|hey|hiya|howdy|yo|good (?:morning|afternoon|evening))(?:\s+(?:there|bot|pharmacare(?: bot)?))?[\s!.,?]*$"
    )
    .expect("Greeting pattern should be valid");
    static ref GOODBYE: Regex = Regex::new(
        r"^(?:bye|goodbye|bye bye|good night|later|see you(?:\s+(?:later|soon))?|see ya)[\s!.,]*$"
    )
    .expect("Goodbye pattern should be valid");
    static ref THANKS: Regex = Regex::new(
        r"^(?:thanks?(?:\s+you)?(?:\s+(?:so much|a lot|very much))?|thank u|thx|ty|cheers)[\s!.,]*$"
    )
    .expect("Thanks pattern should be valid");
    static ref TRAILING_NOISE: Regex = Regex::new(
        r"(?:(?:^|\s+)(?:today|tomorrow|tonight|now|right now|please|pls|thanks|this (?:morning|afternoon|evening|week)))+$"
    )
    .expect("Trailing noise pattern should be valid");
    static ref TOPIC_LEAD: Regex =
        Regex::new(r"(?i)^(?:about|regarding|on|for|in|at)\s+").expect("Topic lead pattern should be valid");
    static ref RULES: Vec<Rule> = build_rules();
}

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "what", "what's", "whats", "how", "in", "of", "for", "at",
    "me", "my", "it", "today", "tomorrow", "now", "please", "like", "about", "tell", "show",
];

/// One heuristic classification rule
struct Rule {
    capability: Capability,
    trigger: Regex,
    extract: Option<Regex>,
    /// Use the last meaningful word when `extract` doesn't capture
    last_word_fallback: bool,
}

impl Rule {
    fn new(capability: Capability, trigger: &str, extract: Option<&str>, last_word_fallback: bool) -> Self {
        Self {
            capability,
            trigger: Regex::new(trigger).expect("Intent trigger pattern should be valid"),
            extract: extract.map(|p| Regex::new(p).expect("Intent extract pattern should be valid")),
            last_word_fallback,
        }
    }

    fn argument(&self, text: &str) -> Option<String> {
        if let Some(extract) = &self.extract {
            if let Some(arg) = extract
                .captures(text)
                .and_then(|caps| caps.name("arg"))
                .map(|m| clean_argument(m.as_str()))
                .filter(|arg| !arg.is_empty())
            {
                return Some(arg);
            }
        }

        if self.capability.accepts_empty_argument() {
            return Some(String::new());
        }

        if self.last_word_fallback {
            // Multi-word triggers like "side effects" must not become the argument
            let remainder = self.trigger.replace_all(text, " ");
            return remainder
                .split_whitespace()
                .rev()
                .map(clean_argument)
                .find(|word| {
                    !word.is_empty() && !STOPWORDS.contains(&word.as_str()) && !self.trigger.is_match(word)
                });
        }
        None
    }
}

fn build_rules() -> Vec<Rule> {
    vec![
        Rule::new(
            Capability::Drug,
            r"\b(?:drugs?|medicines?|medications?|meds|tablets?|pills?|dosage|dose|side effects?)\b",
            Some(r"\b(?:drugs?|medicines?|medications?|meds|tablets?|pills?|dosage|dose|side effects?)(?:\s+(?:info(?:rmation)?|details))?(?:\s+(?:of|for|about|on|called|named))?\s+(?:the\s+|a\s+)?(?P<arg>[a-z0-9][a-z0-9\- ]*)"),
            true,
        ),
        Rule::new(
            Capability::Weather,
            r"\b(?:weather|forecast|temperature|raining|humidity)\b",
            Some(r".*\b(?:in|for|at)\s+(?P<arg>[a-z][a-z .'\-]*)"),
            true,
        ),
        Rule::new(
            Capability::News,
            r"\b(?:news|headlines?)\b",
            Some(r"\b(?:news|headlines?)\s+(?:about|on|for|regarding)\s+(?P<arg>.+)"),
            false,
        ),
        Rule::new(
            Capability::ZipCode,
            r"\b(?:zip|zipcode|zip code|postal code|post code)\b",
            Some(r"(?P<arg>\b\d{5}\b)"),
            false,
        ),
        Rule::new(
            Capability::University,
            r"\buniversit(?:y|ies)\b",
            Some(r"\b(?:in|from|of)\s+(?P<arg>[a-z][a-z .\-]*)"),
            true,
        ),
        Rule::new(
            Capability::Country,
            r"\b(?:country|capital of|population of)\b",
            Some(r"\b(?:country|capital of|population of)\s+(?:info\s+)?(?:of\s+|about\s+|called\s+)?(?P<arg>[a-z][a-z .\-]*)"),
            true,
        ),
        Rule::new(
            Capability::Map,
            r"\b(?:map of|where is|directions to|location of)\b",
            Some(r"\b(?:map of|where is|directions to|location of)\s+(?:the\s+)?(?P<arg>[a-z0-9][a-z0-9 ,.'\-]*)"),
            false,
        ),
        Rule::new(
            Capability::Food,
            r"\b(?:food|nutrition(?:al)?|calories|nutri-?score)\b",
            Some(r"\b(?:food|nutrition(?:al)?(?:\s+facts)?|calories|nutri-?score)\s+(?:(?:in|of|for|about|info)\s+)?(?:a\s+|an\s+|the\s+)?(?P<arg>[a-z][a-z .'\-]*)"),
            true,
        ),
        Rule::new(
            Capability::Artist,
            r"\b(?:artist|band|singer|musician|rapper)\b",
            Some(r"\b(?:artist|band|singer|musician|rapper)\s+(?:called\s+|named\s+)?(?P<arg>[a-z0-9][a-z0-9 &.'\-]*)"),
            false,
        ),
        Rule::new(
            Capability::NameGuess,
            r"\bguess\b",
            Some(r"\bguess\s+(?:the\s+)?(?:(?:age|gender)\s+)?(?:(?:of|for)\s+)?(?:(?:the\s+)?name\s+)?(?P<arg>[a-z]+)"),
            false,
        ),
        Rule::new(Capability::Joke, r"\b(?:jokes?|make me laugh|something funny)\b", None, false),
        Rule::new(
            Capability::NumberTrivia,
            r"\b(?:trivia|number fact|fact about (?:the )?number)\b",
            Some(r"(?P<arg>\b\d+\b)"),
            false,
        ),
        Rule::new(Capability::Fact, r"\b(?:fun fact|facts?)\b", None, false),
        Rule::new(
            Capability::Activity,
            r"\b(?:bored|activity|something to do|what should i do)\b",
            None,
            false,
        ),
        Rule::new(
            Capability::RandomUser,
            r"\brandom\s+(?:user|person|profile|identity|people)\b",
            None,
            false,
        ),
        Rule::new(
            Capability::DateTime,
            r"\b(?:what time|time is it|current time|the time|what(?:'s| is) the date|today'?s date|what day is it|date today)\b",
            None,
            false,
        ),
        Rule::new(
            Capability::Knowledge,
            r"\b(?:what is|what are|what's|whats|who is|who was|who are|define|definition of|meaning of|tell me about|explain|search for|look up)\b",
            Some(r"\b(?:what is|what are|what's|whats|who is|who was|who are|define|definition of|meaning of|tell me about|explain|search for|look up)\s+(?:a\s+|an\s+|the\s+)?(?P<arg>.+)"),
            false,
        ),
    ]
}

/// Lowercase, trim and unify apostrophes
fn normalize(message: &str) -> String {
    message.trim().to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}

/// Strip surrounding punctuation and trailing filler words from an extracted argument
pub fn clean_argument(raw: &str) -> String {
    let is_edge = |c: char| c.is_whitespace() || "?!.,;:\"'()".contains(c);
    let trimmed = raw.trim_matches(is_edge);
    let stripped = TRAILING_NOISE.replace(trimmed, "");
    stripped.trim_matches(is_edge).to_string()
}

/// News and weather prefixes read naturally with a preposition ("news about X")
fn lookup_argument(capability: Capability, raw: &str) -> String {
    let argument = clean_argument(raw);
    match capability {
        Capability::News | Capability::Weather => clean_argument(&TOPIC_LEAD.replace(&argument, "")),
        _ => argument,
    }
}

/// Parse `/start`, `/help` and explicit verb prefixes
pub fn parse_command(message: &str) -> Option<Command> {
    let message = message.trim();

    if message.starts_with('/') {
        let first = message.split_whitespace().next().unwrap_or_default();
        let command = first.split('@').next().unwrap_or_default().to_lowercase();
        match command.as_str() {
            "/start" => return Some(Command::Start),
            "/help" => return Some(Command::Help),
            _ => {}
        }
    }

    if message.eq_ignore_ascii_case("help") {
        return Some(Command::Help);
    }
    if message.eq_ignore_ascii_case("news") {
        return Some(Command::Lookup(Capability::News, String::new()));
    }

    for (prefix, target) in VERB_PREFIXES {
        let Some(head) = message.get(..prefix.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(prefix) {
            continue;
        }
        let argument = message[prefix.len()..].trim();
        let command = match *target {
            PrefixTarget::Nlp(task) => Command::Nlp(task, argument.to_string()),
            PrefixTarget::Lookup(capability) => Command::Lookup(capability, lookup_argument(capability, argument)),
        };
        if matches!(&command, Command::Nlp(_, arg) | Command::Lookup(_, arg) if arg.is_empty()) {
            continue;
        }
        debug!(prefix = prefix.trim(), "Explicit verb prefix");
        return Some(command);
    }
    None
}

/// Recognize messages that are nothing but a greeting, goodbye or thanks
pub fn detect_small_talk(message: &str) -> Option<SmallTalk> {
    let text = normalize(message);
    if GREETING.is_match(&text) {
        Some(SmallTalk::Greeting)
    } else if GOODBYE.is_match(&text) {
        Some(SmallTalk::Goodbye)
    } else if THANKS.is_match(&text) {
        Some(SmallTalk::Thanks)
    } else {
        None
    }
}

/// Heuristic classifier: first matching rule wins, `None` when nothing matches
pub fn classify(message: &str) -> Option<IntentDecision> {
    let text = normalize(message);
    if text.is_empty() {
        return None;
    }

    for rule in RULES.iter() {
        if !rule.trigger.is_match(&text) {
            continue;
        }
        match rule.argument(&text) {
            Some(argument) => {
                debug!(capability = %rule.capability, "Heuristic rule matched");
                return Some(IntentDecision::call(rule.capability, argument));
            }
            None => trace!(capability = %rule.capability, "Rule triggered without an argument"),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_argument() {
        assert_eq!(clean_argument(" lagos? "), "lagos");
        assert_eq!(clean_argument("new york today"), "new york");
        assert_eq!(clean_argument("paris right now please!"), "paris");
        assert_eq!(clean_argument("\"malaria\"."), "malaria");
        assert_eq!(clean_argument("tomorrow"), "");
    }

    #[test]
    fn test_rules_compile() {
        assert_eq!(RULES.len(), 17);
        assert_eq!(RULES[0].capability, Capability::Drug);
        assert_eq!(RULES[RULES.len() - 1].capability, Capability::Knowledge);
    }

    #[test]
    fn test_normalize_apostrophes() {
        assert_eq!(normalize("  What\u{2019}s UP "), "what's up");
    }
}
