//! Named user intents and their static properties.

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// A logical capability the bot can answer through one or more providers
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Capability {
    Weather,
    Knowledge,
    Drug,
    News,
    Joke,
    Fact,
    Activity,
    RandomUser,
    NumberTrivia,
    University,
    ZipCode,
    Country,
    Map,
    Food,
    NameGuess,
    Artist,
    DateTime,
}

impl Capability {
    /// Volatile capabilities return random or time-dependent content and bypass the cache
    pub fn is_cacheable(self) -> bool {
        !matches!(
            self,
            Capability::Joke
                | Capability::Fact
                | Capability::Activity
                | Capability::RandomUser
                | Capability::NumberTrivia
                | Capability::DateTime
        )
    }

    /// Whether a lookup makes sense with an empty argument
    pub fn accepts_empty_argument(self) -> bool {
        matches!(
            self,
            Capability::News
                | Capability::Joke
                | Capability::Fact
                | Capability::Activity
                | Capability::RandomUser
                | Capability::NumberTrivia
                | Capability::DateTime
        )
    }

    /// Localization key of the capability-specific "couldn't find" message
    pub fn not_found_key(self) -> String {
        format!("not-found-{}", self.as_ref().replace('_', "-"))
    }

    /// Comma-separated catalog of capability names, as shown to the planner
    pub fn catalog() -> String {
        Capability::iter()
            .map(|c| c.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
