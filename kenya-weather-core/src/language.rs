use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Language of spoken responses. Only changes wording, never logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Sw,
}

impl Language {
    /// Parse a language tag such as `en`, `en-US` or `sw-KE`.
    /// Unknown tags fall back to English.
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_lowercase();

        match primary.as_str() {
            "sw" | "swa" => Language::Sw,
            _ => Language::En,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Sw => "sw",
        }
    }

    pub const fn all() -> &'static [Language] {
        &[Language::En, Language::Sw]
    }

    /// Spoken form of a clock time: "3:00 PM" or "saa 15:00".
    pub fn clock(&self, time: &DateTime<FixedOffset>) -> String {
        match self {
            Language::En => time.format("%-I:%M %p").to_string(),
            Language::Sw => format!("saa {}", time.format("%H:%M")),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
