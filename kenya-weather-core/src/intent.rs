//! Keyword-based intent classification.

use serde::{Deserialize, Serialize};

/// Topic of a weather query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Rain,
    Temperature,
    Clothing,
    FutureWeather,
    Sunny,
    Wind,
    Humidity,
    General,
}

impl Intent {
    /// Order in which keyword sets are tested. `General` is the fallback and
    /// has no keywords.
    pub const PRIORITY: [Intent; 7] = [
        Intent::Rain,
        Intent::Temperature,
        Intent::Clothing,
        Intent::FutureWeather,
        Intent::Sunny,
        Intent::Wind,
        Intent::Humidity,
    ];

    /// Words (English and Swahili) that select this intent.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Intent::Rain => &[
                "rain", "umbrella", "wet", "shower", "drizzle", "storm", "thunder", "mvua", "mwavuli",
                "kunyesha",
            ],
            Intent::Temperature => &[
                "temperature", "hot", "cold", "warm", "chilly", "degrees", "heat", "joto",
                "baridi",
            ],
            Intent::Clothing => &[
                "wear", "wearing", "clothing", "clothes", "dress", "jacket", "sweater", "outfit",
                "vaa", "nguo",
            ],
            Intent::FutureWeather => &["tomorrow", "later", "tonight", "forecast", "kesho", "utabiri"],
            Intent::Sunny => &["sunny", "sun", "sunshine", "jua"],
            Intent::Wind => &["wind", "breeze", "breezy", "gust", "upepo"],
            Intent::Humidity => &["humid", "humidity", "muggy", "unyevu"],
            Intent::General => &[],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Rain => "rain",
            Intent::Temperature => "temperature",
            Intent::Clothing => "clothing",
            Intent::FutureWeather => "future_weather",
            Intent::Sunny => "sunny",
            Intent::Wind => "wind",
            Intent::Humidity => "humidity",
            Intent::General => "general",
        }
    }

    /// Map an NLP service intent name such as `rain_query`.
    pub fn from_nlp_name(name: &str) -> Option<Intent> {
        match name.to_lowercase().as_str() {
            "rain_query" => Some(Intent::Rain),
            "temperature_query" => Some(Intent::Temperature),
            "clothing_query" => Some(Intent::Clothing),
            "future_weather_query" => Some(Intent::FutureWeather),
            "sunny_query" => Some(Intent::Sunny),
            "wind_query" => Some(Intent::Wind),
            "humidity_query" => Some(Intent::Humidity),
            "weather_query" => Some(Intent::General),
            _ => None,
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everyday words that start with a keyword but say nothing about the weather.
const UNRELATED_WORDS: &[&str] = &["sunday", "sundays", "window", "windows", "hotel", "hotels"];

fn matches_keyword(word: &str, keyword: &str) -> bool {
    word.starts_with(keyword) && !UNRELATED_WORDS.contains(&word)
}

/// Classify a query. Total and deterministic: anything unrecognised is `General`.
///
/// A keyword matches any word it begins, so plurals and compounds such as
/// "umbrellas" or "raincoat" count.
pub fn classify(query: &str) -> Intent {
    let lower = query.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    Intent::PRIORITY
        .into_iter()
        .find(|intent| {
            intent
                .keywords()
                .iter()
                .any(|k| words.iter().any(|w| matches_keyword(w, k)))
        })
        .unwrap_or(Intent::General)
}
