use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use clap::{Parser, Subcommand};
use inquire::{Password, Select, Text};
use kenya_weather_core::{
    Config, Forecast, Language, LocalWeather, Snapshot, SnapshotError, VoiceGender, VoiceSession,
    WeatherSample, config::parse_utc_offset, plan_notifications, recommendations, weather_alerts,
};

use crate::voice::{LineListener, TextSpeaker};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "kenya-weather", version, about = "Voice weather assistant for Kenya")]
pub struct Cli {
    /// Response language, e.g. "en" or "sw". Defaults to the configured one.
    #[arg(long, global = true)]
    pub lang: Option<String>,

    /// Snapshot file to answer from instead of the configured one.
    #[arg(long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Pretend the current time is this RFC 3339 instant.
    #[arg(long, global = true)]
    pub at: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Answer a single question, e.g. `ask will it rain at 3pm`.
    Ask {
        #[arg(required = true, trailing_var_arg = true)]
        query: Vec<String>,

        /// Skip the remote NLP service.
        #[arg(long)]
        offline: bool,
    },

    /// Read questions line by line from stdin and answer each in turn.
    Listen {
        #[arg(long)]
        offline: bool,
    },

    /// Clothing and comfort suggestions for the current conditions.
    Recommend,

    /// Weather warnings and planned reminders from the daily forecast.
    Alerts,

    /// Interactively set name, language, time zone, voice and NLP token.
    Configure,
}

/// Everything a command needs, resolved from config and flags.
struct Session {
    config: Config,
    language: Language,
    now: DateTime<FixedOffset>,
    weather: Option<LocalWeather>,
}

impl Session {
    fn current(&self) -> Option<&WeatherSample> {
        self.weather.as_ref().map(|w| &w.current)
    }

    fn forecast(&self) -> Forecast {
        self.weather
            .as_ref()
            .map(|w| w.forecast.clone())
            .unwrap_or_default()
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let Cli {
            lang,
            snapshot,
            at,
            command,
        } = self;

        let load = || Session::load(lang.as_deref(), snapshot.as_ref(), at.as_deref());

        match command {
            Command::Ask { query, offline } => {
                let session = load()?;
                let assistant = session.config.assistant(offline)?;
                let reply = assistant
                    .answer(
                        &query.join(" "),
                        session.current(),
                        &session.forecast(),
                        &session.now,
                        session.language,
                    )
                    .await;
                println!("{reply}");
            }
            Command::Listen { offline } => {
                let session = load()?;
                let assistant = session.config.assistant(offline)?;
                let forecast = session.forecast();
                let listener = LineListener::new(io::stdin().lock()).with_prompt("> ");
                let speaker = TextSpeaker::new(io::stdout());
                let mut voice = VoiceSession::new(listener, speaker, session.config.voice_profile());

                while voice
                    .handle_next(
                        &assistant,
                        session.current(),
                        &forecast,
                        &session.now,
                        session.language,
                    )
                    .await?
                    .is_some()
                {}
            }
            Command::Recommend => print_recommendations(&load()?),
            Command::Alerts => print_alerts(&load()?),
            Command::Configure => configure()?,
        }

        Ok(())
    }
}

impl Session {
    fn load(lang: Option<&str>, snapshot: Option<&PathBuf>, at: Option<&str>) -> Result<Self> {
        let config = Config::load()?;
        let offset = config.offset()?;

        let language = lang.map(Language::from_tag).unwrap_or(config.language);

        let now = match at {
            Some(at) => DateTime::parse_from_rfc3339(at)
                .with_context(|| format!("Invalid --at value (expected RFC 3339): {at}"))?
                .with_timezone(&offset),
            None => Utc::now().with_timezone(&offset),
        };

        let path = match snapshot {
            Some(path) => path.clone(),
            None => config.snapshot_file()?,
        };

        let weather = match Snapshot::load(&path) {
            Ok(snapshot) => Some(snapshot.to_local_weather(&offset)),
            Err(SnapshotError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "no weather snapshot found, answering without data");
                None
            }
            Err(e) => return Err(e).context("Failed to load weather snapshot"),
        };

        Ok(Self {
            config,
            language,
            now,
            weather,
        })
    }
}

fn print_recommendations(session: &Session) {
    let lang = session.language;
    let Some(current) = session.current() else {
        println!("{}", no_weather(lang));
        return;
    };

    let heading = match lang {
        Language::En => "Recommendations for",
        Language::Sw => "Mapendekezo kwa",
    };
    println!("{heading} {}", session.config.display_name());

    let recs = recommendations(current);
    if recs.is_empty() {
        println!("  No specific recommendations for current weather conditions.");
    }
    for rec in recs {
        println!(
            "  - {} [{}]: {}",
            rec.title(lang),
            rec.priority.label(lang),
            rec.description(lang)
        );
    }
}

fn print_alerts(session: &Session) {
    let Some(weather) = &session.weather else {
        println!("{}", no_weather(session.language));
        return;
    };
    let daily = &weather.forecast.daily;

    let alerts = weather_alerts(daily, session.now.offset());
    if alerts.is_empty() {
        println!("No weather alerts for {}.", weather.location_name);
    }
    for alert in &alerts {
        println!(
            "[{:?}] {} {}: {}",
            alert.severity,
            alert.time.format("%a %d %b"),
            alert.kind,
            alert.message
        );
    }

    let planned = plan_notifications(daily, &session.now, session.config.display_name());
    if !planned.is_empty() {
        println!();
        println!("Planned reminders:");
    }
    for reminder in planned {
        println!(
            "  {} -> {} | {} | {}",
            reminder.notify_at.format("%a %H:%M"),
            reminder.tag,
            reminder.title,
            reminder.body
        );
    }
}

fn no_weather(lang: Language) -> &'static str {
    match lang {
        Language::En => "No weather data is available. Save a snapshot first.",
        Language::Sw => "Hakuna taarifa za hali ya anga. Hifadhi taarifa kwanza.",
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let name = Text::new("Your name:")
        .with_default(config.user_name.as_deref().unwrap_or_default())
        .prompt()?;
    config.user_name = Some(name.trim().to_string()).filter(|n| !n.is_empty());

    config.language = Select::new("Response language:", Language::all().to_vec())
        .with_starting_cursor(index_of(Language::all(), &config.language))
        .prompt()?;

    let offset = Text::new("UTC offset:")
        .with_default(&config.utc_offset)
        .with_help_message("East Africa Time is +03:00")
        .prompt()?;
    parse_utc_offset(&offset)?;
    config.utc_offset = offset.trim().to_string();

    config.voice_gender = Select::new("Voice:", VoiceGender::all().to_vec())
        .with_starting_cursor(index_of(VoiceGender::all(), &config.voice_gender))
        .prompt()?;

    let token = Password::new("Wit.ai server token (leave empty to keep current):")
        .without_confirmation()
        .prompt()?;
    if !token.trim().is_empty() {
        config.upsert_nlp_api_key(token.trim().to_string());
    }

    config.save()?;
    let path = Config::config_file_path()?;
    println!("Saved configuration to {}", path.display());

    if !config.is_nlp_configured() {
        println!("No NLP token set; questions will be interpreted offline.");
    }

    Ok(())
}

fn index_of<T: PartialEq>(items: &[T], item: &T) -> usize {
    items.iter().position(|i| i == item).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ask_with_trailing_words() {
        let cli = Cli::parse_from([
            "kenya-weather",
            "--lang",
            "sw",
            "ask",
            "will",
            "it",
            "rain",
            "at",
            "3pm",
        ]);

        assert_eq!(cli.lang.as_deref(), Some("sw"));
        match cli.command {
            Command::Ask { query, offline } => {
                assert_eq!(query.join(" "), "will it rain at 3pm");
                assert!(!offline);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "kenya-weather",
            "listen",
            "--offline",
            "--at",
            "2024-05-01T12:00:00+03:00",
        ]);

        assert_eq!(cli.at.as_deref(), Some("2024-05-01T12:00:00+03:00"));
        assert!(matches!(cli.command, Command::Listen { offline: true }));
    }

    #[test]
    fn cursor_index() {
        assert_eq!(index_of(Language::all(), &Language::Sw), 1);
        assert_eq!(index_of(VoiceGender::all(), &VoiceGender::Female), 0);
    }
}
