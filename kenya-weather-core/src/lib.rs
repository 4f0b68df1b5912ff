//! Core library for the `kenya-weather` voice assistant.
//!
//! This crate defines:
//! - Time expression extraction and intent classification for spoken queries
//! - Sample selection and English/Swahili response generation
//! - An optional remote NLP interpreter with keyword fallback
//! - Offline snapshots, forecast assembly, recommendations and alert planning
//! - Configuration handling and the speech input/output seams
//!
//! It is used by `kenya-weather-cli`, but nothing here depends on a terminal.

pub mod alerts;
pub mod config;
pub mod forecast;
pub mod intent;
pub mod language;
pub mod model;
pub mod nlp;
pub mod recommend;
pub mod response;
pub mod snapshot;
pub mod speech;
pub mod time_expr;

pub use alerts::{ScheduledAlert, WeatherAlert, plan_notifications, weather_alerts};
pub use config::{Config, NlpConfig};
pub use intent::{Intent, classify};
pub use language::Language;
pub use model::{ConditionCode, Forecast, ForecastSeries, LocalWeather, ResolvedQuery, WeatherSample};
pub use nlp::{Assistant, KeywordInterpreter, NlpError, QueryInterpreter, WitInterpreter};
pub use recommend::{Recommendation, recommendations};
pub use response::{generate, respond};
pub use snapshot::{Snapshot, SnapshotError};
pub use speech::{SpeechInput, SpeechOutput, VoiceGender, VoiceProfile, VoiceSession};
pub use time_expr::extract_time;
