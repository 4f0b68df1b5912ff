use anyhow::{Context, Result, anyhow};
use chrono::FixedOffset;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    language::Language,
    nlp::{Assistant, DEFAULT_NLP_TIMEOUT, DEFAULT_WIT_BASE_URL, WitInterpreter},
    speech::{VoiceGender, VoiceProfile},
};

/// East Africa Time.
pub const DEFAULT_UTC_OFFSET: &str = "+03:00";
const SNAPSHOT_FILE_NAME: &str = "last-weather.json";

fn default_utc_offset() -> String {
    DEFAULT_UTC_OFFSET.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_NLP_TIMEOUT.as_millis() as u64
}

/// Remote NLP settings.
///
/// Example TOML:
/// [nlp]
/// api_key = "..."
/// timeout_ms = 3000
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NlpConfig {
    pub api_key: Option<String>,
    /// Defaults to the public Wit.ai endpoint.
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for NlpConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Name used in greetings and reminders.
    pub user_name: Option<String>,
    #[serde(default)]
    pub language: Language,
    /// Offset used for "today", "3pm" and day boundaries, e.g. "+03:00".
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
    #[serde(default)]
    pub voice_gender: VoiceGender,
    /// Overrides the snapshot location under the platform data directory.
    pub snapshot_path: Option<PathBuf>,
    #[serde(default)]
    pub nlp: NlpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_name: None,
            language: Language::default(),
            utc_offset: default_utc_offset(),
            voice_gender: VoiceGender::default(),
            snapshot_path: None,
            nlp: NlpConfig::default(),
        }
    }
}

impl Config {
    pub fn display_name(&self) -> &str {
        self.user_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("friend")
    }

    pub fn offset(&self) -> Result<FixedOffset> {
        parse_utc_offset(&self.utc_offset)
    }

    pub fn voice_profile(&self) -> VoiceProfile {
        VoiceProfile::for_gender(self.voice_gender)
    }

    pub fn nlp_timeout(&self) -> Duration {
        Duration::from_millis(self.nlp.timeout_ms)
    }

    pub fn is_nlp_configured(&self) -> bool {
        self.nlp.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Set or replace the NLP token.
    pub fn upsert_nlp_api_key(&mut self, api_key: String) {
        self.nlp.api_key = Some(api_key);
    }

    /// Remote-backed assistant when a token is configured and `offline` is
    /// false; keyword-only otherwise.
    pub fn assistant(&self, offline: bool) -> Result<Assistant> {
        let api_key = match (&self.nlp.api_key, offline) {
            (Some(key), false) if self.is_nlp_configured() => key.clone(),
            _ => return Ok(Assistant::offline()),
        };

        let base_url = self.nlp.base_url.as_deref().unwrap_or(DEFAULT_WIT_BASE_URL);
        let timeout = self.nlp_timeout();
        let remote = WitInterpreter::new_with_base_url(api_key, base_url, timeout)
            .context("Failed to build NLP client")?;

        Ok(Assistant::with_remote(Box::new(remote), timeout))
    }

    /// Snapshot file to read: the configured override or the default location.
    pub fn snapshot_file(&self) -> Result<PathBuf> {
        match &self.snapshot_path {
            Some(path) => Ok(path.clone()),
            None => Self::default_snapshot_path(),
        }
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.offset()
            .with_context(|| format!("Invalid utc_offset in {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("ke", "kenya-weather", "kenya-weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    pub fn default_snapshot_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().join(SNAPSHOT_FILE_NAME))
    }
}

/// Parse `+HH:MM`, `-HH:MM`, `Z` or `UTC`.
pub fn parse_utc_offset(value: &str) -> Result<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(|| anyhow!("Invalid UTC offset: {value}"));
    }

    value
        .parse::<FixedOffset>()
        .with_context(|| format!("UTC offset must look like +03:00, got {value:?}"))
}
