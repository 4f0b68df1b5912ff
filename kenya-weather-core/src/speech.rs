//! Speech input/output seams and the listen → answer → speak loop.

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::{
    language::Language,
    model::{Forecast, WeatherSample},
    nlp::Assistant,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    #[default]
    Female,
    Male,
}

impl VoiceGender {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceGender::Female => "female",
            VoiceGender::Male => "male",
        }
    }

    pub const fn all() -> &'static [VoiceGender] {
        &[VoiceGender::Female, VoiceGender::Male]
    }
}

impl std::fmt::Display for VoiceGender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for VoiceGender {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "female" => Ok(VoiceGender::Female),
            "male" => Ok(VoiceGender::Male),
            other => Err(anyhow::anyhow!("Unknown voice gender: {other}")),
        }
    }
}

/// Synthesis parameters handed to a [`SpeechOutput`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceProfile {
    pub gender: VoiceGender,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl VoiceProfile {
    pub fn for_gender(gender: VoiceGender) -> Self {
        Self {
            gender,
            rate: 0.9,
            pitch: match gender {
                VoiceGender::Female => 1.1,
                VoiceGender::Male => 0.9,
            },
            volume: 0.8,
        }
    }
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self::for_gender(VoiceGender::default())
    }
}

/// Source of recognized utterances. `Ok(None)` means the input is exhausted.
pub trait SpeechInput {
    fn listen(&mut self) -> Result<Option<String>>;
}

pub trait SpeechOutput {
    fn speak(&mut self, text: &str, profile: &VoiceProfile) -> Result<()>;
}

/// One recognized utterance and the reply spoken for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub transcript: String,
    pub reply: String,
}

/// Owns one input and one output handle. Each call to
/// [`VoiceSession::handle_next`] finishes speaking before it listens again.
pub struct VoiceSession<I, O> {
    input: I,
    output: O,
    profile: VoiceProfile,
}

impl<I: SpeechInput, O: SpeechOutput> VoiceSession<I, O> {
    pub fn new(input: I, output: O, profile: VoiceProfile) -> Self {
        Self { input, output, profile }
    }

    pub fn into_parts(self) -> (I, O) {
        (self.input, self.output)
    }

    /// Capture one utterance, answer it and speak the answer. Blank
    /// utterances are skipped. Returns `Ok(None)` once the input ends.
    pub async fn handle_next(
        &mut self,
        assistant: &Assistant,
        current: Option<&WeatherSample>,
        forecast: &Forecast,
        now: &DateTime<FixedOffset>,
        language: Language,
    ) -> Result<Option<Exchange>> {
        loop {
            let Some(heard) = self.input.listen()? else {
                return Ok(None);
            };
            let transcript = heard.trim().to_lowercase();
            if transcript.is_empty() {
                continue;
            }

            tracing::debug!(%transcript, "heard");
            let reply = assistant
                .answer(&transcript, current, forecast, now, language)
                .await;
            self.output.speak(&reply, &self.profile)?;

            return Ok(Some(Exchange { transcript, reply }));
        }
    }
}
