//! Text stand-ins for a microphone and a speaker.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use kenya_weather_core::{SpeechInput, SpeechOutput, VoiceProfile};

/// Treats each input line as one recognized utterance.
pub struct LineListener<R> {
    reader: R,
    prompt: Option<String>,
}

impl<R: BufRead> LineListener<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, prompt: None }
    }

    /// Printed to stderr before each read.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }
}

impl<R: BufRead> SpeechInput for LineListener<R> {
    fn listen(&mut self) -> Result<Option<String>> {
        if let Some(prompt) = &self.prompt {
            eprint!("{prompt}");
            std::io::stderr().flush().ok();
        }

        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .context("Failed to read from input")?;

        Ok((read > 0).then_some(line))
    }
}

/// Writes each reply as a line of text.
pub struct TextSpeaker<W> {
    writer: W,
}

impl<W: Write> TextSpeaker<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> SpeechOutput for TextSpeaker<W> {
    fn speak(&mut self, text: &str, profile: &VoiceProfile) -> Result<()> {
        tracing::trace!(gender = %profile.gender, rate = profile.rate, pitch = profile.pitch, "speak");
        writeln!(self.writer, "{text}").context("Failed to write reply")?;
        self.writer.flush().context("Failed to flush reply")
    }
}
