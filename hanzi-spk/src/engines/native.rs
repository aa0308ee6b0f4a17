//! Platform speech through the system's command-line synthesizer

use crate::engines::LocalSpeechEngine;
use crate::error::SpeechError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Words per minute both synthesizers treat as normal speed
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// A request for the platform engine
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// BCP-47 tag such as "zh-TW"
    pub language_tag: String,
    /// Multiplier on the engine's normal speed
    pub rate: f32,
    pub voice: Option<DeviceVoice>,
}

/// A voice installed on the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceVoice {
    pub name: String,
    pub lang: String,
}

impl DeviceVoice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechProgram {
    /// `espeak-ng` (Linux and others)
    EspeakNg,
    /// `say` (macOS)
    Say,
}

impl SpeechProgram {
    pub fn for_platform() -> Self {
        if cfg!(target_os = "macos") {
            SpeechProgram::Say
        } else {
            SpeechProgram::EspeakNg
        }
    }

    pub fn command(self) -> &'static str {
        match self {
            SpeechProgram::EspeakNg => "espeak-ng",
            SpeechProgram::Say => "say",
        }
    }

    fn list_args(self) -> &'static [&'static str] {
        match self {
            SpeechProgram::EspeakNg => &["--voices"],
            SpeechProgram::Say => &["-v", "?"],
        }
    }

    /// Command-line arguments for one utterance
    pub fn args(self, utterance: &Utterance) -> Vec<String> {
        let wpm = (BASE_WORDS_PER_MINUTE * utterance.rate).round().clamp(80.0, 450.0) as u32;

        match self {
            SpeechProgram::EspeakNg => {
                // `-v` takes a voice name as listed by `--voices`
                let voice = match &utterance.voice {
                    Some(voice) => voice.name.clone(),
                    None => espeak_language(&utterance.language_tag),
                };
                vec![
                    "-s".to_string(),
                    wpm.to_string(),
                    "-v".to_string(),
                    voice,
                    utterance.text.clone(),
                ]
            }
            SpeechProgram::Say => {
                let mut args = vec!["-r".to_string(), wpm.to_string()];
                if let Some(voice) = &utterance.voice {
                    args.push("-v".to_string());
                    args.push(voice.name.clone());
                }
                args.push(utterance.text.clone());
                args
            }
        }
    }

    /// Parse the program's voice listing
    pub fn parse_voices(self, output: &str) -> Vec<DeviceVoice> {
        match self {
            SpeechProgram::EspeakNg => parse_espeak_voices(output),
            SpeechProgram::Say => parse_say_voices(output),
        }
    }
}

// espeak-ng files Mandarin under `cmn`
fn espeak_language(tag: &str) -> String {
    let tag = tag.to_lowercase();
    if tag == "zh" || tag.starts_with("zh-") || tag.starts_with("zh_") {
        "cmn".to_string()
    } else {
        tag
    }
}

/// `Pty Language Age/Gender VoiceName File Other Languages`
fn parse_espeak_voices(output: &str) -> Vec<DeviceVoice> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let columns: Vec<&str> = line.split_whitespace().collect();
            if columns.len() < 4 {
                return None;
            }
            Some(DeviceVoice::new(columns[3], columns[1]))
        })
        .collect()
}

/// `Name   lang_REGION    # sample sentence`; names may contain spaces
fn parse_say_voices(output: &str) -> Vec<DeviceVoice> {
    output
        .lines()
        .filter_map(|line| {
            let described = line.split('#').next()?.trim_end();
            let (name, lang) = described.rsplit_once(char::is_whitespace)?;
            let name = name.trim();
            if name.is_empty() || lang.is_empty() {
                return None;
            }
            Some(DeviceVoice::new(name, lang))
        })
        .collect()
}

/// Local engine driving `espeak-ng` or `say`
pub struct CommandSpeechEngine {
    program: SpeechProgram,
    available: bool,
}

impl CommandSpeechEngine {
    pub fn new() -> Self {
        Self::with_program(SpeechProgram::for_platform())
    }

    pub fn with_program(program: SpeechProgram) -> Self {
        let available = match program {
            SpeechProgram::EspeakNg => std::process::Command::new(program.command())
                .arg("--version")
                .output()
                .map(|output| output.status.success())
                .unwrap_or(false),
            SpeechProgram::Say => Path::new("/usr/bin/say").exists(),
        };

        if available {
            info!("Local speech engine {} initialized", program.command());
        } else {
            warn!("Local speech engine {} not found", program.command());
        }

        Self { program, available }
    }

    pub fn program(&self) -> SpeechProgram {
        self.program
    }
}

impl Default for CommandSpeechEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocalSpeechEngine for CommandSpeechEngine {
    async fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError> {
        if !self.available {
            return Err(SpeechError::Engine(format!("{} not available", self.program.command())));
        }

        // Arguments go straight to the process, no shell involved
        let text: String = utterance.text.chars().filter(|c| !c.is_control()).collect();
        if text.trim().is_empty() {
            return Err(SpeechError::Synthesizer("Text is empty after sanitization".to_string()));
        }

        let utterance = Utterance {
            text,
            ..utterance.clone()
        };
        let args = self.program.args(&utterance);
        debug!("Running {} {:?}", self.program.command(), args);

        let output = Command::new(self.program.command())
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| SpeechError::Engine(format!("Failed to run {}: {}", self.program.command(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeechError::Engine(format!(
                "{} failed: {}",
                self.program.command(),
                stderr.trim()
            )));
        }

        Ok(())
    }

    async fn list_voices(&self) -> Result<Vec<DeviceVoice>, SpeechError> {
        if !self.available {
            return Ok(vec![]);
        }

        let output = Command::new(self.program.command())
            .args(self.program.list_args())
            .output()
            .await?;

        if !output.status.success() {
            return Err(SpeechError::Engine(format!(
                "{} could not list voices",
                self.program.command()
            )));
        }

        Ok(self.program.parse_voices(&String::from_utf8_lossy(&output.stdout)))
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn name(&self) -> &str {
        self.program.command()
    }
}
