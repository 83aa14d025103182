//! Application configuration
//!
//! Every section has working defaults, so a missing file or a partial file is fine.
//! The file is TOML:
//!
//! ```toml
//! [conversation]
//! speak_delay_ms = 300
//!
//! [synthesis]
//! model_path = "models/vits-piper-en_US-amy-low/en_US-amy-low.onnx"
//! tokens_path = "models/vits-piper-en_US-amy-low/tokens.txt"
//! data_dir = "models/vits-piper-en_US-amy-low/espeak-ng-data"
//! ```

use crate::camera::FacingMode;
use crate::responder::DEFAULT_TIME_FORMAT;
use crate::{ParleyError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub conversation: ConversationConfig,
    pub responder: ResponderConfig,
    pub recognition: RecognitionConfig,
    pub synthesis: SynthesisConfig,
    pub camera: CameraConfig,
    pub ui: UiConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Delay between appending a reply and speaking it
    pub speak_delay_ms: u64,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self { speak_delay_ms: 300 }
    }
}

impl ConversationConfig {
    pub fn speak_delay(&self) -> Duration {
        Duration::from_millis(self.speak_delay_ms)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    /// chrono format string for the time reply
    pub time_format: String,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            time_format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }
}

/// Speech recognition settings, including the Whisper backend
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// BCP 47 language tag
    pub language: String,
    pub continuous: bool,
    pub interim_results: bool,

    /// Path to the Whisper ggml model
    pub model_path: PathBuf,
    pub n_threads: i32,
    /// Silero VAD speech probability threshold
    pub vad_threshold: f32,
    /// Trailing silence after speech that ends capture
    pub silence_timeout_ms: u64,
    /// Hard cap on one capture
    pub max_duration_secs: f32,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            continuous: true,
            interim_results: true,
            model_path: PathBuf::from("models/ggml-base.en.bin"),
            n_threads: 4,
            vad_threshold: 0.5,
            silence_timeout_ms: 1500,
            max_duration_secs: 30.0,
        }
    }
}

impl RecognitionConfig {
    pub fn with_model(mut self, model_path: impl Into<PathBuf>) -> Self {
        self.model_path = model_path.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn silence_timeout(&self) -> Duration {
        Duration::from_millis(self.silence_timeout_ms)
    }
}

/// A selectable voice of the VITS backend
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct VoiceProfile {
    pub name: String,
    pub language: String,
    #[serde(default)]
    pub speaker_id: i32,
}

/// Speech synthesis settings, including the VITS backend
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Language tag used for voice selection
    pub language: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    /// Voice-name fragments that mark a higher quality provider, best first
    pub preferred_providers: Vec<String>,

    pub model_path: String,
    pub tokens_path: String,
    pub lexicon_path: Option<String>,
    pub data_dir: Option<String>,
    /// Voices offered by the model; empty means one default voice
    pub voices: Vec<VoiceProfile>,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            rate: 0.9,
            pitch: 1.0,
            volume: 1.0,
            preferred_providers: vec!["Google".to_string(), "Microsoft".to_string()],
            model_path: String::new(),
            tokens_path: String::new(),
            lexicon_path: None,
            data_dir: None,
            voices: Vec::new(),
        }
    }
}

impl SynthesisConfig {
    pub fn with_model(mut self, model_path: impl Into<String>, tokens_path: impl Into<String>) -> Self {
        self.model_path = model_path.into();
        self.tokens_path = tokens_path.into();
        self
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_preferred_providers(mut self, providers: &[&str]) -> Self {
        self.preferred_providers = providers.iter().map(|p| p.to_string()).collect();
        self
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub facing: FacingMode,
    pub audio: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            facing: FacingMode::User,
            audio: false,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub dark_mode: bool,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            dark_mode: true,
            window_width: 480.0,
            window_height: 760.0,
        }
    }
}

impl AppConfig {
    /// `$CONFIG_DIR/parley/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("parley").join("config.toml"))
    }

    /// Parse a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ParleyError::ConfigError(e.to_string()))
    }

    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ParleyError::ConfigError(format!("{}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&content).map_err(|e| {
            ParleyError::ConfigError(format!("{}: {}", path.display(), e))
        })?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load an explicit path, or the default path when it exists, or fall back to defaults.
    ///
    /// Only an explicit path that cannot be read is an error.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => {
                debug!("No configuration file, using defaults");
                Ok(Self::default())
            }
        }
    }
}
