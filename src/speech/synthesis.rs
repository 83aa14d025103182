//! Speech synthesis adapter
//!
//! Speaks one reply at a time. Starting a new utterance cancels the previous one,
//! and events from a cancelled utterance are ignored.

use crate::config::SynthesisConfig;
use crate::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, info, warn};

/// A voice offered by the engine
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    /// BCP 47 language tag
    pub language: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
        }
    }
}

/// One request to speak
#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    pub id: u64,
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    pub voice: Option<Voice>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SynthesisEvent {
    Started(u64),
    Ended(u64),
    Failed { id: u64, reason: String },
}

/// A host speech synthesis engine.
///
/// `cancel` stops whatever is playing and discards anything queued.
pub trait SynthesisEngine: Send {
    fn voices(&self) -> Vec<Voice>;

    fn speak(&mut self, utterance: Utterance, events: Sender<SynthesisEvent>) -> Result<()>;

    fn cancel(&mut self);
}

pub enum SynthesisCapability {
    Available(Box<dyn SynthesisEngine>),
    Unavailable,
}

/// Prosody and voice preferences applied to every utterance
#[derive(Clone, Debug, PartialEq)]
pub struct SpeechParams {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    pub language: String,
    pub preferred_providers: Vec<String>,
}

impl Default for SpeechParams {
    fn default() -> Self {
        Self::from(&SynthesisConfig::default())
    }
}

impl From<&SynthesisConfig> for SpeechParams {
    fn from(config: &SynthesisConfig) -> Self {
        Self {
            rate: config.rate,
            pitch: config.pitch,
            volume: config.volume,
            language: config.language.clone(),
            preferred_providers: config.preferred_providers.clone(),
        }
    }
}

/// Pick a voice: first one whose name contains a preferred provider (in provider
/// order), otherwise the first one matching the primary language subtag.
pub fn select_voice(voices: &[Voice], preferred_providers: &[String], language: &str) -> Option<Voice> {
    for provider in preferred_providers {
        if let Some(voice) = voices.iter().find(|v| v.name.contains(provider.as_str())) {
            return Some(voice.clone());
        }
    }

    let primary = language.split(['-', '_']).next().unwrap_or(language).to_lowercase();
    if primary.is_empty() {
        return None;
    }

    voices
        .iter()
        .find(|v| v.language.to_lowercase().starts_with(&primary))
        .cloned()
}

/// Speech output adapter
pub struct SpeechOutput {
    engine: Option<Box<dyn SynthesisEngine>>,
    params: SpeechParams,
    voice: Option<Voice>,
    speaking: bool,
    current: Option<u64>,
    next_id: u64,
    event_tx: Sender<SynthesisEvent>,
    event_rx: Receiver<SynthesisEvent>,
}

impl SpeechOutput {
    pub fn new(capability: SynthesisCapability, params: SpeechParams) -> Self {
        let engine = match capability {
            SynthesisCapability::Available(engine) => Some(engine),
            SynthesisCapability::Unavailable => {
                info!("Speech synthesis is not available");
                None
            }
        };

        let voice = engine.as_ref().and_then(|engine| {
            select_voice(&engine.voices(), &params.preferred_providers, &params.language)
        });
        if let Some(voice) = &voice {
            info!("Using voice {} ({})", voice.name, voice.language);
        }

        let (event_tx, event_rx) = unbounded();

        Self {
            engine,
            params,
            voice,
            speaking: false,
            current: None,
            next_id: 0,
            event_tx,
            event_rx,
        }
    }

    pub fn unavailable() -> Self {
        Self::new(SynthesisCapability::Unavailable, SpeechParams::default())
    }

    pub fn is_supported(&self) -> bool {
        self.engine.is_some()
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    pub fn voice(&self) -> Option<&Voice> {
        self.voice.as_ref()
    }

    /// Speak `text`, cancelling anything in progress
    pub fn speak(&mut self, text: &str) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        engine.cancel();
        self.speaking = false;

        self.next_id += 1;
        let utterance = Utterance {
            id: self.next_id,
            text: text.to_string(),
            rate: self.params.rate,
            pitch: self.params.pitch,
            volume: self.params.volume,
            voice: self.voice.clone(),
        };

        match engine.speak(utterance, self.event_tx.clone()) {
            Ok(()) => {
                self.current = Some(self.next_id);
                debug!("Speaking utterance {}", self.next_id);
            }
            Err(e) => {
                self.current = None;
                warn!("Failed to speak: {}", e);
            }
        }

        self.poll();
    }

    /// Cancel all speech
    pub fn stop(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        engine.cancel();
        self.speaking = false;
        self.current = None;
        self.poll();
    }

    /// Drain engine events
    pub fn poll(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: SynthesisEvent) {
        let id = match &event {
            SynthesisEvent::Started(id) | SynthesisEvent::Ended(id) => *id,
            SynthesisEvent::Failed { id, .. } => *id,
        };
        if self.current != Some(id) {
            debug!("Ignoring stale synthesis event {:?}", event);
            return;
        }

        match event {
            SynthesisEvent::Started(_) => self.speaking = true,
            SynthesisEvent::Ended(_) => {
                self.speaking = false;
                self.current = None;
            }
            SynthesisEvent::Failed { reason, .. } => {
                warn!("Speech synthesis failed: {}", reason);
                self.speaking = false;
                self.current = None;
            }
        }
    }
}

impl Drop for SpeechOutput {
    fn drop(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.cancel();
        }
    }
}
