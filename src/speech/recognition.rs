//! Speech recognition adapter
//!
//! Wraps a host recognition engine and turns its event stream into two observable
//! values: whether we are listening and the latest finalized transcript. A finished
//! utterance is handed out exactly once, when listening ends with a non-empty
//! transcript.

use crate::config::RecognitionConfig;
use crate::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, info, warn};

/// Parameters handed to the engine before every capture
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecognitionSettings {
    /// BCP 47 language tag
    pub language: String,
    /// Keep capturing across pauses until stopped
    pub continuous: bool,
    /// Report partial hypotheses as well as final ones
    pub interim_results: bool,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            continuous: true,
            interim_results: true,
        }
    }
}

impl From<&RecognitionConfig> for RecognitionSettings {
    fn from(config: &RecognitionConfig) -> Self {
        Self {
            language: config.language.clone(),
            continuous: config.continuous,
            interim_results: config.interim_results,
        }
    }
}

/// One hypothesis in a result batch
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecognitionResult {
    pub transcript: String,
    pub is_final: bool,
}

impl RecognitionResult {
    pub fn finalized(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: true,
        }
    }

    pub fn interim(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: false,
        }
    }
}

/// Notifications emitted by a recognition engine
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Capture has begun
    Started,
    /// A result batch; entries before `result_index` were already reported
    Results {
        result_index: usize,
        results: Vec<RecognitionResult>,
    },
    /// Capture ended normally (stop request, silence, end of input)
    Ended,
    /// Capture ended because of a failure
    Error(String),
}

/// A host speech recognition engine.
///
/// After a successful `start` the engine reports exactly one terminal event,
/// `Ended` or `Error`, and delivers every final result before it.
pub trait RecognitionEngine: Send {
    fn configure(&mut self, settings: &RecognitionSettings);

    fn start(&mut self, events: Sender<RecognitionEvent>) -> Result<()>;

    /// Ask the engine to finish the current capture
    fn stop(&mut self);
}

/// Whether the host can recognize speech at all
pub enum RecognitionCapability {
    Available(Box<dyn RecognitionEngine>),
    Unavailable,
}

/// Listening state exposed to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListeningState {
    Idle,
    Listening,
}

/// Speech input adapter
pub struct SpeechInput {
    engine: Option<Box<dyn RecognitionEngine>>,
    settings: RecognitionSettings,
    state: ListeningState,
    stop_requested: bool,
    transcript: String,
    completed: Option<String>,
    event_tx: Sender<RecognitionEvent>,
    event_rx: Receiver<RecognitionEvent>,
}

impl SpeechInput {
    pub fn new(capability: RecognitionCapability, settings: RecognitionSettings) -> Self {
        let engine = match capability {
            RecognitionCapability::Available(engine) => Some(engine),
            RecognitionCapability::Unavailable => {
                info!("Speech recognition is not available");
                None
            }
        };
        let (event_tx, event_rx) = unbounded();

        Self {
            engine,
            settings,
            state: ListeningState::Idle,
            stop_requested: false,
            transcript: String::new(),
            completed: None,
            event_tx,
            event_rx,
        }
    }

    pub fn unavailable() -> Self {
        Self::new(RecognitionCapability::Unavailable, RecognitionSettings::default())
    }

    pub fn is_supported(&self) -> bool {
        self.engine.is_some()
    }

    pub fn state(&self) -> ListeningState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == ListeningState::Listening
    }

    /// Latest finalized transcript of the current or last capture
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Begin a capture. No-op while listening or when unsupported.
    pub fn start_listening(&mut self) {
        // Settle anything the engine reported since the last poll first
        self.poll();

        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        if self.state == ListeningState::Listening {
            debug!("Already listening");
            return;
        }

        self.transcript.clear();
        self.completed = None;
        engine.configure(&self.settings);

        match engine.start(self.event_tx.clone()) {
            Ok(()) => {
                self.state = ListeningState::Listening;
                self.stop_requested = false;
                info!("Listening ({})", self.settings.language);
            }
            Err(e) => {
                warn!("Speech recognition failed to start: {}", e);
            }
        }
    }

    /// End the current capture. No-op when idle.
    ///
    /// The adapter returns to idle once the engine confirms the end of capture. A
    /// repeated call while that confirmation is outstanding goes idle without it.
    pub fn stop_listening(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        if self.state == ListeningState::Idle {
            return;
        }
        if self.stop_requested {
            self.poll();
            if self.state == ListeningState::Listening {
                warn!("Recognition engine never confirmed the stop, forcing idle");
                self.finish();
            }
            return;
        }

        self.stop_requested = true;
        engine.stop();
        debug!("Stop listening requested");
        self.poll();
    }

    /// Drain engine events
    pub fn poll(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
        }
    }

    /// The completed utterance, handed out once
    pub fn take_utterance(&mut self) -> Option<String> {
        self.completed.take()
    }

    fn handle_event(&mut self, event: RecognitionEvent) {
        match event {
            RecognitionEvent::Started => {
                debug!("Recognition capture started");
            }
            RecognitionEvent::Results {
                result_index,
                results,
            } => {
                let finalized: String = results
                    .iter()
                    .skip(result_index)
                    .filter(|r| r.is_final)
                    .map(|r| r.transcript.as_str())
                    .collect();

                if !finalized.is_empty() {
                    debug!("Transcript: {:?}", finalized);
                    self.transcript = finalized;
                }
            }
            RecognitionEvent::Ended => self.finish(),
            RecognitionEvent::Error(error) => {
                warn!("Speech recognition error: {}", error);
                self.finish();
            }
        }
    }

    fn finish(&mut self) {
        if self.state != ListeningState::Listening {
            return;
        }

        self.state = ListeningState::Idle;
        self.stop_requested = false;
        info!("Stopped listening");

        if !self.transcript.is_empty() {
            self.completed = Some(self.transcript.clone());
        }
    }
}

impl Drop for SpeechInput {
    fn drop(&mut self) {
        if self.state == ListeningState::Listening {
            if let Some(engine) = self.engine.as_mut() {
                engine.stop();
            }
        }
    }
}
