//! Desktop recognition engine: microphone, Silero VAD and Whisper
//!
//! A capture runs on its own thread. Speech is segmented by trailing silence; each
//! segment is transcribed by Whisper and reported as a final result. Continuous
//! captures keep going until stopped, single-shot captures end after the first segment.

use super::recognition::{RecognitionEngine, RecognitionEvent, RecognitionResult, RecognitionSettings};
use crate::audio::{AudioInput, AudioResampler};
use crate::config::RecognitionConfig;
use crate::{ParleyError, Result};
use crossbeam_channel::{bounded, select, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use voice_activity_detector::VoiceActivityDetector;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Whisper and Silero both expect 16 kHz mono
const WHISPER_SAMPLE_RATE: u32 = 16000;
const VAD_CHUNK: usize = 512;
const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct WhisperRecognizer {
    config: RecognitionConfig,
    context: Arc<WhisperContext>,
    settings: RecognitionSettings,
    running: Arc<AtomicBool>,
    stop_tx: Option<Sender<()>>,
}

impl WhisperRecognizer {
    /// Load the Whisper model named in `config`
    pub fn new(config: RecognitionConfig) -> Result<Self> {
        info!("Loading Whisper model from: {:?}", config.model_path);

        if !config.model_path.exists() {
            return Err(ParleyError::ModelLoadError(format!(
                "Model file not found: {:?}",
                config.model_path
            )));
        }

        let path = config
            .model_path
            .to_str()
            .ok_or_else(|| ParleyError::ModelLoadError("Invalid model path".to_string()))?;

        let context = WhisperContext::new_with_params(path, WhisperContextParameters::default())
            .map_err(|e| ParleyError::ModelLoadError(format!("Failed to load Whisper model: {:?}", e)))?;

        info!("Whisper model loaded successfully");

        Ok(Self {
            settings: RecognitionSettings::from(&config),
            config,
            context: Arc::new(context),
            running: Arc::new(AtomicBool::new(false)),
            stop_tx: None,
        })
    }
}

impl RecognitionEngine for WhisperRecognizer {
    fn configure(&mut self, settings: &RecognitionSettings) {
        self.settings = settings.clone();
    }

    fn start(&mut self, events: Sender<RecognitionEvent>) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ParleyError::RecognitionError("A capture is already running".into()));
        }

        let (stop_tx, stop_rx) = bounded(1);
        let mut guard = CaptureGuard {
            running: Arc::clone(&self.running),
            events: events.clone(),
            terminal: None,
        };
        let capture = Capture {
            context: Arc::clone(&self.context),
            config: self.config.clone(),
            settings: self.settings.clone(),
            stop_rx,
            events,
        };

        let spawned = thread::Builder::new()
            .name("whisper-capture".into())
            .spawn(move || {
                guard.terminal = Some(capture.run());
            });

        if let Err(e) = spawned {
            self.running.store(false, Ordering::SeqCst);
            return Err(ParleyError::RecognitionError(format!(
                "Failed to spawn capture thread: {}",
                e
            )));
        }

        self.stop_tx = Some(stop_tx);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.try_send(());
        }
    }
}

impl Drop for WhisperRecognizer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Reports the end of a capture and frees the recognizer for the next one.
///
/// Runs on drop, so a capture thread that unwinds still reports a terminal event.
struct CaptureGuard {
    running: Arc<AtomicBool>,
    events: Sender<RecognitionEvent>,
    terminal: Option<RecognitionEvent>,
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        let terminal = self.terminal.take().unwrap_or_else(|| {
            error!("Capture thread exited without finishing");
            RecognitionEvent::Error("Capture stopped unexpectedly".into())
        });
        self.running.store(false, Ordering::SeqCst);
        let _ = self.events.send(terminal);
    }
}

/// State owned by one capture thread
struct Capture {
    context: Arc<WhisperContext>,
    config: RecognitionConfig,
    settings: RecognitionSettings,
    stop_rx: Receiver<()>,
    events: Sender<RecognitionEvent>,
}

impl Capture {
    /// Capture until stopped and return the terminal event
    fn run(self) -> RecognitionEvent {
        match self.listen() {
            Ok(()) => RecognitionEvent::Ended,
            Err(e) => {
                error!("Capture failed: {}", e);
                RecognitionEvent::Error(e.to_string())
            }
        }
    }

    fn listen(&self) -> Result<()> {
        let mut input = AudioInput::open()?;
        let (samples_tx, samples_rx) = bounded::<Vec<f32>>(64);
        let mut resampler = AudioResampler::new(input.sample_rate(), WHISPER_SAMPLE_RATE)?;

        let mut vad = VoiceActivityDetector::builder()
            .sample_rate(WHISPER_SAMPLE_RATE as i32)
            .chunk_size(VAD_CHUNK)
            .build()
            .map_err(|e| ParleyError::AudioProcessingError(format!("Failed to create VAD: {:?}", e)))?;

        input.start(samples_tx)?;
        let _ = self.events.send(RecognitionEvent::Started);

        let started = Instant::now();
        let max_duration = Duration::from_secs_f32(self.config.max_duration_secs.max(1.0));
        let mut segment = Segment::default();
        let mut results = Vec::new();

        loop {
            select! {
                recv(self.stop_rx) -> _ => break,
                recv(samples_rx) -> block => {
                    let Ok(block) = block else { break };
                    let resampled = resampler.push(&block)?;
                    segment.feed(&resampled, &mut vad, self.config.vad_threshold);
                }
                default(POLL_INTERVAL) => {}
            }

            if segment.ended(self.config.silence_timeout()) {
                self.finish_segment(&mut segment, &mut results)?;
                if !self.settings.continuous {
                    break;
                }
            }

            if started.elapsed() >= max_duration {
                debug!("Capture reached its maximum duration");
                break;
            }
        }

        input.stop();
        let tail = resampler.flush()?;
        segment.audio.extend_from_slice(&tail);
        self.finish_segment(&mut segment, &mut results)?;

        Ok(())
    }

    /// Transcribe a segment that contained speech and report it
    fn finish_segment(&self, segment: &mut Segment, results: &mut Vec<RecognitionResult>) -> Result<()> {
        let segment = std::mem::take(segment);
        if segment.last_voice.is_none() {
            return Ok(());
        }

        let text = transcribe(&self.context, &segment.audio, &self.settings.language, self.config.n_threads)?;
        if text.is_empty() {
            return Ok(());
        }

        results.push(RecognitionResult::finalized(text));
        let _ = self.events.send(RecognitionEvent::Results {
            result_index: results.len() - 1,
            results: results.clone(),
        });
        Ok(())
    }
}

/// Audio since the last finished segment
#[derive(Default)]
struct Segment {
    audio: Vec<f32>,
    vad_pending: Vec<f32>,
    last_voice: Option<Instant>,
}

impl Segment {
    fn feed(&mut self, samples: &[f32], vad: &mut VoiceActivityDetector, threshold: f32) {
        self.audio.extend_from_slice(samples);
        self.vad_pending.extend_from_slice(samples);

        while self.vad_pending.len() >= VAD_CHUNK {
            let chunk: Vec<f32> = self.vad_pending.drain(..VAD_CHUNK).collect();
            if vad.predict(chunk) >= threshold {
                self.last_voice = Some(Instant::now());
            }
        }
    }

    /// Speech was heard and has been followed by enough silence
    fn ended(&self, silence: Duration) -> bool {
        self.last_voice
            .map(|at| at.elapsed() >= silence)
            .unwrap_or(false)
    }
}

fn transcribe(context: &WhisperContext, samples: &[f32], language: &str, n_threads: i32) -> Result<String> {
    if samples.is_empty() {
        return Ok(String::new());
    }

    debug!(
        "Transcribing {:.2}s of audio",
        samples.len() as f32 / WHISPER_SAMPLE_RATE as f32
    );

    // Whisper takes ISO 639-1 codes
    let primary = language.split(['-', '_']).next().unwrap_or("en").to_lowercase();

    let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
    params.set_n_threads(n_threads);
    params.set_translate(false);
    params.set_print_special(false);
    params.set_print_progress(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);
    params.set_language(Some(&primary));

    let mut state = context
        .create_state()
        .map_err(|e| ParleyError::RecognitionError(format!("Failed to create state: {:?}", e)))?;

    state
        .full(params, samples)
        .map_err(|e| ParleyError::RecognitionError(format!("Transcription failed: {:?}", e)))?;

    let segments = state
        .full_n_segments()
        .map_err(|e| ParleyError::RecognitionError(format!("Failed to get segments: {:?}", e)))?;

    let mut text = String::new();
    for i in 0..segments {
        match state.full_get_segment_text(i) {
            Ok(segment) => text.push_str(&segment),
            Err(e) => warn!("Skipping unreadable segment {}: {:?}", i, e),
        }
    }

    let text = text.trim().to_string();
    debug!("Transcription result: {:?}", text);
    Ok(text)
}
