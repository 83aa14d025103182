//! Desktop synthesis engine: sherpa-rs VITS voices played through cpal
//!
//! The model and the output device live on one worker thread. Each utterance is
//! synthesized whole, resampled to the device rate and queued for playback.
//! Cancellation bumps an epoch; the worker drops any utterance from an older epoch
//! and clears the device queue.

use super::normalize::normalize_for_speech;
use super::synthesis::{SynthesisEngine, SynthesisEvent, Utterance, Voice};
use crate::audio::{resample_all, AudioOutput};
use crate::config::{SynthesisConfig, VoiceProfile};
use crate::{ParleyError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use sherpa_rs::tts::{VitsTts, VitsTtsConfig};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const DEFAULT_VOICE_NAME: &str = "Piper VITS";
const DRAIN_POLL: Duration = Duration::from_millis(20);

enum SynthesisCommand {
    Speak {
        utterance: Utterance,
        events: Sender<SynthesisEvent>,
        epoch: u64,
    },
    Shutdown,
}

pub struct VitsSynthesizer {
    voices: Vec<Voice>,
    command_tx: Sender<SynthesisCommand>,
    epoch: Arc<AtomicU64>,
}

impl VitsSynthesizer {
    /// Check the model files and start the playback worker
    pub fn new(config: SynthesisConfig) -> Result<Self> {
        if config.model_path.is_empty() {
            return Err(ParleyError::ConfigError("Synthesis model path is required".into()));
        }
        if config.tokens_path.is_empty() {
            return Err(ParleyError::ConfigError("Synthesis tokens path is required".into()));
        }
        for path in [&config.model_path, &config.tokens_path] {
            if !Path::new(path).exists() {
                return Err(ParleyError::ModelLoadError(format!("Model file not found: {}", path)));
            }
        }

        let voices = if config.voices.is_empty() {
            vec![Voice::new(DEFAULT_VOICE_NAME, config.language.clone())]
        } else {
            config
                .voices
                .iter()
                .map(|profile| Voice::new(profile.name.clone(), profile.language.clone()))
                .collect()
        };

        let (command_tx, command_rx) = unbounded();
        let epoch = Arc::new(AtomicU64::new(0));
        let worker_epoch = Arc::clone(&epoch);

        thread::Builder::new()
            .name("vits-playback".into())
            .spawn(move || playback_worker(config, command_rx, worker_epoch))
            .map_err(|e| ParleyError::SynthesisError(format!("Failed to spawn worker: {}", e)))?;

        Ok(Self {
            voices,
            command_tx,
            epoch,
        })
    }
}

impl SynthesisEngine for VitsSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speak(&mut self, utterance: Utterance, events: Sender<SynthesisEvent>) -> Result<()> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        self.command_tx
            .send(SynthesisCommand::Speak {
                utterance,
                events,
                epoch,
            })
            .map_err(|_| ParleyError::ChannelError("Synthesis worker has stopped".into()))
    }

    fn cancel(&mut self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }
}

impl Drop for VitsSynthesizer {
    fn drop(&mut self) {
        self.cancel();
        let _ = self.command_tx.send(SynthesisCommand::Shutdown);
    }
}

fn playback_worker(config: SynthesisConfig, commands: Receiver<SynthesisCommand>, epoch: Arc<AtomicU64>) {
    info!("Loading VITS model from: {}", config.model_path);

    let mut tts = VitsTts::new(VitsTtsConfig {
        model: config.model_path.clone(),
        tokens: config.tokens_path.clone(),
        lexicon: config.lexicon_path.clone().unwrap_or_default(),
        data_dir: config.data_dir.clone().unwrap_or_default(),
        length_scale: 1.0,
        noise_scale: 0.667,
        noise_scale_w: 0.8,
        ..Default::default()
    });

    let output = match AudioOutput::open() {
        Ok(output) => Some(output),
        Err(e) => {
            error!("Speech output unavailable: {}", e);
            None
        }
    };

    info!("Synthesis worker ready");

    while let Ok(command) = commands.recv() {
        let (utterance, events, issued) = match command {
            SynthesisCommand::Speak {
                utterance,
                events,
                epoch,
            } => (utterance, events, epoch),
            SynthesisCommand::Shutdown => break,
        };

        if issued != epoch.load(Ordering::SeqCst) {
            debug!("Skipping cancelled utterance {}", utterance.id);
            continue;
        }

        let Some(output) = output.as_ref() else {
            let _ = events.send(SynthesisEvent::Failed {
                id: utterance.id,
                reason: "No audio output device".into(),
            });
            continue;
        };

        let speaker_id = speaker_for(&config.voices, utterance.voice.as_ref());
        let samples = match render(&mut tts, &utterance, speaker_id, output.sample_rate()) {
            Ok(samples) => samples,
            Err(e) => {
                warn!("Synthesis failed for utterance {}: {}", utterance.id, e);
                let _ = events.send(SynthesisEvent::Failed {
                    id: utterance.id,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if issued != epoch.load(Ordering::SeqCst) {
            continue;
        }

        output.enqueue(&samples);
        let _ = events.send(SynthesisEvent::Started(utterance.id));

        while !output.is_drained() {
            if issued != epoch.load(Ordering::SeqCst) {
                output.clear();
                break;
            }
            thread::sleep(DRAIN_POLL);
        }

        let _ = events.send(SynthesisEvent::Ended(utterance.id));
    }

    info!("Synthesis worker stopped");
}

fn speaker_for(profiles: &[VoiceProfile], voice: Option<&Voice>) -> i32 {
    voice
        .and_then(|voice| profiles.iter().find(|p| p.name == voice.name))
        .map(|p| p.speaker_id)
        .unwrap_or(0)
}

/// Synthesize one utterance at the device rate
fn render(tts: &mut VitsTts, utterance: &Utterance, speaker_id: i32, device_rate: u32) -> Result<Vec<f32>> {
    let text = normalize_for_speech(&utterance.text);
    if text.is_empty() {
        return Ok(Vec::new());
    }

    if (utterance.pitch - 1.0).abs() > f32::EPSILON {
        debug!("VITS voices ignore pitch {}", utterance.pitch);
    }

    let audio = tts
        .create(&text, speaker_id, utterance.rate)
        .map_err(|e| ParleyError::SynthesisError(format!("Synthesis failed: {}", e)))?;

    let mut samples = resample_all(&audio.samples, audio.sample_rate as u32, device_rate)?;
    let volume = utterance.volume.clamp(0.0, 1.0);
    for sample in samples.iter_mut() {
        *sample *= volume;
    }

    debug!(
        "Rendered utterance {} ({:.2}s)",
        utterance.id,
        samples.len() as f32 / device_rate as f32
    );
    Ok(samples)
}
