//! Speech input and output
//!
//! This module provides:
//! - Speech recognition behind an injectable engine (`recognition`)
//! - Speech synthesis behind an injectable engine (`synthesis`)
//! - Desktop engines: Whisper for recognition, VITS (sherpa-rs) for synthesis

pub mod normalize;
pub mod recognition;
pub mod synthesis;
#[cfg(feature = "audio-io")]
pub mod vits;
#[cfg(feature = "audio-io")]
pub mod whisper;

pub use normalize::normalize_for_speech;
pub use recognition::{
    ListeningState, RecognitionCapability, RecognitionEngine, RecognitionEvent, RecognitionResult,
    RecognitionSettings, SpeechInput,
};
pub use synthesis::{
    select_voice, SpeechOutput, SpeechParams, SynthesisCapability, SynthesisEngine,
    SynthesisEvent, Utterance, Voice,
};
#[cfg(feature = "audio-io")]
pub use vits::VitsSynthesizer;
#[cfg(feature = "audio-io")]
pub use whisper::WhisperRecognizer;
