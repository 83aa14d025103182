use crate::camera::{CaptureCapability, VideoSink};
use crate::config::AppConfig;
use crate::speech::{RecognitionCapability, SynthesisCapability};
use std::sync::Arc;
#[cfg(not(feature = "camera-io"))]
use tracing::info;
#[cfg(any(feature = "audio-io", feature = "camera-io"))]
use tracing::warn;

/// Device capabilities handed to the controller
pub struct Capabilities {
    pub recognition: RecognitionCapability,
    pub synthesis: SynthesisCapability,
    pub capture: CaptureCapability,
    pub video_sink: Arc<dyn VideoSink>,
}

impl Capabilities {
    /// No devices at all; the assistant still answers typed messages
    pub fn unavailable(video_sink: Arc<dyn VideoSink>) -> Self {
        Self {
            recognition: RecognitionCapability::Unavailable,
            synthesis: SynthesisCapability::Unavailable,
            capture: CaptureCapability::Unavailable,
            video_sink,
        }
    }

    /// Build the desktop backends. A backend that fails to load is reported
    /// as unavailable.
    pub fn desktop(config: &AppConfig, video_sink: Arc<dyn VideoSink>) -> Self {
        #[cfg_attr(not(any(feature = "audio-io", feature = "camera-io")), allow(unused_mut))]
        let mut capabilities = Self::unavailable(video_sink);

        #[cfg(feature = "audio-io")]
        {
            use crate::speech::{VitsSynthesizer, WhisperRecognizer};

            match WhisperRecognizer::new(config.recognition.clone()) {
                Ok(engine) => capabilities.recognition = RecognitionCapability::Available(Box::new(engine)),
                Err(e) => warn!("Voice input disabled: {}", e),
            }

            match VitsSynthesizer::new(config.synthesis.clone()) {
                Ok(engine) => capabilities.synthesis = SynthesisCapability::Available(Box::new(engine)),
                Err(e) => warn!("Spoken replies disabled: {}", e),
            }
        }

        #[cfg(not(feature = "audio-io"))]
        let _ = config;

        #[cfg(feature = "camera-io")]
        {
            use crate::camera::WebcamCapture;

            match WebcamCapture::new() {
                Ok(capture) => capabilities.capture = CaptureCapability::Available(Arc::new(capture)),
                Err(e) => warn!("Camera preview disabled: {}", e),
            }
        }

        #[cfg(not(feature = "camera-io"))]
        info!("Camera preview disabled in this build");

        capabilities
    }
}
