pub mod audio;
pub mod camera;
pub mod config;
pub mod conversation;
pub mod messages;
pub mod responder;
pub mod speech;
pub mod ui;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ParleyError {
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    #[error("Model load error: {0}")]
    ModelLoadError(String),

    #[error("Recognition error: {0}")]
    RecognitionError(String),

    #[error("Synthesis error: {0}")]
    SynthesisError(String),

    #[error("Camera error: {0}")]
    CameraError(String),

    #[error("Audio processing error: {0}")]
    AudioProcessingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl From<std::io::Error> for ParleyError {
    fn from(e: std::io::Error) -> Self {
        ParleyError::IOError(e.to_string())
    }
}

impl ParleyError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Hardware needs the user to plug in or free a device
            ParleyError::AudioDeviceError(_) => false,
            ParleyError::ModelLoadError(_) => false,
            // A new attempt from the mic/speaker/camera control may succeed
            ParleyError::RecognitionError(_) => true,
            ParleyError::SynthesisError(_) => true,
            ParleyError::CameraError(_) => true,
            ParleyError::AudioProcessingError(_) => true,
            ParleyError::ConfigError(_) => false,
            ParleyError::IOError(_) => false,
            ParleyError::ChannelError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            ParleyError::AudioDeviceError(_) => {
                "Audio device error. Please check your microphone/speakers.".to_string()
            }
            ParleyError::ModelLoadError(_) => {
                "Failed to load a speech model. Voice features are disabled.".to_string()
            }
            ParleyError::RecognitionError(_) => {
                "Speech recognition failed. Please try again.".to_string()
            }
            ParleyError::SynthesisError(_) => {
                "Text-to-speech failed. Replies will be shown as text.".to_string()
            }
            ParleyError::CameraError(_) => "Failed to access camera".to_string(),
            ParleyError::AudioProcessingError(_) => {
                "Audio processing failed. Please try again.".to_string()
            }
            ParleyError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            ParleyError::IOError(_) => "File system error occurred.".to_string(),
            ParleyError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ParleyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(ParleyError::CameraError("busy".into()).is_recoverable());
        assert!(ParleyError::SynthesisError("x".into()).is_recoverable());
        assert!(!ParleyError::ModelLoadError("missing".into()).is_recoverable());
        assert!(!ParleyError::ConfigError("bad".into()).is_recoverable());
    }

    #[test]
    fn test_camera_user_message_is_generic() {
        let err = ParleyError::CameraError("NotAllowedError: permission denied".into());
        assert_eq!(err.user_message(), "Failed to access camera");
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml");
        let err: ParleyError = io.into();
        assert!(matches!(err, ParleyError::IOError(ref m) if m.contains("config.toml")));
    }
}
