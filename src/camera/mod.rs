//! Camera preview
//!
//! The capture device sits behind [`MediaCapture`]; frames flow from a
//! [`CaptureStream`] into a [`VideoSink`] owned by the presentation layer.

mod adapter;
#[cfg(feature = "camera-io")]
pub mod webcam;

pub use adapter::{CameraAdapter, CAMERA_ERROR_MESSAGE};
#[cfg(feature = "camera-io")]
pub use webcam::WebcamCapture;

use crate::Result;
use async_trait::async_trait;
use crossbeam_channel::Receiver;
use serde::Deserialize;
use std::sync::Arc;

/// Which camera to prefer on devices with more than one
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    #[default]
    User,
    Environment,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoConstraints {
    pub facing: FacingMode,
    pub audio: bool,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            facing: FacingMode::User,
            audio: false,
        }
    }
}

impl From<&crate::config::CameraConfig> for VideoConstraints {
    fn from(config: &crate::config::CameraConfig) -> Self {
        Self {
            facing: config.facing,
            audio: config.audio,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackInfo {
    pub id: String,
    pub kind: TrackKind,
    pub label: String,
}

/// One RGBA frame
#[derive(Clone, Debug)]
pub struct VideoFrame {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

impl VideoFrame {
    /// Non-empty, with exactly four bytes per pixel
    pub fn is_well_formed(&self) -> bool {
        self.width
            .checked_mul(self.height)
            .and_then(|pixels| pixels.checked_mul(4))
            .is_some_and(|len| len > 0 && len == self.rgba.len())
    }
}

/// A live capture. `stop` releases every track and must be safe to call twice.
pub trait CaptureStream: Send {
    fn tracks(&self) -> Vec<TrackInfo>;

    fn frames(&self) -> Receiver<VideoFrame>;

    fn stop(&mut self);
}

#[async_trait]
pub trait MediaCapture: Send + Sync {
    async fn request_video(&self, constraints: &VideoConstraints) -> Result<Box<dyn CaptureStream>>;
}

/// Where frames are displayed
pub trait VideoSink: Send + Sync {
    fn attach(&self, frames: Receiver<VideoFrame>) -> Result<()>;

    fn detach(&self);
}

pub enum CaptureCapability {
    Available(Arc<dyn MediaCapture>),
    Unavailable,
}
