//! Desktop camera backend built on nokhwa
//!
//! The device is opened and read on its own thread, since nokhwa cameras cannot
//! move between threads. Frames are decoded to RGBA and offered to the preview
//! without blocking; a full queue drops the frame.

use super::{CaptureStream, FacingMode, MediaCapture, TrackInfo, TrackKind, VideoConstraints, VideoFrame};
use crate::{ParleyError, Result};
use async_trait::async_trait;
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use nokhwa::pixel_format::RgbAFormat;
use nokhwa::utils::{ApiBackend, RequestedFormat, RequestedFormatType};
use nokhwa::{query, Camera, NokhwaError};
use std::thread::{self, JoinHandle};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

const FRAME_QUEUE: usize = 2;
const MAX_FRAME_FAILURES: u32 = 30;

const USER_HINTS: &[&str] = &["front", "facetime", "user", "integrated", "built-in", "webcam"];
const ENVIRONMENT_HINTS: &[&str] = &["back", "rear", "environment", "world"];

fn camera_error(e: NokhwaError) -> ParleyError {
    ParleyError::CameraError(e.to_string())
}

/// Index of the device to open for `facing`, preferring names that hint at the
/// requested side and falling back to the first device
fn pick_device(names: &[String], facing: FacingMode) -> Option<usize> {
    if names.is_empty() {
        return None;
    }

    let hints = match facing {
        FacingMode::User => USER_HINTS,
        FacingMode::Environment => ENVIRONMENT_HINTS,
    };

    names
        .iter()
        .position(|name| {
            let name = name.to_lowercase();
            hints.iter().any(|hint| name.contains(hint))
        })
        .or(Some(0))
}

pub struct WebcamCapture;

impl WebcamCapture {
    /// Fails when no camera is connected
    pub fn new() -> Result<Self> {
        let devices = query(ApiBackend::Auto).map_err(camera_error)?;
        if devices.is_empty() {
            return Err(ParleyError::CameraError("No camera found".into()));
        }

        for device in &devices {
            debug!("Camera {}: {}", device.index().as_string(), device.human_name());
        }
        info!("Found {} camera(s)", devices.len());
        Ok(Self)
    }
}

#[async_trait]
impl MediaCapture for WebcamCapture {
    async fn request_video(&self, constraints: &VideoConstraints) -> Result<Box<dyn CaptureStream>> {
        if constraints.audio {
            debug!("Webcam capture has no audio track, ignoring");
        }

        let facing = constraints.facing;
        let (ready_tx, ready_rx) = oneshot::channel();
        let (frames_tx, frames_rx) = bounded(FRAME_QUEUE);
        let (stop_tx, stop_rx) = bounded(1);

        let worker = thread::Builder::new()
            .name("webcam-capture".into())
            .spawn(move || capture_loop(facing, ready_tx, frames_tx, stop_rx))
            .map_err(|e| ParleyError::CameraError(format!("Failed to spawn capture thread: {}", e)))?;

        let track = ready_rx
            .await
            .map_err(|_| ParleyError::CameraError("Capture thread exited before opening".into()))??;

        Ok(Box::new(WebcamStream {
            track,
            frames: frames_rx,
            stop_tx: Some(stop_tx),
            worker: Some(worker),
        }))
    }
}

pub struct WebcamStream {
    track: TrackInfo,
    frames: Receiver<VideoFrame>,
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl CaptureStream for WebcamStream {
    fn tracks(&self) -> Vec<TrackInfo> {
        vec![self.track.clone()]
    }

    fn frames(&self) -> Receiver<VideoFrame> {
        self.frames.clone()
    }

    /// Signal the capture thread and wait for it to close the device
    fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.try_send(());
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Webcam capture thread panicked");
            }
        }
    }
}

impl Drop for WebcamStream {
    fn drop(&mut self) {
        self.stop();
    }
}

fn open_camera(facing: FacingMode) -> Result<Camera> {
    let devices = query(ApiBackend::Auto).map_err(camera_error)?;
    let names: Vec<String> = devices.iter().map(|d| d.human_name()).collect();
    let device = pick_device(&names, facing)
        .and_then(|i| devices.get(i))
        .ok_or_else(|| ParleyError::CameraError("No camera found".into()))?;

    let format = RequestedFormat::new::<RgbAFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
    let mut camera = Camera::new(device.index().clone(), format).map_err(camera_error)?;
    camera.open_stream().map_err(camera_error)?;
    Ok(camera)
}

fn capture_loop(
    facing: FacingMode,
    ready: oneshot::Sender<Result<TrackInfo>>,
    frames: Sender<VideoFrame>,
    stop: Receiver<()>,
) {
    let mut camera = match open_camera(facing) {
        Ok(camera) => camera,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    let info = camera.info().clone();
    let track = TrackInfo {
        id: info.index().as_string(),
        kind: TrackKind::Video,
        label: info.human_name(),
    };
    info!("Camera opened: {}", track.label);

    // Skip the read loop when the requester stopped waiting
    if ready.send(Ok(track)).is_ok() {
        let mut failures = 0;
        loop {
            match stop.try_recv() {
                Err(TryRecvError::Empty) => {}
                _ => break,
            }

            match camera.frame().and_then(|buffer| buffer.decode_image::<RgbAFormat>()) {
                Ok(image) => {
                    failures = 0;
                    let frame = VideoFrame {
                        width: image.width() as usize,
                        height: image.height() as usize,
                        rgba: image.into_raw(),
                    };
                    if let Err(TrySendError::Disconnected(_)) = frames.try_send(frame) {
                        break;
                    }
                }
                Err(e) => {
                    failures += 1;
                    warn!("Camera frame failed: {}", e);
                    if failures >= MAX_FRAME_FAILURES {
                        error!("Camera stopped delivering frames");
                        break;
                    }
                }
            }
        }
    }

    if let Err(e) = camera.stop_stream() {
        warn!("Failed to stop camera stream: {}", e);
    }
    info!("Camera released");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_prefers_front_camera_for_user() {
        let devices = names(&["OBS Virtual Camera", "FaceTime HD Camera", "Back Camera"]);
        assert_eq!(pick_device(&devices, FacingMode::User), Some(1));
        assert_eq!(pick_device(&devices, FacingMode::Environment), Some(2));
    }

    #[test]
    fn test_falls_back_to_first_device() {
        let devices = names(&["USB2.0 HD UVC", "Capture Card"]);
        assert_eq!(pick_device(&devices, FacingMode::User), Some(0));
        assert_eq!(pick_device(&devices, FacingMode::Environment), Some(0));
    }

    #[test]
    fn test_no_devices() {
        assert_eq!(pick_device(&[], FacingMode::User), None);
    }
}
