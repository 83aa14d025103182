use crate::camera::{VideoFrame, VideoSink};
use crate::Result;
use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use tracing::{debug, warn};

/// Camera preview surface.
///
/// Holds the attached frame stream; the UI pulls the newest frame each paint.
#[derive(Default)]
pub struct VideoPreview {
    frames: Mutex<Option<Receiver<VideoFrame>>>,
    latest: Mutex<Option<VideoFrame>>,
}

impl VideoPreview {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_attached(&self) -> bool {
        self.frames.lock().is_some()
    }

    /// Drain pending frames, keeping only the newest well-formed one. Returns it when one arrived.
    pub fn take_latest(&self) -> Option<VideoFrame> {
        let newest = {
            let frames = self.frames.lock();
            frames.as_ref().and_then(|rx| {
                rx.try_iter()
                    .filter(|frame| {
                        let ok = frame.is_well_formed();
                        if !ok {
                            warn!(
                                "Dropping malformed {}x{} frame ({} bytes)",
                                frame.width,
                                frame.height,
                                frame.rgba.len()
                            );
                        }
                        ok
                    })
                    .last()
            })
        };

        match newest {
            Some(frame) => {
                *self.latest.lock() = Some(frame.clone());
                Some(frame)
            }
            None => None,
        }
    }

    /// Last frame seen, if still attached
    pub fn current(&self) -> Option<VideoFrame> {
        self.latest.lock().clone()
    }
}

impl VideoSink for VideoPreview {
    fn attach(&self, frames: Receiver<VideoFrame>) -> Result<()> {
        debug!("Preview attached");
        *self.frames.lock() = Some(frames);
        Ok(())
    }

    fn detach(&self) {
        debug!("Preview detached");
        *self.frames.lock() = None;
        *self.latest.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    fn frame(shade: u8) -> VideoFrame {
        VideoFrame {
            width: 1,
            height: 1,
            rgba: vec![shade, shade, shade, 255],
        }
    }

    #[test]
    fn test_keeps_newest_frame() {
        let preview = VideoPreview::new();
        let (tx, rx) = unbounded();
        preview.attach(rx).unwrap();

        tx.send(frame(1)).unwrap();
        tx.send(frame(2)).unwrap();
        assert_eq!(preview.take_latest().unwrap().rgba[0], 2);
        assert!(preview.take_latest().is_none());
        assert_eq!(preview.current().unwrap().rgba[0], 2);

        preview.detach();
        assert!(!preview.is_attached());
        assert!(preview.current().is_none());
    }

    #[test]
    fn test_malformed_frames_are_dropped() {
        let preview = VideoPreview::new();
        let (tx, rx) = unbounded();
        preview.attach(rx).unwrap();

        tx.send(frame(1)).unwrap();
        tx.send(VideoFrame {
            width: 640,
            height: 480,
            rgba: vec![0; 16],
        })
        .unwrap();
        assert_eq!(preview.take_latest().unwrap().rgba[0], 1);

        tx.send(VideoFrame {
            width: 0,
            height: 0,
            rgba: Vec::new(),
        })
        .unwrap();
        assert!(preview.take_latest().is_none());
        assert_eq!(preview.current().unwrap().rgba[0], 1);
    }
}
