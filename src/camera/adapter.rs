use super::{CaptureCapability, CaptureStream, MediaCapture, VideoConstraints, VideoSink};
use crate::ParleyError;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info};

/// The only camera error ever shown to the user
pub const CAMERA_ERROR_MESSAGE: &str = "Failed to access camera";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Inactive,
    Acquiring,
    Active,
}

struct CameraInner {
    phase: Phase,
    stream: Option<Box<dyn CaptureStream>>,
    error: Option<String>,
    /// Bumped by every start and stop; a pending acquisition from an older
    /// generation releases its stream on arrival.
    generation: u64,
    sink: Arc<dyn VideoSink>,
}

impl CameraInner {
    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            debug!("Camera stream released");
        }
    }
}

impl Drop for CameraInner {
    fn drop(&mut self) {
        self.release();
        if self.phase == Phase::Active {
            self.sink.detach();
        }
    }
}

/// Camera adapter. Clones share state; the stream is released with the last clone.
#[derive(Clone)]
pub struct CameraAdapter {
    inner: Arc<Mutex<CameraInner>>,
    capture: Option<Arc<dyn MediaCapture>>,
    sink: Arc<dyn VideoSink>,
    constraints: VideoConstraints,
}

impl CameraAdapter {
    pub fn new(capability: CaptureCapability, sink: Arc<dyn VideoSink>, constraints: VideoConstraints) -> Self {
        let capture = match capability {
            CaptureCapability::Available(capture) => Some(capture),
            CaptureCapability::Unavailable => {
                info!("Camera capture is not available");
                None
            }
        };

        Self {
            inner: Arc::new(Mutex::new(CameraInner {
                phase: Phase::Inactive,
                stream: None,
                error: None,
                generation: 0,
                sink: Arc::clone(&sink),
            })),
            capture,
            sink,
            constraints,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.capture.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.inner.lock().phase == Phase::Active
    }

    pub fn is_acquiring(&self) -> bool {
        self.inner.lock().phase == Phase::Acquiring
    }

    pub fn error(&self) -> Option<String> {
        self.inner.lock().error.clone()
    }

    /// Acquire the camera and attach it to the sink.
    ///
    /// The adapter enters the acquiring phase immediately; the returned future
    /// completes the acquisition and must be driven to completion. The lock is
    /// never held across the capture request.
    pub fn start_camera(&self) -> impl Future<Output = ()> + Send + 'static {
        let this = self.clone();
        let claimed = {
            let mut inner = self.inner.lock();
            inner.error = None;
            if inner.phase == Phase::Inactive {
                inner.phase = Phase::Acquiring;
                inner.generation += 1;
                Some(inner.generation)
            } else {
                debug!("Camera already {:?}", inner.phase);
                None
            }
        };

        async move {
            let Some(generation) = claimed else {
                return;
            };

            let requested = match this.capture.as_ref() {
                Some(capture) => capture.request_video(&this.constraints).await,
                None => Err(ParleyError::CameraError("No capture capability".into())),
            };

            let mut inner = this.inner.lock();
            match requested {
                Ok(mut stream) if inner.generation != generation => {
                    debug!("Camera stopped during acquisition, releasing late stream");
                    stream.stop();
                }
                Ok(mut stream) => match this.sink.attach(stream.frames()) {
                    Ok(()) => {
                        info!("Camera active ({} tracks)", stream.tracks().len());
                        inner.stream = Some(stream);
                        inner.phase = Phase::Active;
                    }
                    Err(e) => {
                        error!("Error accessing camera: {}", e);
                        stream.stop();
                        inner.phase = Phase::Inactive;
                        inner.error = Some(CAMERA_ERROR_MESSAGE.to_string());
                    }
                },
                Err(_) if inner.generation != generation => {}
                Err(e) => {
                    error!("Error accessing camera: {}", e);
                    inner.phase = Phase::Inactive;
                    inner.error = Some(CAMERA_ERROR_MESSAGE.to_string());
                }
            }
        }
    }

    /// Release the camera. Idempotent.
    pub fn stop_camera(&self) {
        let mut inner = self.inner.lock();
        let was = inner.phase;
        inner.generation += 1;
        inner.phase = Phase::Inactive;
        inner.release();
        drop(inner);

        if was == Phase::Active {
            self.sink.detach();
            info!("Camera stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{TrackInfo, TrackKind, VideoFrame};
    use crate::Result;
    use async_trait::async_trait;
    use crossbeam_channel::{unbounded, Receiver};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Stream {
        stopped: Arc<AtomicUsize>,
        frames: Receiver<VideoFrame>,
    }

    impl CaptureStream for Stream {
        fn tracks(&self) -> Vec<TrackInfo> {
            vec![TrackInfo {
                id: "v0".into(),
                kind: TrackKind::Video,
                label: "Test camera".into(),
            }]
        }

        fn frames(&self) -> Receiver<VideoFrame> {
            self.frames.clone()
        }

        fn stop(&mut self) {
            self.stopped.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Capture {
        deny: bool,
        stopped: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl MediaCapture for Capture {
        async fn request_video(&self, constraints: &VideoConstraints) -> Result<Box<dyn CaptureStream>> {
            assert!(!constraints.audio);
            if self.deny {
                return Err(ParleyError::CameraError("NotAllowedError".into()));
            }
            let (_tx, frames) = unbounded();
            Ok(Box::new(Stream {
                stopped: Arc::clone(&self.stopped),
                frames,
            }))
        }
    }

    #[derive(Default)]
    struct Sink {
        attached: AtomicUsize,
        detached: AtomicUsize,
    }

    impl VideoSink for Sink {
        fn attach(&self, _frames: Receiver<VideoFrame>) -> Result<()> {
            self.attached.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn detach(&self) {
            self.detached.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn camera(deny: bool) -> (CameraAdapter, Arc<AtomicUsize>, Arc<Sink>) {
        let stopped = Arc::new(AtomicUsize::new(0));
        let sink = Arc::new(Sink::default());
        let capture = Capture {
            deny,
            stopped: Arc::clone(&stopped),
        };
        let adapter = CameraAdapter::new(
            CaptureCapability::Available(Arc::new(capture)),
            sink.clone(),
            VideoConstraints::default(),
        );
        (adapter, stopped, sink)
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let (camera, stopped, sink) = camera(false);
        camera.start_camera().await;
        assert!(camera.is_active());
        assert_eq!(camera.error(), None);
        assert_eq!(sink.attached.load(Ordering::SeqCst), 1);

        camera.stop_camera();
        camera.stop_camera();
        assert!(!camera.is_active());
        assert_eq!(stopped.load(Ordering::SeqCst), 1);
        assert_eq!(sink.detached.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_denied_sets_generic_error() {
        let (camera, _, _) = camera(true);
        camera.start_camera().await;
        assert!(!camera.is_active());
        assert_eq!(camera.error().as_deref(), Some(CAMERA_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_stop_during_acquisition_releases_late_stream() {
        let (camera, stopped, sink) = camera(false);
        let pending = camera.start_camera();
        assert!(camera.is_acquiring());

        camera.stop_camera();
        pending.await;

        assert!(!camera.is_active());
        assert_eq!(stopped.load(Ordering::SeqCst), 1);
        assert_eq!(sink.attached.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_start_is_noop() {
        let (camera, _, sink) = camera(false);
        camera.start_camera().await;
        camera.start_camera().await;
        assert!(camera.is_active());
        assert_eq!(sink.attached.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unavailable_reports_error() {
        let camera = CameraAdapter::new(
            CaptureCapability::Unavailable,
            Arc::new(Sink::default()),
            VideoConstraints::default(),
        );
        assert!(!camera.is_supported());
        camera.start_camera().await;
        assert_eq!(camera.error().as_deref(), Some(CAMERA_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_drop_releases_stream() {
        let (camera, stopped, sink) = camera(false);
        camera.start_camera().await;
        let clone = camera.clone();
        drop(camera);
        assert_eq!(stopped.load(Ordering::SeqCst), 0);

        drop(clone);
        assert_eq!(stopped.load(Ordering::SeqCst), 1);
        assert_eq!(sink.detached.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_drop_after_stop_detaches_once() {
        let (camera, _, sink) = camera(false);
        camera.start_camera().await;
        camera.stop_camera();
        drop(camera);
        assert_eq!(sink.detached.load(Ordering::SeqCst), 1);
    }
}
