//! Scripted device engines shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use parley::camera::{
    CaptureCapability, CaptureStream, MediaCapture, TrackInfo, TrackKind, VideoConstraints, VideoFrame,
    VideoSink,
};
use parley::config::AppConfig;
use parley::conversation::{Capabilities, ConversationController};
use parley::responder::ResponseGenerator;
use parley::speech::{
    RecognitionCapability, RecognitionEngine, RecognitionEvent, RecognitionResult, RecognitionSettings,
    SynthesisCapability, SynthesisEngine, SynthesisEvent, Utterance, Voice,
};
use parley::{ParleyError, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Handle for driving a [`FakeRecognizer`] from a test
#[derive(Clone, Default)]
pub struct RecognizerHandle {
    inner: Arc<Mutex<RecognizerState>>,
}

#[derive(Default)]
struct RecognizerState {
    events: Option<Sender<RecognitionEvent>>,
    starts: usize,
    stops: usize,
    settings: Option<RecognitionSettings>,
}

impl RecognizerHandle {
    /// Report a batch of results from the live capture
    pub fn results(&self, result_index: usize, results: Vec<RecognitionResult>) {
        if let Some(events) = &self.inner.lock().events {
            let _ = events.send(RecognitionEvent::Results {
                result_index,
                results,
            });
        }
    }

    /// End the capture as if the engine timed out on silence
    pub fn end(&self) {
        if let Some(events) = self.inner.lock().events.take() {
            let _ = events.send(RecognitionEvent::Ended);
        }
    }

    pub fn fail(&self, reason: &str) {
        if let Some(events) = self.inner.lock().events.take() {
            let _ = events.send(RecognitionEvent::Error(reason.to_string()));
        }
    }

    pub fn starts(&self) -> usize {
        self.inner.lock().starts
    }

    pub fn stops(&self) -> usize {
        self.inner.lock().stops
    }

    pub fn settings(&self) -> Option<RecognitionSettings> {
        self.inner.lock().settings.clone()
    }
}

/// Recognizer that ends capture synchronously when stopped
pub struct FakeRecognizer {
    handle: RecognizerHandle,
}

impl FakeRecognizer {
    pub fn new() -> (Self, RecognizerHandle) {
        let handle = RecognizerHandle::default();
        (
            Self {
                handle: handle.clone(),
            },
            handle,
        )
    }
}

impl RecognitionEngine for FakeRecognizer {
    fn configure(&mut self, settings: &RecognitionSettings) {
        self.handle.inner.lock().settings = Some(settings.clone());
    }

    fn start(&mut self, events: Sender<RecognitionEvent>) -> Result<()> {
        let mut state = self.handle.inner.lock();
        state.starts += 1;
        let _ = events.send(RecognitionEvent::Started);
        state.events = Some(events);
        Ok(())
    }

    fn stop(&mut self) {
        let mut state = self.handle.inner.lock();
        state.stops += 1;
        if let Some(events) = state.events.take() {
            let _ = events.send(RecognitionEvent::Ended);
        }
    }
}

/// Handle for observing a [`FakeSynthesizer`]
#[derive(Clone, Default)]
pub struct SynthesizerHandle {
    inner: Arc<Mutex<SynthesizerState>>,
}

#[derive(Default)]
struct SynthesizerState {
    spoken: Vec<Utterance>,
    active: Option<(u64, Sender<SynthesisEvent>)>,
    cancels: usize,
}

impl SynthesizerHandle {
    pub fn spoken(&self) -> Vec<String> {
        self.inner.lock().spoken.iter().map(|u| u.text.clone()).collect()
    }

    pub fn utterances(&self) -> Vec<Utterance> {
        self.inner.lock().spoken.clone()
    }

    pub fn cancels(&self) -> usize {
        self.inner.lock().cancels
    }

    /// Finish the utterance currently playing
    pub fn finish(&self) {
        if let Some((id, events)) = self.inner.lock().active.take() {
            let _ = events.send(SynthesisEvent::Ended(id));
        }
    }
}

/// Synthesizer that starts speaking immediately and reports a late end on cancel
pub struct FakeSynthesizer {
    handle: SynthesizerHandle,
    voices: Vec<Voice>,
}

impl FakeSynthesizer {
    pub fn new() -> (Self, SynthesizerHandle) {
        let handle = SynthesizerHandle::default();
        (
            Self {
                handle: handle.clone(),
                voices: vec![
                    Voice::new("Alex", "en-US"),
                    Voice::new("Google US English", "en-US"),
                ],
            },
            handle,
        )
    }
}

impl SynthesisEngine for FakeSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speak(&mut self, utterance: Utterance, events: Sender<SynthesisEvent>) -> Result<()> {
        let mut state = self.handle.inner.lock();
        let _ = events.send(SynthesisEvent::Started(utterance.id));
        state.active = Some((utterance.id, events));
        state.spoken.push(utterance);
        Ok(())
    }

    fn cancel(&mut self) {
        let mut state = self.handle.inner.lock();
        state.cancels += 1;
        if let Some((id, events)) = state.active.take() {
            let _ = events.send(SynthesisEvent::Ended(id));
        }
    }
}

pub struct FakeStream {
    stopped: Arc<AtomicUsize>,
    frames: Receiver<VideoFrame>,
}

impl CaptureStream for FakeStream {
    fn tracks(&self) -> Vec<TrackInfo> {
        vec![TrackInfo {
            id: "video-0".into(),
            kind: TrackKind::Video,
            label: "Fake camera".into(),
        }]
    }

    fn frames(&self) -> Receiver<VideoFrame> {
        self.frames.clone()
    }

    fn stop(&mut self) {
        self.stopped.fetch_add(1, Ordering::SeqCst);
    }
}

/// Camera that grants or denies access
pub struct FakeCapture {
    pub deny: bool,
    pub requests: AtomicUsize,
    pub stopped: Arc<AtomicUsize>,
    pub last_constraints: Mutex<Option<VideoConstraints>>,
}

impl FakeCapture {
    pub fn new(deny: bool) -> Arc<Self> {
        Arc::new(Self {
            deny,
            requests: AtomicUsize::new(0),
            stopped: Arc::new(AtomicUsize::new(0)),
            last_constraints: Mutex::new(None),
        })
    }

    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaCapture for FakeCapture {
    async fn request_video(&self, constraints: &VideoConstraints) -> Result<Box<dyn CaptureStream>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        *self.last_constraints.lock() = Some(constraints.clone());
        if self.deny {
            return Err(ParleyError::CameraError("NotAllowedError: Permission denied".into()));
        }

        let (_tx, frames) = unbounded();
        Ok(Box::new(FakeStream {
            stopped: Arc::clone(&self.stopped),
            frames,
        }))
    }
}

#[derive(Default)]
pub struct FakeSink {
    pub attached: AtomicUsize,
    pub detached: AtomicUsize,
}

impl VideoSink for FakeSink {
    fn attach(&self, _frames: Receiver<VideoFrame>) -> Result<()> {
        self.attached.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn detach(&self) {
        self.detached.fetch_add(1, Ordering::SeqCst);
    }
}

/// A controller wired to fakes, plus the handles to drive them
pub struct Rig {
    pub controller: ConversationController,
    pub recognizer: RecognizerHandle,
    pub synthesizer: SynthesizerHandle,
    pub capture: Arc<FakeCapture>,
    pub sink: Arc<FakeSink>,
}

pub fn rig() -> Rig {
    rig_with(false)
}

pub fn rig_with(deny_camera: bool) -> Rig {
    let (recognizer_engine, recognizer) = FakeRecognizer::new();
    let (synthesizer_engine, synthesizer) = FakeSynthesizer::new();
    let capture = FakeCapture::new(deny_camera);
    let sink = Arc::new(FakeSink::default());

    let capabilities = Capabilities {
        recognition: RecognitionCapability::Available(Box::new(recognizer_engine)),
        synthesis: SynthesisCapability::Available(Box::new(synthesizer_engine)),
        capture: CaptureCapability::Available(capture.clone()),
        video_sink: sink.clone(),
    };

    let controller = ConversationController::new(&AppConfig::default(), capabilities)
        .with_responder(ResponseGenerator::with_rng(StdRng::seed_from_u64(7)));

    Rig {
        controller,
        recognizer,
        synthesizer,
        capture,
        sink,
    }
}

/// A controller with no devices at all
pub fn bare_controller() -> ConversationController {
    ConversationController::new(
        &AppConfig::default(),
        Capabilities::unavailable(Arc::new(FakeSink::default())),
    )
}
