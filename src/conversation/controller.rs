use super::capabilities::Capabilities;
use super::session::SessionState;
use crate::camera::{CameraAdapter, VideoConstraints};
use crate::config::AppConfig;
use crate::messages::types::now_millis;
use crate::messages::{ConversationLog, Message};
use crate::responder::ResponseGenerator;
use crate::speech::{RecognitionSettings, SpeechInput, SpeechOutput, SpeechParams};
use std::collections::VecDeque;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A reply waiting for its speak deadline
#[derive(Clone, Debug)]
struct ScheduledReply {
    text: String,
    due: Instant,
}

/// Owns the conversation and wires user gestures to the responder and devices.
///
/// Everything here runs on the UI thread. Device engines report through channels
/// that [`poll`](Self::poll) drains once per frame.
pub struct ConversationController {
    log: ConversationLog,
    session: SessionState,
    responder: ResponseGenerator,
    speech_input: SpeechInput,
    speech_output: SpeechOutput,
    camera: CameraAdapter,
    scheduled: VecDeque<ScheduledReply>,
    speak_delay: Duration,
    was_listening: bool,
}

impl ConversationController {
    pub fn new(config: &AppConfig, capabilities: Capabilities) -> Self {
        let responder = ResponseGenerator::new().with_time_format(config.responder.time_format.clone());

        Self {
            log: ConversationLog::new(),
            session: SessionState::default(),
            responder,
            speech_input: SpeechInput::new(
                capabilities.recognition,
                RecognitionSettings::from(&config.recognition),
            ),
            speech_output: SpeechOutput::new(
                capabilities.synthesis,
                SpeechParams::from(&config.synthesis),
            ),
            camera: CameraAdapter::new(
                capabilities.capture,
                capabilities.video_sink,
                VideoConstraints::from(&config.camera),
            ),
            scheduled: VecDeque::new(),
            speak_delay: config.conversation.speak_delay(),
            was_listening: false,
        }
    }

    /// Replace the reply generator, e.g. with a seeded one
    pub fn with_responder(mut self, responder: ResponseGenerator) -> Self {
        self.responder = responder;
        self
    }

    /// Submit one user utterance, typed or spoken.
    ///
    /// Returns false when the utterance is blank and nothing was appended.
    pub fn submit(&mut self, utterance: &str, now: Instant) -> bool {
        if utterance.trim().is_empty() {
            return false;
        }

        let reply = self.responder.generate(utterance);
        let (prompt, answer) = self.log.append_turn(utterance, &reply, now_millis());
        debug!("Turn appended at {} / {}", prompt.timestamp, answer.timestamp);

        if self.speech_output.is_supported() {
            self.speech_output.stop();
            self.scheduled.push_back(ScheduledReply {
                text: reply,
                due: now + self.speak_delay,
            });
        }

        self.session.input_text.clear();
        self.session.input_active = false;
        true
    }

    /// Submit the draft in the input bar
    pub fn send_input(&mut self, now: Instant) -> bool {
        let text = self.session.input_text.clone();
        self.submit(&text, now)
    }

    /// Enter in the text field: send the draft, or collapse the bar when it is blank
    pub fn commit_input(&mut self, now: Instant) -> bool {
        let sent = self.send_input(now);
        if !sent {
            self.session.input_active = false;
        }
        sent
    }

    /// Drain device events, submit finished voice input and speak due replies.
    ///
    /// Returns the next speak deadline, if any.
    pub fn poll(&mut self, now: Instant) -> Option<Instant> {
        self.speech_input.poll();

        let listening = self.speech_input.is_listening();
        if self.was_listening && !listening {
            self.session.mic_modal_visible = false;
        }
        self.was_listening = listening;

        if let Some(utterance) = self.speech_input.take_utterance() {
            info!("Voice input: {:?}", utterance);
            self.submit(&utterance, now);
        }

        self.speech_output.poll();
        while self.scheduled.front().is_some_and(|reply| reply.due <= now) {
            if let Some(reply) = self.scheduled.pop_front() {
                self.speech_output.speak(&reply.text);
            }
        }

        self.scheduled.front().map(|reply| reply.due)
    }

    pub fn activate_input(&mut self) {
        self.session.input_active = true;
    }

    pub fn deactivate_input(&mut self) {
        self.session.input_active = false;
    }

    pub fn set_input_text(&mut self, text: impl Into<String>) {
        self.session.input_text = text.into();
    }

    /// Mic button: stop while listening, otherwise open the modal and listen
    pub fn toggle_mic(&mut self) {
        if !self.speech_input.is_supported() {
            return;
        }

        if self.speech_input.is_listening() {
            self.speech_input.stop_listening();
            self.session.mic_modal_visible = false;
        } else {
            self.session.mic_modal_visible = true;
            self.speech_input.start_listening();
            // A capture that failed to start leaves nothing to show
            self.session.mic_modal_visible = self.speech_input.is_listening();
        }
        self.was_listening = self.speech_input.is_listening();
    }

    pub fn close_mic_modal(&mut self) {
        self.speech_input.stop_listening();
        self.session.mic_modal_visible = false;
    }

    /// Camera button. Returns the acquisition future when the camera is being opened;
    /// the caller runs it on its async runtime.
    pub fn toggle_camera(&mut self) -> Option<impl Future<Output = ()> + Send + 'static> {
        if self.camera.is_active() {
            self.camera.stop_camera();
            self.session.camera_modal_visible = false;
            None
        } else {
            self.session.camera_modal_visible = true;
            Some(self.camera.start_camera())
        }
    }

    pub fn close_camera_modal(&mut self) {
        self.camera.stop_camera();
        self.session.camera_modal_visible = false;
    }

    /// Stop every device and start an empty conversation
    pub fn new_session(&mut self) {
        self.stop_devices();
        self.log = ConversationLog::new();
        self.session.reset();
        self.scheduled.clear();
        self.was_listening = false;
        info!("New session started");
    }

    /// Release devices before exit
    pub fn shutdown(&mut self) {
        self.stop_devices();
        self.scheduled.clear();
        info!("Conversation shut down");
    }

    fn stop_devices(&mut self) {
        self.speech_input.stop_listening();
        self.speech_output.stop();
        self.camera.stop_camera();
    }

    pub fn messages(&self) -> Vec<Message> {
        self.log.get_all()
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionState {
        &mut self.session
    }

    pub fn speech_input(&self) -> &SpeechInput {
        &self.speech_input
    }

    pub fn speech_output(&self) -> &SpeechOutput {
        &self.speech_output
    }

    pub fn camera(&self) -> &CameraAdapter {
        &self.camera
    }

    pub fn is_listening(&self) -> bool {
        self.speech_input.is_listening()
    }

    pub fn is_speaking(&self) -> bool {
        self.speech_output.is_speaking()
    }

    pub fn pending_replies(&self) -> usize {
        self.scheduled.len()
    }
}

impl Drop for ConversationController {
    fn drop(&mut self) {
        self.stop_devices();
    }
}
