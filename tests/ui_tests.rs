//! UI automation tests using egui_kittest and AccessKit
//!
//! The full chat view is rendered against a real controller and driven through the
//! accessibility tree.

mod common;

use common::{bare_controller, rig};
use egui_kittest::kittest::Queryable;
use egui_kittest::Harness;
use parley::conversation::ConversationController;
use parley::messages::Sender;
use parley::responder::rules::GREETING_REPLY;
use parley::speech::RecognitionResult;
use parley::ui::{ChatView, Theme};
use std::time::Instant;

struct TestApp {
    controller: ConversationController,
    theme: Theme,
    dark_mode: bool,
}

impl TestApp {
    fn new(controller: ConversationController) -> Self {
        Self {
            controller,
            theme: Theme::dark(),
            dark_mode: true,
        }
    }
}

fn harness(app: TestApp) -> Harness<'static, TestApp> {
    Harness::builder()
        .with_size(egui::Vec2::new(480.0, 640.0))
        .build_state(
            |ctx, app: &mut TestApp| {
                app.controller.poll(Instant::now());
                // No async runtime here; camera tasks are exercised in the controller tests
                let _ = ChatView::new(&mut app.controller, &app.theme, &mut app.dark_mode, None).show(ctx);
            },
            app,
        )
}

/// Test that the empty thread shows the welcome card
#[test]
fn test_welcome_shown_when_empty() {
    let mut harness = harness(TestApp::new(bare_controller()));
    harness.run();

    let _welcome = harness.get_by_label("Welcome to Parley");
    let _placeholder = harness.get_by_label("Ask anything...");
    let _send = harness.get_by_label("Send message");
}

/// Test that clicking the placeholder opens the text field
#[test]
fn test_placeholder_activates_input() {
    let mut harness = harness(TestApp::new(bare_controller()));
    harness.run();

    assert!(harness.query_by_label("Message input").is_none());

    harness.get_by_label("Ask anything...").click();
    harness.run();

    assert!(harness.state().controller.session().input_active);
    let _input = harness.get_by_label("Message input");
}

/// Test that typing goes into the session draft
#[test]
fn test_type_text_into_input() {
    let mut harness = harness(TestApp::new(bare_controller()));
    harness.run();

    harness.get_by_label("Ask anything...").click();
    harness.run();

    harness.get_by_label("Message input").focus();
    harness.run();

    harness.get_by_label("Message input").type_text("Hello, world!");
    harness.run();

    assert_eq!(harness.state().controller.session().input_text, "Hello, world!");
}

/// Test that sending adds the prompt and the reply to the thread
#[test]
fn test_send_message_creates_turn() {
    let mut harness = harness(TestApp::new(bare_controller()));
    harness.run();

    harness.state_mut().controller.activate_input();
    harness.state_mut().controller.set_input_text("hello");
    harness.run();

    harness.get_by_label("Send message").click();
    harness.run();

    let messages = harness.state().controller.messages();
    assert_eq!(messages.len(), 2, "Should have the prompt and the reply");
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[1].sender, Sender::Assistant);
    assert!(harness.state().controller.session().input_text.is_empty());

    let _user = harness.get_by_label("User message: hello");
    let _reply = harness.get_by_label(&format!("Assistant response: {}", GREETING_REPLY));
    assert!(harness.query_by_label("Welcome to Parley").is_none());
}

/// Test that empty input cannot be sent
#[test]
fn test_cannot_send_empty_message() {
    let mut harness = harness(TestApp::new(bare_controller()));
    harness.run();

    harness.get_by_label("Send message").click();
    harness.run();

    assert!(harness.state().controller.messages().is_empty());
    let _welcome = harness.get_by_label("Welcome to Parley");
}

/// Test that the theme toggle flips the mode flag
#[test]
fn test_toggle_theme() {
    let mut harness = harness(TestApp::new(bare_controller()));
    harness.run();

    harness.get_by_label("Toggle theme").click();
    harness.run();
    assert!(!harness.state().dark_mode);

    harness.get_by_label("Toggle theme").click();
    harness.run();
    assert!(harness.state().dark_mode);
}

/// Test that a new session clears the thread
#[test]
fn test_new_session_clears_thread() {
    let mut controller = bare_controller();
    controller.submit("what's the weather like", Instant::now());

    let mut harness = harness(TestApp::new(controller));
    harness.run();
    let _user = harness.get_by_label("User message: what's the weather like");

    harness.get_by_label("New session").click();
    harness.run();

    assert!(harness.state().controller.messages().is_empty());
    let _welcome = harness.get_by_label("Welcome to Parley");
}

/// Test that voice input opens the modal and the spoken text lands in the thread
#[test]
fn test_voice_input_flow() {
    let rig = rig();
    let recognizer = rig.recognizer.clone();
    let mut harness = harness(TestApp::new(rig.controller));
    harness.run();

    harness.get_by_label("Start Voice Input").click();
    harness.run();

    assert!(harness.state().controller.is_listening());
    assert!(harness.state().controller.session().mic_modal_visible);
    let _listening = harness.get_by_label("Listening");
    let _stop = harness.get_by_label("Stop listening");

    recognizer.results(0, vec![RecognitionResult::finalized("hello")]);
    recognizer.end();
    harness.run();

    assert!(!harness.state().controller.is_listening());
    assert!(!harness.state().controller.session().mic_modal_visible);
    assert!(harness.query_by_label("Stop listening").is_none());
    let _user = harness.get_by_label("User message: hello");
}

/// Test that the modal's stop button ends the capture
#[test]
fn test_mic_modal_stop_button() {
    let rig = rig();
    let recognizer = rig.recognizer.clone();
    let mut harness = harness(TestApp::new(rig.controller));
    harness.run();

    harness.get_by_label("Start Voice Input").click();
    harness.run();

    harness.get_by_label("Stop listening").click();
    harness.run();

    assert_eq!(recognizer.stops(), 1);
    assert!(!harness.state().controller.is_listening());
    assert!(!harness.state().controller.session().mic_modal_visible);
    assert!(harness.state().controller.messages().is_empty());
}

/// Test that the mic button is disabled without a recognizer
#[test]
fn test_mic_disabled_without_recognizer() {
    let mut harness = harness(TestApp::new(bare_controller()));
    harness.run();

    harness.get_by_label("Start Voice Input").click();
    harness.run();

    assert!(!harness.state().controller.is_listening());
    assert!(harness.query_by_label("Stop listening").is_none());
}
