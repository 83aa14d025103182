//! Conversation control
//!
//! The controller owns the message log and the UI-mode flags. The presentation
//! layer calls gesture methods and reads state back every frame.

mod capabilities;
mod controller;
mod session;

pub use capabilities::Capabilities;
pub use controller::ConversationController;
pub use session::SessionState;
