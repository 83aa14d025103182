pub mod camera_modal;
pub mod header;
pub mod input_bar;
pub mod message_list;
pub mod mic_modal;

pub use camera_modal::CameraModal;
pub use header::Header;
pub use input_bar::InputBar;
pub use message_list::MessageList;
pub use mic_modal::MicModal;
