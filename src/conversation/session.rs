/// UI-mode flags owned by the controller
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Draft text in the input bar
    pub input_text: String,
    /// Whether the text field is expanded and focused
    pub input_active: bool,
    pub mic_modal_visible: bool,
    pub camera_modal_visible: bool,
}

impl SessionState {
    /// Back to the initial state, as for a new session
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_clears_everything() {
        let mut session = SessionState {
            input_text: "draft".into(),
            input_active: true,
            mic_modal_visible: true,
            camera_modal_visible: true,
        };
        session.reset();
        assert_eq!(session, SessionState::default());
    }
}
