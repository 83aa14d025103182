use super::types::Message;
use parking_lot::RwLock;
use std::sync::Arc;

/// Append-only conversation thread.
///
/// Insertion order is display order. Timestamps are strictly increasing across the
/// log, so a reply always sorts after the prompt that produced it even when both are
/// created within the same millisecond.
#[derive(Debug, Clone)]
pub struct ConversationLog {
    messages: Arc<RwLock<Vec<Message>>>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Append a user prompt and its reply as one turn.
    ///
    /// `now` is the caller's clock reading in epoch milliseconds. Returns the two
    /// stored messages.
    pub fn append_turn(&self, prompt: &str, reply: &str, now: i64) -> (Message, Message) {
        let mut messages = self.messages.write();

        let last = messages.last().map(|m| m.timestamp);
        let user_ts = match last {
            Some(last) if now <= last => last + 1,
            _ => now,
        };
        let reply_ts = user_ts + 1;

        let user = Message::user(prompt, user_ts);
        let assistant = Message::assistant(reply, reply_ts);
        messages.push(user.clone());
        messages.push(assistant.clone());

        (user, assistant)
    }

    pub fn get_all(&self) -> Vec<Message> {
        self.messages.read().clone()
    }

    pub fn last(&self) -> Option<Message> {
        self.messages.read().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new()
    }
}
