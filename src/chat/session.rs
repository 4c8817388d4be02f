use crate::llm::types::{ChatMessage, Role};

/// Conversation history for one run of the chat loop.
///
/// The first message is always the system preamble. `push_user` and
/// `push_assistant` are the only mutators and they only append.
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: String,
    messages: Vec<ChatMessage>,
}

impl Session {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            messages: vec![ChatMessage::system(system_prompt)],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    /// Full history, system preamble first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// History without the system preamble.
    pub fn turns(&self) -> &[ChatMessage] {
        &self.messages[1..]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn system(&self) -> &ChatMessage {
        &self.messages[0]
    }
}
