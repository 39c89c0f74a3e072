use crate::services::llm::models::base::Message;

/// Ordered conversation history owned by one session.
///
/// Turns can only be appended; nothing is reordered or removed while the
/// session lives.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transcript that opens with a system turn.
    pub fn with_system<T: Into<String>>(instruction: T) -> Self {
        Self { turns: vec![Message::system(instruction)] }
    }

    pub fn push(&mut self, turn: Message) {
        self.turns.push(turn);
    }

    /// Records one completed cycle: the user's text, then the full reply.
    pub fn record_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.turns.push(Message::user(user));
        self.turns.push(Message::assistant(assistant));
    }

    pub fn turns(&self) -> &[Message] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Message> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
