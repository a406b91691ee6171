//! In-process destination that records every call, for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{Markup, MessageId, Messenger, PinnedMessage, TransportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Send { id: MessageId, preview: bool },
    Edit(MessageId),
    Pin { id: MessageId, silent: bool },
    Pinned,
}

#[derive(Debug, Default)]
struct State {
    messages: Vec<(MessageId, String)>,
    pinned: Option<MessageId>,
    calls: Vec<Call>,
    fail_sends_after: Option<usize>,
}

#[derive(Debug)]
pub struct Memory {
    markup: Markup,
    state: Mutex<State>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(Markup::Html)
    }
}

impl Memory {
    pub fn new(markup: Markup) -> Self {
        Self {
            markup,
            state: Mutex::new(State::default()),
        }
    }

    /// Seeds the channel with a pinned message, bypassing the call log.
    pub fn with_pinned(self, text: &str) -> Self {
        {
            let mut state = self.lock();
            let id = MessageId(state.messages.len() as u64 + 1);
            state.messages.push((id, text.to_string()));
            state.pinned = Some(id);
        }
        self
    }

    /// Makes every send after the first `count` fail.
    pub fn failing_sends_after(self, count: usize) -> Self {
        self.lock().fail_sends_after = Some(count);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Number of calls that changed the channel (sends, edits, pins).
    pub fn writes(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| !matches!(call, Call::Pinned))
            .count()
    }

    pub fn pinned_message(&self) -> Option<PinnedMessage> {
        let state = self.lock();
        Self::find_pinned(&state)
    }

    /// Texts of every message posted through `send`, oldest first.
    pub fn sent(&self) -> Vec<String> {
        let state = self.lock();
        state
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::Send { id, .. } => Self::text_of(&state, *id),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn text_of(state: &State, id: MessageId) -> Option<String> {
        state
            .messages
            .iter()
            .find(|(message_id, _)| *message_id == id)
            .map(|(_, text)| text.clone())
    }

    fn find_pinned(state: &State) -> Option<PinnedMessage> {
        let id = state.pinned?;
        Self::text_of(state, id).map(|text| PinnedMessage { id, text })
    }
}

#[async_trait]
impl Messenger for Memory {
    fn markup(&self) -> Markup {
        self.markup
    }

    async fn send(
        &self,
        text: &str,
        _markup: Option<Markup>,
        preview: bool,
    ) -> Result<MessageId, TransportError> {
        let mut state = self.lock();
        let sends = state
            .calls
            .iter()
            .filter(|call| matches!(call, Call::Send { .. }))
            .count();
        if state.fail_sends_after.is_some_and(|limit| sends >= limit) {
            return Err(TransportError::Unexpected(format!(
                "send refused after {sends} messages"
            )));
        }

        let id = MessageId(state.messages.len() as u64 + 1);
        state.messages.push((id, text.to_string()));
        state.calls.push(Call::Send { id, preview });
        Ok(id)
    }

    async fn edit(&self, id: MessageId, text: &str) -> Result<(), TransportError> {
        let mut state = self.lock();
        let message = state
            .messages
            .iter_mut()
            .find(|(message_id, _)| *message_id == id)
            .ok_or(TransportError::UnknownMessage(id))?;
        message.1 = text.to_string();
        state.calls.push(Call::Edit(id));
        Ok(())
    }

    async fn pin(&self, id: MessageId, silent: bool) -> Result<(), TransportError> {
        let mut state = self.lock();
        if !state.messages.iter().any(|(message_id, _)| *message_id == id) {
            return Err(TransportError::UnknownMessage(id));
        }
        state.pinned = Some(id);
        state.calls.push(Call::Pin { id, silent });
        Ok(())
    }

    async fn pinned(&self) -> Result<Option<PinnedMessage>, TransportError> {
        let mut state = self.lock();
        state.calls.push(Call::Pinned);
        Ok(Self::find_pinned(&state))
    }
}
