//! Collaborator doubles shared by unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::errors::{RagChatError, RagChatResult};
use crate::llm::provider::LlmProvider;
use crate::llm::types::{CallConfig, ChatMessage};
use crate::rag::store::{RetrievedPassage, VectorStore};

pub type RecordedCalls = Arc<Mutex<Vec<(Vec<ChatMessage>, CallConfig)>>>;

/// Replies from a fixed script and records every request it receives.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, String>>>,
    calls: RecordedCalls,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Result<&str, &str>>) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> RecordedCalls {
        self.calls.clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        cfg: &CallConfig,
    ) -> RagChatResult<ChatMessage> {
        self.calls
            .lock()
            .unwrap()
            .push((messages.to_vec(), cfg.clone()));
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(ChatMessage::assistant(text)),
            Some(Err(e)) => Err(RagChatError::LlmProvider(e)),
            None => Err(RagChatError::LlmProvider("script exhausted".into())),
        }
    }
}

/// Returns canned passages, records queries and counts releases.
pub struct RecordingStore {
    passages: Vec<RetrievedPassage>,
    queries: Arc<Mutex<Vec<(String, usize)>>>,
    closes: Arc<AtomicUsize>,
    closed: bool,
}

impl RecordingStore {
    pub fn with_passages(passages: Vec<RetrievedPassage>) -> Self {
        Self {
            passages,
            queries: Arc::default(),
            closes: Arc::default(),
            closed: false,
        }
    }

    pub fn queries(&self) -> Arc<Mutex<Vec<(String, usize)>>> {
        self.queries.clone()
    }

    pub fn closes(&self) -> Arc<AtomicUsize> {
        self.closes.clone()
    }
}

#[async_trait]
impl VectorStore for RecordingStore {
    fn name(&self) -> &str {
        "recording"
    }

    async fn near_text(&self, query: &str, limit: usize) -> RagChatResult<Vec<RetrievedPassage>> {
        if self.closed {
            return Err(RagChatError::VectorStore("connection closed".into()));
        }
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), limit));
        Ok(self.passages.iter().take(limit).cloned().collect())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for RecordingStore {
    fn drop(&mut self) {
        self.close();
    }
}
