use async_trait::async_trait;

use crate::errors::RagChatResult;
use crate::llm::types::{CallConfig, ChatMessage};

/// Chat-completion capability. The orchestrator and keyword extractor only
/// see this trait, so any backend (or a test double) can stand in.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Returns the provider's identifier, used in logs.
    fn name(&self) -> &str;

    /// Sends the ordered messages and returns the single generated reply.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        cfg: &CallConfig,
    ) -> RagChatResult<ChatMessage>;
}
