use std::sync::Arc;

use crate::config::PromptsConfig;
use crate::errors::RagChatResult;
use crate::llm::provider::LlmProvider;
use crate::llm::types::{CallConfig, ChatMessage};

/// Asks the model for a space-separated keyword list to search with.
pub struct KeywordExtractor {
    provider: Arc<dyn LlmProvider>,
    cfg: CallConfig,
    directive: String,
    instruction: String,
}

impl KeywordExtractor {
    pub fn new(provider: Arc<dyn LlmProvider>, cfg: CallConfig, prompts: &PromptsConfig) -> Self {
        Self {
            provider,
            cfg,
            directive: prompts.keywords_system.clone(),
            instruction: prompts.keywords_instruction.clone(),
        }
    }

    /// `history` is the prior non-system turns. The reply is returned
    /// trimmed and otherwise untouched.
    pub async fn extract(&self, question: &str, history: &[ChatMessage]) -> RagChatResult<String> {
        let messages = self.build_messages(question, history);
        let reply = self.provider.chat(&messages, &self.cfg).await?;
        let keywords = reply.content.trim().to_string();
        tracing::debug!(
            provider = %self.provider.name(),
            turns = history.len(),
            keywords = %keywords,
            "keywords extracted"
        );
        Ok(keywords)
    }

    fn build_messages(&self, question: &str, history: &[ChatMessage]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(self.directive.clone()));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(
            self.instruction.replace("{question}", question),
        ));
        messages
    }
}
