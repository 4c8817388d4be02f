use async_trait::async_trait;

use crate::errors::{RagChatError, RagChatResult};
use crate::llm::provider::LlmProvider;
use crate::llm::types::{CallConfig, ChatMessage, Role};

pub struct OpenAiCompatibleProvider {
    id: String,
    api_base: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(id: String, api_base: String, api_key: String) -> Self {
        Self {
            id,
            api_base,
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.id
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        cfg: &CallConfig,
    ) -> RagChatResult<ChatMessage> {
        let body = build_request_body(messages, cfg);

        tracing::debug!(
            provider = %self.id,
            model = %cfg.model,
            messages = messages.len(),
            max_tokens = ?cfg.max_tokens,
            "sending LLM request"
        );

        let response = self
            .client
            .post(&self.api_base)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let err_body = response.text().await.unwrap_or_default();
            return Err(RagChatError::LlmProvider(format!("{}: {}", status, err_body)));
        }

        let json: serde_json::Value = response.json().await?;
        let reply = parse_reply(&json)?;

        tracing::info!(
            provider = %self.id,
            content_len = reply.content.len(),
            "LLM JSON response received"
        );

        Ok(reply)
    }
}

fn build_request_body(messages: &[ChatMessage], cfg: &CallConfig) -> serde_json::Value {
    let mut body = serde_json::json!({
        "model": cfg.model,
        "messages": messages,
        "temperature": cfg.temperature,
    });
    if let Some(max_tokens) = cfg.max_tokens {
        body["max_tokens"] = serde_json::json!(max_tokens);
    }
    body
}

/// Extracts `choices[0].message` from a non-streaming completion response.
fn parse_reply(json: &serde_json::Value) -> RagChatResult<ChatMessage> {
    let message = json["choices"]
        .as_array()
        .and_then(|choices| choices.first())
        .map(|choice| &choice["message"])
        .ok_or_else(|| RagChatError::LlmProvider("response contained no choices".into()))?;

    let role = message
        .get("role")
        .cloned()
        .and_then(|r| serde_json::from_value::<Role>(r).ok())
        .unwrap_or(Role::Assistant);
    let content = message["content"].as_str().unwrap_or("").to_string();

    Ok(ChatMessage { role, content })
}
