use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{RagChatError, RagChatResult};

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub vector_store: VectorStoreConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Full URL of the chat-completions endpoint.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Environment variable holding the completion API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Call settings for keyword extraction.
    #[serde(default)]
    pub keywords: KeywordsEntry,
    /// Call settings for answer generation.
    #[serde(default)]
    pub chat: ChatEntry,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key_env: default_api_key_env(),
            keywords: KeywordsEntry::default(),
            chat: ChatEntry::default(),
        }
    }
}

/// Keyword-extraction call. Every field falls back on its own, so
/// overriding the model keeps the output cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordsEntry {
    /// Model name sent to the API.
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default = "default_keywords_max_tokens")]
    pub max_tokens: Option<u32>,
}

impl Default for KeywordsEntry {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: 0.0,
            max_tokens: default_keywords_max_tokens(),
        }
    }
}

/// Answer-generation call. No output cap unless one is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEntry {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl Default for ChatEntry {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: 0.0,
            max_tokens: None,
        }
    }
}

fn default_api_base() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_keywords_max_tokens() -> Option<u32> {
    Some(60)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    #[serde(default = "default_store_url")]
    pub url: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Object property holding the passage text.
    #[serde(default = "default_text_property")]
    pub text_property: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Header under which the completion API key is forwarded to the store.
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            collection: default_collection(),
            text_property: default_text_property(),
            limit: default_limit(),
            api_key_header: default_api_key_header(),
        }
    }
}

fn default_store_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_collection() -> String {
    "Manuscript".to_string()
}

fn default_text_property() -> String {
    "text".to_string()
}

fn default_limit() -> usize {
    5
}

fn default_api_key_header() -> String {
    "X-OpenAI-Api-Key".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsConfig {
    /// Fixed preamble that seeds every conversation.
    #[serde(default = "default_system_prompt")]
    pub system: String,
    #[serde(default = "default_keywords_system")]
    pub keywords_system: String,
    /// Final keyword request; `{question}` is replaced with the user's question.
    #[serde(default = "default_keywords_instruction")]
    pub keywords_instruction: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            system: default_system_prompt(),
            keywords_system: default_keywords_system(),
            keywords_instruction: default_keywords_instruction(),
        }
    }
}

fn default_system_prompt() -> String {
    "You are a helpful chatbot. Respond to the user based on previous messages and the \
     context below, and if the question can't be answered based on the context or the \
     previous messages, say \"I don't know\""
        .to_string()
}

fn default_keywords_system() -> String {
    "You write the keywords useful for answering the user's question.".to_string()
}

fn default_keywords_instruction() -> String {
    "Write the keywords useful for answering the following question and separate them \
     with spaces. If any keyword from previous messages are also important for answering \
     this question, include them too.\nQuestion:{question}"
        .to_string()
}

fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join(CONFIG_FILE);
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Some(candidate);
            }
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        let candidate = cwd.join(CONFIG_FILE);
        if candidate.exists() {
            tracing::debug!(path = %candidate.display(), "config found in working directory");
            return Some(candidate);
        }
    }

    let candidate = dirs::config_dir()?.join("ragchat").join(CONFIG_FILE);
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in user config dir");
        return Some(candidate);
    }

    None
}

/// Loads `config.toml` from the first location that has one, or the built-in
/// defaults when there is none.
pub fn load_config() -> RagChatResult<AppConfig> {
    let Some(path) = resolve_config_path() else {
        tracing::info!("no config.toml found, using defaults");
        return Ok(AppConfig::default());
    };
    let content = std::fs::read_to_string(&path)?;
    let config = parse_config(&content)?;
    tracing::info!(
        path = %path.display(),
        collection = %config.vector_store.collection,
        model = %config.llm.chat.model,
        "config loaded"
    );
    Ok(config)
}

pub fn parse_config(content: &str) -> RagChatResult<AppConfig> {
    Ok(toml::from_str(content)?)
}

impl AppConfig {
    /// Reads the completion API key from the configured environment variable.
    pub fn api_key(&self) -> RagChatResult<String> {
        match std::env::var(&self.llm.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(RagChatError::Config(format!(
                "{} is not set (environment or .env)",
                self.llm.api_key_env
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.llm.keywords.max_tokens, Some(60));
        assert_eq!(cfg.llm.keywords.temperature, 0.0);
        assert_eq!(cfg.llm.chat.max_tokens, None);
        assert_eq!(cfg.vector_store.collection, "Manuscript");
        assert_eq!(cfg.vector_store.limit, 5);
        assert_eq!(cfg.vector_store.api_key_header, "X-OpenAI-Api-Key");
        assert!(cfg.prompts.keywords_instruction.ends_with("\nQuestion:{question}"));
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let cfg = parse_config(
            r#"
            [vector_store]
            url = "http://weaviate:8080"

            [llm.chat]
            model = "gpt-4o-mini"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.vector_store.url, "http://weaviate:8080");
        assert_eq!(cfg.vector_store.text_property, "text");
        assert_eq!(cfg.llm.chat.model, "gpt-4o-mini");
        assert_eq!(cfg.llm.chat.temperature, 0.0);
        assert_eq!(cfg.llm.keywords.model, "gpt-3.5-turbo");
    }

    #[test]
    fn overriding_keyword_model_keeps_output_cap() {
        let cfg = parse_config("[llm.keywords]\nmodel = \"gpt-4o-mini\"\n").unwrap();
        assert_eq!(cfg.llm.keywords.model, "gpt-4o-mini");
        assert_eq!(cfg.llm.keywords.max_tokens, Some(60));
        assert_eq!(cfg.llm.keywords.temperature, 0.0);
    }

    #[test]
    fn temperature_alone_keeps_default_model() {
        let cfg = parse_config(
            r#"
            [llm.keywords]
            temperature = 0.1

            [llm.chat]
            temperature = 0.2
            "#,
        )
        .unwrap();
        assert_eq!(cfg.llm.keywords.model, "gpt-3.5-turbo");
        assert_eq!(cfg.llm.keywords.temperature, 0.1);
        assert_eq!(cfg.llm.keywords.max_tokens, Some(60));
        assert_eq!(cfg.llm.chat.model, "gpt-3.5-turbo");
        assert_eq!(cfg.llm.chat.max_tokens, None);
    }

    #[test]
    fn missing_api_key_is_config_error() {
        let mut cfg = AppConfig::default();
        cfg.llm.api_key_env = "RAGCHAT_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        assert!(matches!(cfg.api_key(), Err(RagChatError::Config(_))));
    }
}
