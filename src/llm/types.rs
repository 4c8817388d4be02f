use serde::{Deserialize, Serialize};

use crate::config::{ChatEntry, KeywordsEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Per-call sampling settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CallConfig {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
}

impl From<&KeywordsEntry> for CallConfig {
    fn from(entry: &KeywordsEntry) -> Self {
        Self {
            model: entry.model.clone(),
            temperature: entry.temperature,
            max_tokens: entry.max_tokens,
        }
    }
}

impl From<&ChatEntry> for CallConfig {
    fn from(entry: &ChatEntry) -> Self {
        Self {
            model: entry.model.clone(),
            temperature: entry.temperature,
            max_tokens: entry.max_tokens,
        }
    }
}
