use std::sync::Arc;

use crate::chat::keywords::KeywordExtractor;
use crate::chat::session::Session;
use crate::errors::RagChatResult;
use crate::llm::provider::LlmProvider;
use crate::llm::types::CallConfig;
use crate::rag::retriever::ContextRetriever;

/// Context used when the extracted keywords signal nothing to search for.
pub const NO_CONTEXT: &str = "No context was given";

/// Outcome of one answered question.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub keywords: String,
    pub retrieved: bool,
    pub answer: String,
}

pub struct Orchestrator {
    session: Session,
    extractor: KeywordExtractor,
    retriever: ContextRetriever,
    provider: Arc<dyn LlmProvider>,
    answer_cfg: CallConfig,
}

impl Orchestrator {
    pub fn new(
        session: Session,
        extractor: KeywordExtractor,
        retriever: ContextRetriever,
        provider: Arc<dyn LlmProvider>,
        answer_cfg: CallConfig,
    ) -> Self {
        Self {
            session,
            extractor,
            retriever,
            provider,
            answer_cfg,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn ask(&mut self, question: &str) -> RagChatResult<String> {
        self.ask_turn(question).await.map(|turn| turn.answer)
    }

    /// Extracts keywords, retrieves context unless the keywords say "none",
    /// then answers against the whole history. The user turn is appended
    /// before the answer call and stays there if that call fails.
    pub async fn ask_turn(&mut self, question: &str) -> RagChatResult<Turn> {
        let keywords = self.extractor.extract(question, self.session.turns()).await?;

        let retrieved = !signals_no_context(&keywords);
        let context = if retrieved {
            self.retriever.search(&keywords).await?
        } else {
            NO_CONTEXT.to_string()
        };
        tracing::info!(
            session = %self.session.session_id,
            keywords = %keywords,
            retrieved,
            context_len = context.len(),
            "context prepared"
        );

        self.session.push_user(user_turn(&context, question));

        tracing::debug!(
            session = %self.session.session_id,
            provider = %self.provider.name(),
            model = %self.answer_cfg.model,
            "requesting answer"
        );
        let reply = self
            .provider
            .chat(self.session.messages(), &self.answer_cfg)
            .await?;
        let answer = reply.content;
        self.session.push_assistant(answer.clone());

        tracing::debug!(
            session = %self.session.session_id,
            history = self.session.len(),
            "turn complete"
        );

        Ok(Turn {
            keywords,
            retrieved,
            answer,
        })
    }

    /// Releases the vector-store connection.
    pub fn close(&mut self) {
        self.retriever.close();
    }
}

/// The model is asked to say "none" when nothing is worth searching for;
/// any case-insensitive occurrence counts.
pub fn signals_no_context(keywords: &str) -> bool {
    keywords.to_lowercase().contains("none")
}

fn user_turn(context: &str, question: &str) -> String {
    format!("Context:{context}\n\nQuestion:{question}")
}
