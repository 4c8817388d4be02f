//! Vector store abstraction used by the context retriever.

use async_trait::async_trait;

use crate::errors::RagChatResult;

/// One near-text match as returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedPassage {
    pub text: String,
    /// Normalized similarity in [0, 1], higher is closer.
    pub certainty: Option<f64>,
    /// Store-defined distance, lower is closer.
    pub distance: Option<f64>,
}

/// Semantic search over a named collection plus an explicit connection
/// lifecycle. `close` must be idempotent so that an explicit close and the
/// implementor's `Drop` together release the handle exactly once.
#[async_trait]
pub trait VectorStore: Send + Sync {
    fn name(&self) -> &str;

    /// Returns up to `limit` matches for `query`, most relevant first.
    async fn near_text(&self, query: &str, limit: usize) -> RagChatResult<Vec<RetrievedPassage>>;

    fn close(&mut self);

    fn is_closed(&self) -> bool;
}
