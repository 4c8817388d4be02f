use crate::errors::RagChatResult;
use crate::rag::store::{RetrievedPassage, VectorStore};

/// Turns a keyword string into the context block embedded in the user turn.
pub struct ContextRetriever {
    store: Box<dyn VectorStore>,
    limit: usize,
}

impl ContextRetriever {
    pub fn new(store: Box<dyn VectorStore>, limit: usize) -> Self {
        Self { store, limit }
    }

    /// Runs one near-text query and formats every match as a single-line
    /// record, keeping the store's ranking. No matches yields "".
    pub async fn search(&self, keywords: &str) -> RagChatResult<String> {
        let passages = self.store.near_text(keywords, self.limit).await?;
        tracing::debug!(
            store = %self.store.name(),
            keywords = %keywords,
            matches = passages.len(),
            "context retrieved"
        );
        Ok(passages.iter().map(format_record).collect())
    }

    /// Releases the underlying store connection. Safe to call more than once.
    pub fn close(&mut self) {
        if !self.store.is_closed() {
            self.store.close();
        }
    }
}

/// `{text="...", certainty="...", distance="..."}` followed by a newline.
pub fn format_record(passage: &RetrievedPassage) -> String {
    format!(
        "{{text=\"{}\", certainty=\"{}\", distance=\"{}\"}}\n",
        single_line(&passage.text),
        format_score(passage.certainty),
        format_score(passage.distance),
    )
}

/// Debug form keeps the decimal point on whole values (`1.0`, not `1`).
fn format_score(score: Option<f64>) -> String {
    score.map(|s| format!("{s:?}")).unwrap_or_default()
}

fn single_line(text: &str) -> String {
    text.split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
