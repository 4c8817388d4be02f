pub mod chat;
pub mod config;
pub mod errors;
pub mod llm;
pub mod rag;

#[cfg(test)]
mod testing;

use std::path::Path;
use std::sync::Arc;

use tracing::Instrument;
use tracing_subscriber::EnvFilter;

use crate::chat::keywords::KeywordExtractor;
use crate::chat::orchestrator::Orchestrator;
use crate::chat::repl::{ChatLoop, TerminalInput};
use crate::chat::session::Session;
use crate::errors::RagChatResult;
use crate::llm::provider::LlmProvider;
use crate::llm::providers::openai_compatible::OpenAiCompatibleProvider;
use crate::llm::types::CallConfig;
use crate::rag::retriever::ContextRetriever;
use crate::rag::weaviate::WeaviateClient;

/// Entry point for the `ragchat` binary.
pub async fn run() -> RagChatResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(load_env_and_filter(None))
        .with_writer(std::io::stderr)
        .init();

    log_failure(start().await)
}

/// Loads `.env` (or `env_file`) into the environment, then builds the log
/// filter, so a `RUST_LOG` set in the file takes effect.
fn load_env_and_filter(env_file: Option<&Path>) -> EnvFilter {
    // A missing file is not an error.
    let _ = match env_file {
        Some(path) => dotenvy::from_path(path),
        None => dotenvy::dotenv().map(|_| ()),
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn log_failure<T>(outcome: RagChatResult<T>) -> RagChatResult<T> {
    if let Err(e) = &outcome {
        tracing::error!(error = %e, "ragchat exited with an error");
    }
    outcome
}

async fn start() -> RagChatResult<()> {
    let cfg = config::load_config()?;
    let api_key = cfg.api_key()?;

    let provider: Arc<dyn LlmProvider> = Arc::new(OpenAiCompatibleProvider::new(
        "openai".to_string(),
        cfg.llm.api_base.clone(),
        api_key.clone(),
    ));

    // Connection is released by ChatLoop::run, or by Drop if we never get there.
    let store = WeaviateClient::connect(&cfg.vector_store, &api_key).await?;

    let session = Session::new(cfg.prompts.system.clone());
    let span = tracing::info_span!("session", id = %session.session_id);

    let orchestrator = Orchestrator::new(
        session,
        KeywordExtractor::new(
            provider.clone(),
            CallConfig::from(&cfg.llm.keywords),
            &cfg.prompts,
        ),
        ContextRetriever::new(Box::new(store), cfg.vector_store.limit),
        provider,
        CallConfig::from(&cfg.llm.chat),
    );

    let input = TerminalInput::new()?;
    ChatLoop::new(orchestrator, input, std::io::stdout())
        .run()
        .instrument(span)
        .await
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use super::*;
    use crate::errors::RagChatError;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn rust_log_from_env_file_drives_filter() {
        let path = std::env::temp_dir().join(format!("ragchat-{}.env", uuid::Uuid::new_v4()));
        std::fs::write(&path, "RUST_LOG=ragchat_lib=info\n").unwrap();
        std::env::remove_var("RUST_LOG");

        let filter = load_env_and_filter(Some(&path));

        std::env::remove_var("RUST_LOG");
        let _ = std::fs::remove_file(&path);
        assert_eq!(filter.to_string(), "ragchat_lib=info");
    }

    #[test]
    fn startup_failure_is_logged_and_returned() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let outcome = tracing::subscriber::with_default(subscriber, || {
            log_failure::<()>(Err(RagChatError::Config("OPENAI_API_KEY is not set".into())))
        });

        assert!(matches!(outcome, Err(RagChatError::Config(_))));
        let logged = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("ERROR"));
        assert!(logged.contains("OPENAI_API_KEY is not set"));
    }
}
