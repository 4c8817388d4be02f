use std::io::Write;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::chat::orchestrator::Orchestrator;
use crate::errors::RagChatResult;

const PROMPT: &str = "Please enter your question (or type 'exit' to quit): ";

/// Source of user input lines. `Ok(None)` means input is exhausted.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> RagChatResult<Option<String>>;
}

/// Terminal input with line editing and in-memory recall.
pub struct TerminalInput {
    editor: DefaultEditor,
}

impl TerminalInput {
    pub fn new() -> RagChatResult<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for TerminalInput {
    fn read_line(&mut self, prompt: &str) -> RagChatResult<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

pub fn is_exit_command(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("exit")
}

/// Prompt, ask, print, until `exit` or end of input.
pub struct ChatLoop<I: LineSource, W: Write> {
    orchestrator: Orchestrator,
    input: I,
    out: W,
}

impl<I: LineSource, W: Write> ChatLoop<I, W> {
    pub fn new(orchestrator: Orchestrator, input: I, out: W) -> Self {
        Self {
            orchestrator,
            input,
            out,
        }
    }

    /// Runs the session. The vector-store connection is closed before this
    /// returns, whether the loop ended normally or with an error.
    pub async fn run(mut self) -> RagChatResult<()> {
        let outcome = self.drive().await;
        self.orchestrator.close();
        outcome
    }

    async fn drive(&mut self) -> RagChatResult<()> {
        loop {
            writeln!(self.out)?;
            self.out.flush()?;

            let Some(line) = self.input.read_line(PROMPT)? else {
                tracing::info!("input closed");
                return Ok(());
            };
            if is_exit_command(&line) {
                tracing::info!("exit requested");
                return Ok(());
            }

            let turn = self.orchestrator.ask_turn(&line).await?;
            writeln!(self.out, "Keywords: {}", turn.keywords)?;
            writeln!(self.out)?;
            writeln!(self.out, "Answer: {}", turn.answer)?;
            self.out.flush()?;
        }
    }
}
