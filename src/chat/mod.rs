pub mod keywords;
pub mod orchestrator;
pub mod repl;
pub mod session;
