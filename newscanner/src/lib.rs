// Library interface for newscanner modules
// This allows tests and the binary to import modules

pub mod categories;
pub mod error;
pub mod llm;
pub mod news;
pub mod server;
