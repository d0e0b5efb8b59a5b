//! Upstream wire formats

pub mod deepseek;

pub use deepseek::{ChatMessage, ChatRequest, extract_content};
