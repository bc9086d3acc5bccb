pub mod providers;
mod summarizer;

pub use providers::AiProvider;
pub use summarizer::{build_prompt, empty_summary, error_summary, extract_json, Summarizer};
