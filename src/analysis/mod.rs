//! Analysis module - generative text client and section parsing

pub mod openai;
pub mod sections;

pub use openai::{build_prompt, OpenAiAnalysisClient};
pub use sections::{list_items, parse_sections, section_key, OVERVIEW};
