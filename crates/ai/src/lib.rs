//! Plan generation adapter.
//!
//! Wraps an external text-generation model and turns its output into a
//! validated, ordered list of daily tasks.

#![warn(missing_docs)]

pub mod generator;
pub mod parser;
pub mod prompt;
pub mod gemini;
pub mod stub;

pub use generator::{GenerationError, GenerationPolicy, ModelPlanGenerator, PlanGenerator, TextGenerator};
pub use parser::parse_plan;
pub use prompt::build_plan_prompt;
pub use gemini::{GeminiClient, GeminiConfig, DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL};
pub use stub::{StaticTextGenerator, StubReply};
