pub mod error;
pub mod gemini;
pub mod generator;

pub use error::{ModelError, Result};
pub use gemini::{GeminiClient, DEFAULT_GEMINI_MODEL};
pub use generator::TextGenerator;
