//! Background-editing providers.

mod gemini;

pub use gemini::{GeminiEditor, GeminiEditorBuilder, GeminiModel};
