//! Prompt composition and the style catalog.
pub mod composer;
pub mod styles;

pub use composer::PromptComposer;
pub use styles::Style;
