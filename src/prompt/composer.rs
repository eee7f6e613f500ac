//! Prompt composition: user text, a style suffix and fixed quality keywords
//! joined into the single prompt string sent to the provider.
use crate::error::ComposeError;
use crate::prompt::styles::Style;

pub const QUALITY_MODIFIERS: &str = "8k, photorealistic";
/// Used by the enhance route when the caller sends no style.
pub const DEFAULT_STYLE_SUFFIX: &str = "high quality, detailed";

#[derive(Debug, Clone)]
pub struct PromptComposer {
    quality_modifiers: String,
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptComposer {
    pub fn new() -> Self {
        PromptComposer { quality_modifiers: QUALITY_MODIFIERS.to_string() }
    }

    pub fn with_quality_modifiers(modifiers: impl Into<String>) -> Self {
        PromptComposer { quality_modifiers: modifiers.into() }
    }

    /// Compose the final prompt for `user_prompt` in the given `style`.
    ///
    /// Both inputs are required; callers keep generation disabled until they
    /// have them.
    pub fn compose(&self, user_prompt: &str, style: Option<&Style>) -> Result<String, ComposeError> {
        let style = style.ok_or(ComposeError::MissingStyle)?;
        self.compose_with_suffix(user_prompt, Some(style.prompt_suffix))
    }

    /// Like [`compose`](Self::compose) but with a free-form suffix, falling
    /// back to [`DEFAULT_STYLE_SUFFIX`] when none is given.
    pub fn compose_with_suffix(&self, user_prompt: &str, suffix: Option<&str>) -> Result<String, ComposeError> {
        let prompt = user_prompt.trim();
        if prompt.is_empty() {
            return Err(ComposeError::EmptyPrompt);
        }
        let suffix = suffix.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(DEFAULT_STYLE_SUFFIX);

        let mut out = String::with_capacity(prompt.len() + suffix.len() + self.quality_modifiers.len() + 4);
        out.push_str(prompt);
        out.push_str(", ");
        out.push_str(suffix);
        if !self.quality_modifiers.is_empty() {
            out.push_str(", ");
            out.push_str(&self.quality_modifiers);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::styles;

    const MINIMAL: Style = Style {
        id: "test-minimal",
        name: "Minimal",
        prompt_suffix: "minimalist style, clean lines",
        description: "",
    };

    #[test]
    fn joins_prompt_suffix_and_modifiers() {
        let composer = PromptComposer::new();
        let out = composer.compose("a mountain lake", Some(&MINIMAL)).unwrap();
        assert_eq!(out, "a mountain lake, minimalist style, clean lines, 8k, photorealistic");
    }

    #[test]
    fn composition_is_deterministic() {
        let composer = PromptComposer::new();
        for style in styles::all() {
            let a = composer.compose("  fog over a harbor ", Some(style)).unwrap();
            let b = composer.compose("  fog over a harbor ", Some(style)).unwrap();
            assert_eq!(a, b);
            assert!(a.starts_with("fog over a harbor, "));
        }
    }

    #[test]
    fn rejects_blank_prompt_or_missing_style() {
        let composer = PromptComposer::new();
        assert_eq!(composer.compose("   ", Some(&MINIMAL)), Err(ComposeError::EmptyPrompt));
        assert_eq!(composer.compose("a lake", None), Err(ComposeError::MissingStyle));
    }

    #[test]
    fn free_form_suffix_falls_back_to_default() {
        let composer = PromptComposer::new();
        assert_eq!(
            composer.compose_with_suffix("a cat", None).unwrap(),
            "a cat, high quality, detailed, 8k, photorealistic"
        );
        assert_eq!(
            composer.compose_with_suffix("a cat", Some("  ")).unwrap(),
            "a cat, high quality, detailed, 8k, photorealistic"
        );
    }

    #[test]
    fn empty_modifiers_are_omitted() {
        let composer = PromptComposer::with_quality_modifiers("");
        assert_eq!(composer.compose("a cat", Some(&MINIMAL)).unwrap(), "a cat, minimalist style, clean lines");
    }
}
