//! Gateway trait and result types.

use async_trait::async_trait;
use sitegen_core::{BlockName, FormValues};

/// Content produced by a successful gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generated {
    /// Non-empty sanitized HTML
    Content(String),

    /// The call succeeded but produced no markup
    Empty,
}

impl Generated {
    /// Classify sanitized output, treating whitespace-only markup as empty.
    pub fn from_html(html: String) -> Self {
        if html.trim().is_empty() {
            Self::Empty
        } else {
            Self::Content(html)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The markup to commit; empty string for [`Generated::Empty`].
    pub fn into_content(self) -> String {
        match self {
            Self::Content(html) => html,
            Self::Empty => String::new(),
        }
    }
}

/// Errors that can occur while generating content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("Request timed out")]
    Timeout,

    #[error("Unable to reach generation service: {0}")]
    Connect(String),

    #[error("Authentication failed, check the API key")]
    Auth,

    #[error("Generation service returned {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Invalid response from generation service: {0}")]
    InvalidResponse(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Gateway configuration error: {0}")]
    Config(String),

    #[error("Section {0} cannot be generated as a block")]
    Unsupported(BlockName),
}

/// A source of generated HTML.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Gateway identifier for logs (e.g. "http", "fixture")
    fn name(&self) -> &'static str;

    /// Generate the head block from the form values and current body markup.
    async fn create_head_info(
        &self,
        form: &FormValues,
        body_html: &str,
    ) -> Result<Generated, GatewayError>;

    /// Generate one addable section.
    async fn create_html_block(
        &self,
        name: BlockName,
        form: &FormValues,
    ) -> Result<Generated, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_output_is_empty() {
        assert_eq!(Generated::from_html("  \n".to_string()), Generated::Empty);
        assert_eq!(
            Generated::from_html("<p></p>".to_string()),
            Generated::Content("<p></p>".to_string())
        );
        assert_eq!(Generated::Empty.into_content(), "");
    }
}
